pub mod loader;
pub mod redirect;
pub mod types;

pub use loader::{
    app_config_info, has_app_config, load_app_config, remove_app_config, save_app_config,
    ConfigPaths,
};
pub use redirect::{check_redirect_uri, recommended_redirect_uris, RedirectUriCheck};
pub use types::{AppConfig, AppConfigInfo, FacebookAppUrls, PublicAppConfig, StoragePolicy};
