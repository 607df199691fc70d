pub mod cli;
pub mod config;
pub mod error;
pub mod flow;
pub mod graph;
pub mod oauth;
pub mod prompt;
pub mod provider;
pub mod registry;
pub mod store;
pub mod types;

pub use config::{AppConfig, ConfigPaths, StoragePolicy};
pub use error::IgtokenError;
pub use flow::{AccountFlow, AddOutcome};
pub use graph::GraphClient;
pub use oauth::TokenExchanger;
pub use registry::{AccountRegistry, ExportBundle, ImportSummary};
pub use store::CredentialStore;
pub use types::{Account, AccountInfo, AccountMetadata, TokenStatus};
