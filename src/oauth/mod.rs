pub mod endpoints;
pub mod exchanger;
pub mod redirect;
pub mod state;
pub mod token;

pub use endpoints::{GraphEndpoints, GRAPH_VERSION, SCOPES};
pub use exchanger::TokenExchanger;
pub use redirect::extract_code;
pub use state::generate_state;
pub use token::{AuthorizationRequest, BusinessAccount, FacebookPage, ShortLivedToken, TokenGrant};
