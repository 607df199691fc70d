use serde::{Deserialize, Serialize};

use crate::types::{DEFAULT_EXPIRES_IN, TOKEN_TYPE};

/// URL to send the user to, plus the `state` embedded in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
}

/// User token returned by the code exchange. Lives for minutes to hours and
/// is never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct ShortLivedToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Raw response of the long-lived exchange and refresh grants.
#[derive(Debug, Deserialize)]
pub(crate) struct GrantResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl GrantResponse {
    pub(crate) fn into_grant(self) -> TokenGrant {
        TokenGrant {
            access_token: self.access_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
        }
    }
}

/// A long-lived token with its lifetime in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// A Facebook Page the user manages, with its page access token.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FacebookPage {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub access_token: String,
}

/// The Instagram Business account linked to a page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BusinessAccount {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageList {
    #[serde(default)]
    pub data: Vec<FacebookPage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PageBusinessLink {
    #[serde(default)]
    pub instagram_business_account: Option<BusinessAccount>,
}
