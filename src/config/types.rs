use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::IgtokenError;

/// The registered Facebook app used as the OAuth client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub app_id: String,
    pub app_secret: String,
    pub redirect_uri: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl AppConfig {
    /// Build a validated config stamped with the current time.
    pub fn new(
        app_id: impl Into<String>,
        app_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self, IgtokenError> {
        let now = Utc::now();
        let config = AppConfig {
            app_id: app_id.into().trim().to_string(),
            app_secret: app_secret.into().trim().to_string(),
            redirect_uri: redirect_uri.into().trim().to_string(),
            created_at: now,
            last_updated: now,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), IgtokenError> {
        if self.app_id.trim().is_empty() {
            return Err(IgtokenError::validation("app ID", "App ID is required"));
        }
        if self.app_secret.trim().is_empty() {
            return Err(IgtokenError::validation(
                "app secret",
                "App secret is required",
            ));
        }
        super::redirect::ensure_redirect_uri(&self.redirect_uri)
    }

    /// The parts of the config that are safe to export.
    pub fn public(&self) -> PublicAppConfig {
        PublicAppConfig {
            app_id: self.app_id.clone(),
            redirect_uri: self.redirect_uri.clone(),
        }
    }
}

/// App config without the secret, as written to export bundles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAppConfig {
    pub app_id: String,
    pub redirect_uri: String,
}

/// Summary of the stored config for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfigInfo {
    pub app_id: String,
    pub redirect_uri: String,
    pub created_at: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub has_app_secret: bool,
}

/// Where account access tokens are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoragePolicy {
    /// Full account records, token included, in `accounts.json`.
    #[default]
    Plaintext,
    /// Token in the OS keychain; `accounts.json` keeps a SHA-256 hash.
    Keychain,
}

impl std::fmt::Display for StoragePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoragePolicy::Plaintext => write!(f, "plaintext"),
            StoragePolicy::Keychain => write!(f, "keychain"),
        }
    }
}

/// Links into the Facebook developer console for an app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacebookAppUrls {
    pub dashboard: String,
    pub settings: String,
    pub products: String,
    pub permissions: String,
}

impl FacebookAppUrls {
    pub fn for_app(app_id: &str) -> Self {
        let base = format!("https://developers.facebook.com/apps/{app_id}");
        FacebookAppUrls {
            dashboard: format!("{base}/dashboard/"),
            settings: format!("{base}/settings/basic/"),
            products: format!("{base}/add/"),
            permissions: format!("{base}/app-review/permissions/"),
        }
    }
}
