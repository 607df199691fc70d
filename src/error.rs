use std::path::PathBuf;

use crate::config::StoragePolicy;

#[derive(Debug, thiserror::Error)]
pub enum IgtokenError {
    #[error("App configuration not found. Run: igtoken init")]
    ConfigurationMissing,

    #[error("Invalid {field}: {detail}")]
    Validation { field: String, detail: String },

    #[error("OAuth error: {0}")]
    OAuthError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Account '{alias}' not found.{}", format_suggestion(.suggestion.as_deref()))]
    AccountNotFound {
        alias: String,
        suggestion: Option<String>,
    },

    #[error("No default account set. Pass an alias or run: igtoken use <alias>")]
    NoDefaultAccount,

    #[error("Integrity check failed for account '{alias}': {detail}")]
    Integrity { alias: String, detail: String },

    #[error("Token refresh failed: {0}")]
    TokenRefresh(String),

    #[error("Graph API error: {message}")]
    GraphApi { status: Option<u16>, message: String },

    #[error("No access token stored for account '{0}'. Run: igtoken add {0}")]
    CredentialMissing(String),

    #[error("Accounts are stored with the {stored} policy, not {requested}. Rerun with --storage {stored}")]
    StorageMismatch {
        stored: StoragePolicy,
        requested: StoragePolicy,
    },

    #[error("Keychain error: {0}")]
    Keychain(String),

    #[error("Error in {}: {detail}", path.display())]
    ConfigError { path: PathBuf, detail: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

fn format_suggestion(suggestion: Option<&str>) -> String {
    match suggestion {
        Some(s) => format!(" Did you mean '{s}'?"),
        None => " Run: igtoken list".to_string(),
    }
}

impl IgtokenError {
    pub fn validation(field: &str, detail: impl Into<String>) -> Self {
        IgtokenError::Validation {
            field: field.to_string(),
            detail: detail.into(),
        }
    }

    pub fn account_not_found(alias: &str) -> Self {
        IgtokenError::AccountNotFound {
            alias: alias.to_string(),
            suggestion: None,
        }
    }

    /// Error code string for structured JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            IgtokenError::ConfigurationMissing => "configuration_missing",
            IgtokenError::Validation { .. } => "validation_error",
            IgtokenError::OAuthError(_) => "oauth_error",
            IgtokenError::NetworkError(_) => "network_error",
            IgtokenError::AccountNotFound { .. } => "not_found",
            IgtokenError::NoDefaultAccount => "not_found",
            IgtokenError::Integrity { .. } => "integrity_error",
            IgtokenError::TokenRefresh(_) => "token_refresh_error",
            IgtokenError::GraphApi { .. } => "graph_api_error",
            IgtokenError::CredentialMissing(_) => "credential_missing",
            IgtokenError::StorageMismatch { .. } => "storage_mismatch",
            IgtokenError::Keychain(_) => "keychain_error",
            IgtokenError::ConfigError { .. } => "config_error",
            IgtokenError::IoError(_) => "io_error",
        }
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            IgtokenError::AccountNotFound { alias, .. } => Some(alias),
            IgtokenError::Integrity { alias, .. } => Some(alias),
            IgtokenError::CredentialMissing(alias) => Some(alias),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        if let Some(alias) = self.alias() {
            obj.insert("alias".into(), serde_json::Value::String(alias.to_string()));
        }
        if let IgtokenError::GraphApi {
            status: Some(status),
            ..
        } = self
        {
            obj.insert("status".into(), serde_json::Value::from(*status));
        }
        obj.insert("message".into(), serde_json::Value::String(self.to_string()));
        obj.insert("code".into(), serde_json::Value::String(self.code().to_string()));
        serde_json::json!({ "error": obj })
    }
}
