use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::PublicAppConfig;
use crate::error::IgtokenError;
use crate::types::AccountMetadata;

/// Format version written to every export.
pub const BUNDLE_VERSION: &str = "1.0.0";

/// Portable snapshot of a registry. Carries no tokens and no app secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub config: Option<PublicAppConfig>,
    #[serde(default)]
    pub accounts: BTreeMap<String, AccountMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_account: Option<String>,
}

impl ExportBundle {
    /// Parse a bundle, rejecting versions from an incompatible major release.
    pub fn from_json(input: &str) -> Result<Self, IgtokenError> {
        let bundle: ExportBundle = serde_json::from_str(input)
            .map_err(|e| IgtokenError::validation("export file", e.to_string()))?;
        let major = bundle.version.split('.').next().unwrap_or_default();
        if major != "1" {
            return Err(IgtokenError::validation(
                "export file",
                format!("unsupported bundle version '{}'", bundle.version),
            ));
        }
        Ok(bundle)
    }

    pub fn to_json(&self) -> Result<String, IgtokenError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| IgtokenError::validation("export file", e.to_string()))
    }
}

/// What an import changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Aliases written, in alias order.
    pub imported: Vec<String>,
    /// Subset of `imported` that replaced an existing alias.
    pub replaced: Vec<String>,
    pub default_account: Option<String>,
    /// App config carried by the bundle. Not applied; it lacks the secret.
    pub config: Option<PublicAppConfig>,
}
