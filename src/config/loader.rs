use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::IgtokenError;

use super::types::{AppConfig, AppConfigInfo};

const CONFIG_FILE: &str = "config.json";
const ACCOUNTS_FILE: &str = "accounts.json";
const SETTINGS_FILE: &str = "settings.json";

/// Environment variable overriding the configuration directory.
pub const HOME_ENV: &str = "IGTOKEN_HOME";

/// Locations of every file the tool persists, rooted at one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    root: PathBuf,
}

impl ConfigPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the configuration directory.
    ///
    /// Precedence:
    /// 1. `--config-dir` CLI flag
    /// 2. `IGTOKEN_HOME` env var
    /// 3. `~/.igtoken`
    pub fn discover(cli_dir: Option<&str>) -> Result<Self, IgtokenError> {
        if let Some(dir) = cli_dir.filter(|d| !d.is_empty()) {
            return Ok(Self::new(dir));
        }
        if let Ok(dir) = std::env::var(HOME_ENV) {
            if !dir.is_empty() {
                return Ok(Self::new(dir));
            }
        }
        let home = dirs::home_dir().ok_or_else(|| IgtokenError::ConfigError {
            path: PathBuf::from("~"),
            detail: "Cannot determine home directory".into(),
        })?;
        Ok(Self::new(home.join(".igtoken")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn accounts_file(&self) -> PathBuf {
        self.root.join(ACCOUNTS_FILE)
    }

    pub fn settings_file(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }
}

/// Read a JSON file, returning `None` when it does not exist.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, IgtokenError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(IgtokenError::ConfigError {
                path: path.to_path_buf(),
                detail: format!("Cannot read file: {e}"),
            })
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| IgtokenError::ConfigError {
            path: path.to_path_buf(),
            detail: format!("Invalid JSON: {e}"),
        })
}

/// Read a JSON file, falling back to `T::default()` when it does not exist.
pub(crate) fn read_json_or_default<T: DeserializeOwned + Default>(
    path: &Path,
) -> Result<T, IgtokenError> {
    Ok(read_json(path)?.unwrap_or_default())
}

/// Write pretty JSON, creating parent directories. Files are owner-only on unix.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), IgtokenError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|e| IgtokenError::ConfigError {
        path: path.to_path_buf(),
        detail: format!("Failed to serialize: {e}"),
    })?;
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    // `mode` only applies on creation; tighten files that already existed.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all((json + "\n").as_bytes())?;
    Ok(())
}

/// Load the app config, failing with `ConfigurationMissing` if `init` never ran.
pub fn load_app_config(paths: &ConfigPaths) -> Result<AppConfig, IgtokenError> {
    let path = paths.config_file();
    let raw: serde_json::Value = read_json(&path)?.ok_or(IgtokenError::ConfigurationMissing)?;

    // Imported configs carry no secret; treat them as not yet initialized.
    let has_secret = raw
        .get("appSecret")
        .and_then(|v| v.as_str())
        .is_some_and(|s| !s.is_empty());
    if !has_secret {
        return Err(IgtokenError::ConfigurationMissing);
    }

    let config: AppConfig = serde_json::from_value(raw).map_err(|e| IgtokenError::ConfigError {
        path: path.clone(),
        detail: format!("Invalid app config: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

pub fn has_app_config(paths: &ConfigPaths) -> bool {
    load_app_config(paths).is_ok()
}

/// Persist the app config, keeping the original `createdAt` when overwriting.
pub fn save_app_config(paths: &ConfigPaths, config: &AppConfig) -> Result<AppConfig, IgtokenError> {
    config.validate()?;
    let mut stored = config.clone();
    if let Some(info) = app_config_info(paths)? {
        if let Some(created_at) = info.created_at {
            stored.created_at = created_at;
        }
    }
    stored.last_updated = Utc::now();
    write_json(&paths.config_file(), &stored)?;
    tracing::info!(app_id = %stored.app_id, "saved app configuration");
    Ok(stored)
}

/// Read non-secret details of the stored config, tolerating a missing secret.
pub fn app_config_info(paths: &ConfigPaths) -> Result<Option<AppConfigInfo>, IgtokenError> {
    let raw: Option<serde_json::Value> = read_json(&paths.config_file())?;
    Ok(raw.map(|raw| {
        let text = |key: &str| {
            raw.get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        let time = |key: &str| {
            raw.get(key)
                .and_then(|v| serde_json::from_value(v.clone()).ok())
        };
        AppConfigInfo {
            app_id: text("appId"),
            redirect_uri: text("redirectUri"),
            created_at: time("createdAt"),
            last_updated: time("lastUpdated"),
            has_app_secret: !text("appSecret").is_empty(),
        }
    }))
}

/// Delete the stored config. Missing files are not an error.
pub fn remove_app_config(paths: &ConfigPaths) -> Result<(), IgtokenError> {
    match std::fs::remove_file(paths.config_file()) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
