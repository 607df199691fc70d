//! Command implementations behind the `igtoken` binary.

pub mod account;
pub mod init;
pub mod output;
pub mod transfer;

use crate::config::{load_app_config, AppConfig, ConfigPaths, StoragePolicy};
use crate::error::IgtokenError;
use crate::flow::AccountFlow;
use crate::registry::AccountRegistry;

/// Settings shared by every command, resolved once from global flags.
#[derive(Debug, Clone)]
pub struct Context {
    pub paths: ConfigPaths,
    /// Policy from `--storage`; `None` defers to the recorded one.
    pub policy: Option<StoragePolicy>,
    pub json: bool,
}

impl Context {
    pub fn new(paths: ConfigPaths, policy: Option<StoragePolicy>, json: bool) -> Self {
        Self {
            paths,
            policy,
            json,
        }
    }

    pub fn registry(&self) -> Result<AccountRegistry, IgtokenError> {
        AccountRegistry::open(self.policy, &self.paths)
    }

    pub fn app_config(&self) -> Result<AppConfig, IgtokenError> {
        load_app_config(&self.paths)
    }

    pub fn flow(&self) -> AccountFlow {
        AccountFlow::new()
    }

    /// Colors only for human-readable output on a terminal.
    pub fn is_tty(&self) -> bool {
        !self.json && output::is_tty()
    }
}
