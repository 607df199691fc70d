//! Persistence of per-alias token material.
//!
//! Both policies write `accounts.json` in the configuration directory. The
//! plaintext policy stores the token inline; the secured policy hands it to a
//! [`SecretVault`] and keeps only its SHA-256 hash on disk.

pub mod plaintext;
pub mod secured;
pub mod vault;

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::loader::{read_json_or_default, write_json};
use crate::config::{ConfigPaths, StoragePolicy};
use crate::error::IgtokenError;
use crate::types::{Account, AccountMetadata};

pub use plaintext::PlaintextStore;
pub use secured::{token_hash, SecuredStore};
pub use vault::{KeyringVault, MemoryVault, SecretVault, KEYCHAIN_SERVICE};

/// Storage for account records and their access tokens.
pub trait CredentialStore: Send + Sync {
    /// Insert or replace an account, token included.
    fn save(&self, alias: &str, account: &Account) -> Result<(), IgtokenError>;

    /// Insert or replace metadata only. Secret material already stored for
    /// the alias is kept; none is created.
    fn save_metadata(&self, alias: &str, metadata: &AccountMetadata) -> Result<(), IgtokenError>;

    /// The full account, or `None` if the alias is unknown.
    fn get(&self, alias: &str) -> Result<Option<Account>, IgtokenError>;

    /// Delete an account. Returns `false` if the alias was unknown.
    fn remove(&self, alias: &str) -> Result<bool, IgtokenError>;

    /// Metadata of every account, keyed by alias. Never contains tokens.
    fn list(&self) -> Result<BTreeMap<String, AccountMetadata>, IgtokenError>;

    fn policy(&self) -> StoragePolicy;
}

/// Open the store for the configured policy.
pub fn open_store(
    policy: StoragePolicy,
    paths: &ConfigPaths,
) -> Box<dyn CredentialStore> {
    match policy {
        StoragePolicy::Plaintext => Box::new(PlaintextStore::new(paths.accounts_file())),
        StoragePolicy::Keychain => Box::new(SecuredStore::new(paths.accounts_file(), KeyringVault)),
    }
}

fn load_records<R: DeserializeOwned>(path: &Path) -> Result<BTreeMap<String, R>, IgtokenError> {
    read_json_or_default(path)
}

fn save_records<R: Serialize>(
    path: &Path,
    records: &BTreeMap<String, R>,
) -> Result<(), IgtokenError> {
    write_json(path, records)
}
