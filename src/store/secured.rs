use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::StoragePolicy;
use crate::error::IgtokenError;
use crate::types::{Account, AccountMetadata};

use super::vault::{SecretVault, KEYCHAIN_SERVICE};
use super::{load_records, save_records, CredentialStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SecuredRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_hash: Option<String>,
    /// Present only on records written by the plaintext policy.
    #[serde(default, skip_serializing)]
    access_token: Option<String>,
    #[serde(flatten)]
    metadata: AccountMetadata,
}

impl SecuredRecord {
    fn check_policy(&self) -> Result<(), IgtokenError> {
        if self.access_token.is_some() {
            return Err(IgtokenError::StorageMismatch {
                stored: StoragePolicy::Plaintext,
                requested: StoragePolicy::Keychain,
            });
        }
        Ok(())
    }
}

/// Lowercase hex SHA-256 of a token.
pub fn token_hash(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Tokens in a [`SecretVault`], metadata and token hashes in a JSON file.
///
/// Reads verify the vault secret against the stored hash, so tampering with
/// either side is reported as an integrity failure.
#[derive(Debug)]
pub struct SecuredStore<V> {
    path: PathBuf,
    vault: V,
    service: String,
}

impl<V: SecretVault> SecuredStore<V> {
    pub fn new(path: impl Into<PathBuf>, vault: V) -> Self {
        Self {
            path: path.into(),
            vault,
            service: KEYCHAIN_SERVICE.to_string(),
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    fn load(&self) -> Result<BTreeMap<String, SecuredRecord>, IgtokenError> {
        load_records(&self.path)
    }
}

impl<V: SecretVault> CredentialStore for SecuredStore<V> {
    fn save(&self, alias: &str, account: &Account) -> Result<(), IgtokenError> {
        let mut records = self.load()?;
        if let Some(existing) = records.get(alias) {
            existing.check_policy()?;
        }
        let previous = self.vault.get(&self.service, alias)?;
        self.vault
            .set(&self.service, alias, &account.access_token)?;

        records.insert(
            alias.to_string(),
            SecuredRecord {
                token_hash: Some(token_hash(&account.access_token)),
                access_token: None,
                metadata: account.metadata.clone(),
            },
        );
        if let Err(e) = save_records(&self.path, &records) {
            // Put the keychain back in step with the unchanged file.
            let restored = match previous {
                Some(secret) => self.vault.set(&self.service, alias, &secret),
                None => self.vault.delete(&self.service, alias),
            };
            if let Err(restore_err) = restored {
                tracing::warn!(alias, "failed to restore keychain entry: {restore_err}");
            }
            return Err(e);
        }
        tracing::debug!(alias, service = %self.service, "stored token in keychain");
        Ok(())
    }

    fn save_metadata(&self, alias: &str, metadata: &AccountMetadata) -> Result<(), IgtokenError> {
        let mut records = self.load()?;
        let token_hash = match records.get(alias) {
            Some(existing) => {
                existing.check_policy()?;
                existing.token_hash.clone()
            }
            None => None,
        };
        records.insert(
            alias.to_string(),
            SecuredRecord {
                token_hash,
                access_token: None,
                metadata: metadata.clone(),
            },
        );
        save_records(&self.path, &records)
    }

    fn get(&self, alias: &str) -> Result<Option<Account>, IgtokenError> {
        let Some(record) = self.load()?.remove(alias) else {
            return Ok(None);
        };
        record.check_policy()?;
        let expected = record
            .token_hash
            .ok_or_else(|| IgtokenError::CredentialMissing(alias.to_string()))?;

        let secret = self
            .vault
            .get(&self.service, alias)?
            .ok_or_else(|| IgtokenError::Integrity {
                alias: alias.to_string(),
                detail: "token is missing from the keychain".into(),
            })?;

        if token_hash(&secret) != expected {
            return Err(IgtokenError::Integrity {
                alias: alias.to_string(),
                detail: "token hash mismatch".into(),
            });
        }

        Ok(Some(Account {
            access_token: secret,
            metadata: record.metadata,
        }))
    }

    fn remove(&self, alias: &str) -> Result<bool, IgtokenError> {
        let mut records = self.load()?;
        if let Some(existing) = records.get(alias) {
            existing.check_policy()?;
        }
        let known = records.remove(alias).is_some();
        if known {
            save_records(&self.path, &records)?;
        }
        // The keychain entry may already be gone; that is not an error.
        if let Err(e) = self.vault.delete(&self.service, alias) {
            if !known {
                return Err(e);
            }
            tracing::warn!(alias, "failed to delete keychain entry: {e}");
        }
        Ok(known)
    }

    fn list(&self) -> Result<BTreeMap<String, AccountMetadata>, IgtokenError> {
        Ok(self
            .load()?
            .into_iter()
            .map(|(alias, record)| (alias, record.metadata))
            .collect())
    }

    fn policy(&self) -> StoragePolicy {
        StoragePolicy::Keychain
    }
}
