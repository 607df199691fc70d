use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::StoragePolicy;
use crate::error::IgtokenError;
use crate::types::{Account, AccountMetadata};

use super::{load_records, save_records, CredentialStore};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaintextRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    /// Present only on records written by the keychain policy.
    #[serde(default, skip_serializing)]
    token_hash: Option<String>,
    #[serde(flatten)]
    metadata: AccountMetadata,
}

impl PlaintextRecord {
    fn check_policy(&self) -> Result<(), IgtokenError> {
        if self.token_hash.is_some() {
            return Err(IgtokenError::StorageMismatch {
                stored: StoragePolicy::Keychain,
                requested: StoragePolicy::Plaintext,
            });
        }
        Ok(())
    }
}

/// Keeps whole account records, token included, in one JSON file.
#[derive(Debug, Clone)]
pub struct PlaintextStore {
    path: PathBuf,
}

impl PlaintextStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<BTreeMap<String, PlaintextRecord>, IgtokenError> {
        load_records(&self.path)
    }
}

impl CredentialStore for PlaintextStore {
    fn save(&self, alias: &str, account: &Account) -> Result<(), IgtokenError> {
        let mut records = self.load()?;
        if let Some(existing) = records.get(alias) {
            existing.check_policy()?;
        }
        records.insert(
            alias.to_string(),
            PlaintextRecord {
                access_token: Some(account.access_token.clone()),
                token_hash: None,
                metadata: account.metadata.clone(),
            },
        );
        save_records(&self.path, &records)?;
        tracing::debug!(alias, "saved plaintext account record");
        Ok(())
    }

    fn save_metadata(&self, alias: &str, metadata: &AccountMetadata) -> Result<(), IgtokenError> {
        let mut records = self.load()?;
        let access_token = match records.get(alias) {
            Some(existing) => {
                existing.check_policy()?;
                existing.access_token.clone()
            }
            None => None,
        };
        records.insert(
            alias.to_string(),
            PlaintextRecord {
                access_token,
                token_hash: None,
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
        let access_token = record
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| IgtokenError::CredentialMissing(alias.to_string()))?;
        Ok(Some(Account {
            access_token,
            metadata: record.metadata,
        }))
    }

    fn remove(&self, alias: &str) -> Result<bool, IgtokenError> {
        let mut records = self.load()?;
        match records.get(alias) {
            Some(existing) => existing.check_policy()?,
            None => return Ok(false),
        }
        records.remove(alias);
        save_records(&self.path, &records)?;
        Ok(true)
    }

    fn list(&self) -> Result<BTreeMap<String, AccountMetadata>, IgtokenError> {
        Ok(self
            .load()?
            .into_iter()
            .map(|(alias, record)| (alias, record.metadata))
            .collect())
    }

    fn policy(&self) -> StoragePolicy {
        StoragePolicy::Plaintext
    }
}
