//! Named accounts and the default-account setting.
//!
//! The registry owns `settings.json` and delegates record storage to a
//! [`CredentialStore`]. It keeps one invariant across every mutation: the
//! default alias, when set, names an account that exists.

pub mod bundle;

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::loader::{read_json_or_default, write_json};
use crate::config::{AppConfig, ConfigPaths, StoragePolicy};
use crate::error::IgtokenError;
use crate::store::{open_store, CredentialStore};
use crate::types::{Account, AccountMetadata, TokenStatus};

pub use bundle::{ExportBundle, ImportSummary, BUNDLE_VERSION};

/// Contents of `settings.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_account: Option<String>,
    /// Policy the stored accounts were written with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StoragePolicy>,
}

/// Check an alias against `[A-Za-z0-9_-]+`.
pub fn validate_alias(alias: &str) -> Result<(), IgtokenError> {
    if alias.is_empty() {
        return Err(IgtokenError::validation("alias", "must not be empty"));
    }
    if let Some(bad) = alias
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(IgtokenError::validation(
            "alias",
            format!("'{alias}' contains '{bad}'; use letters, digits, '-' or '_'"),
        ));
    }
    Ok(())
}

/// Closest known alias within edit distance 2, if exactly one is closest.
pub fn suggest_alias<'a>(input: &str, known: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut best_dist = usize::MAX;
    let mut best: Option<&str> = None;
    let mut ambiguous = false;

    for alias in known {
        let dist = strsim::levenshtein(input, alias);
        if dist < best_dist {
            best_dist = dist;
            best = Some(alias);
            ambiguous = false;
        } else if dist == best_dist {
            ambiguous = true;
        }
    }

    if best_dist <= 2 && !ambiguous {
        best.map(str::to_string)
    } else {
        None
    }
}

pub struct AccountRegistry {
    store: Box<dyn CredentialStore>,
    settings_path: PathBuf,
}

impl AccountRegistry {
    pub fn new(store: Box<dyn CredentialStore>, settings_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            settings_path: settings_path.into(),
        }
    }

    /// Registry over the configuration directory.
    ///
    /// Without a requested policy the one recorded in `settings.json` is used,
    /// else the default. Requesting a policy other than the recorded one fails.
    pub fn open(
        requested: Option<StoragePolicy>,
        paths: &ConfigPaths,
    ) -> Result<Self, IgtokenError> {
        let settings: Settings = read_json_or_default(&paths.settings_file())?;
        let policy = match (requested, settings.storage) {
            (Some(requested), Some(stored)) if requested != stored => {
                return Err(IgtokenError::StorageMismatch { stored, requested })
            }
            (requested, stored) => requested.or(stored).unwrap_or_default(),
        };
        Ok(Self::new(open_store(policy, paths), paths.settings_file()))
    }

    pub fn policy(&self) -> StoragePolicy {
        self.store.policy()
    }

    fn settings(&self) -> Result<Settings, IgtokenError> {
        read_json_or_default(&self.settings_path)
    }

    fn update_settings(&self, change: impl FnOnce(&mut Settings)) -> Result<(), IgtokenError> {
        let mut settings = self.settings()?;
        change(&mut settings);
        write_json(&self.settings_path, &settings)
    }

    /// Fail when the accounts on disk were written under another policy.
    fn ensure_policy(&self) -> Result<(), IgtokenError> {
        let requested = self.policy();
        match self.settings()?.storage {
            Some(stored) if stored != requested => {
                Err(IgtokenError::StorageMismatch { stored, requested })
            }
            _ => Ok(()),
        }
    }

    fn record_policy(&self) -> Result<(), IgtokenError> {
        let policy = self.policy();
        self.update_settings(|s| {
            s.storage.get_or_insert(policy);
        })
    }

    fn not_found(&self, alias: &str) -> IgtokenError {
        let suggestion = self
            .store
            .list()
            .ok()
            .and_then(|accounts| suggest_alias(alias, accounts.keys().map(String::as_str)));
        IgtokenError::AccountNotFound {
            alias: alias.to_string(),
            suggestion,
        }
    }

    /// Insert or replace an account. The first account becomes the default.
    pub fn save_account(&self, alias: &str, account: &Account) -> Result<(), IgtokenError> {
        validate_alias(alias)?;
        self.ensure_policy()?;
        self.store.save(alias, account)?;
        self.record_policy()?;
        if self.default_alias()?.is_none() {
            self.update_settings(|s| s.default_account = Some(alias.to_string()))?;
        }
        tracing::info!(alias, policy = %self.policy(), "saved account");
        Ok(())
    }

    pub fn get_account(&self, alias: &str) -> Result<Account, IgtokenError> {
        self.ensure_policy()?;
        self.store.get(alias)?.ok_or_else(|| self.not_found(alias))
    }

    /// The given alias, or the default one when `None`.
    pub fn resolve_alias(&self, alias: Option<&str>) -> Result<String, IgtokenError> {
        let alias = match alias {
            Some(a) => a.to_string(),
            None => self.default_alias()?.ok_or(IgtokenError::NoDefaultAccount)?,
        };
        if !self.has_account(&alias)? {
            return Err(self.not_found(&alias));
        }
        Ok(alias)
    }

    /// Like [`AccountRegistry::resolve_alias`], but loads the full account.
    pub fn resolve(&self, alias: Option<&str>) -> Result<(String, Account), IgtokenError> {
        let alias = self.resolve_alias(alias)?;
        let account = self.get_account(&alias)?;
        Ok((alias, account))
    }

    pub fn has_account(&self, alias: &str) -> Result<bool, IgtokenError> {
        Ok(self.store.list()?.contains_key(alias))
    }

    pub fn list_accounts(&self) -> Result<BTreeMap<String, AccountMetadata>, IgtokenError> {
        self.store.list()
    }

    pub fn account_count(&self) -> Result<usize, IgtokenError> {
        Ok(self.store.list()?.len())
    }

    pub fn set_default(&self, alias: &str) -> Result<(), IgtokenError> {
        if !self.has_account(alias)? {
            return Err(self.not_found(alias));
        }
        self.update_settings(|s| s.default_account = Some(alias.to_string()))?;
        tracing::info!(alias, "set default account");
        Ok(())
    }

    /// The default alias, ignoring a stale one that names no account.
    pub fn default_alias(&self) -> Result<Option<String>, IgtokenError> {
        let Some(alias) = self.settings()?.default_account else {
            return Ok(None);
        };
        if self.has_account(&alias)? {
            Ok(Some(alias))
        } else {
            tracing::debug!(alias, "ignoring stale default account");
            Ok(None)
        }
    }

    pub fn clear_default(&self) -> Result<(), IgtokenError> {
        self.update_settings(|s| s.default_account = None)
    }

    /// Delete an account and its token. When no usable default remains, the
    /// first remaining alias is promoted; an empty registry forgets both the
    /// default and the recorded policy.
    pub fn remove_account(&self, alias: &str) -> Result<(), IgtokenError> {
        self.ensure_policy()?;
        if !self.store.remove(alias)? {
            return Err(self.not_found(alias));
        }
        tracing::info!(alias, "removed account");

        if self.default_alias()?.is_none() {
            match self.store.list()?.into_keys().next() {
                Some(next) => {
                    tracing::info!(alias = %next, "promoted new default account");
                    self.update_settings(|s| s.default_account = Some(next))?;
                }
                None => self.update_settings(|s| *s = Settings::default())?,
            }
        }
        Ok(())
    }

    /// Metadata-only snapshot of every account plus the public app config.
    pub fn export(&self, config: Option<&AppConfig>) -> Result<ExportBundle, IgtokenError> {
        Ok(ExportBundle {
            version: BUNDLE_VERSION.to_string(),
            exported_at: Utc::now(),
            config: config.map(AppConfig::public),
            accounts: self.store.list()?,
            default_account: self.default_alias()?,
        })
    }

    /// Write every bundled account's metadata. Tokens already stored under an
    /// imported alias are kept; new aliases have none until re-added.
    pub fn import(&self, bundle: &ExportBundle) -> Result<ImportSummary, IgtokenError> {
        for alias in bundle.accounts.keys() {
            validate_alias(alias)?;
        }
        self.ensure_policy()?;

        let existing = self.store.list()?;
        let mut summary = ImportSummary {
            config: bundle.config.clone(),
            ..Default::default()
        };
        for (alias, metadata) in &bundle.accounts {
            self.store.save_metadata(alias, metadata)?;
            if existing.contains_key(alias) {
                summary.replaced.push(alias.clone());
            }
            summary.imported.push(alias.clone());
        }
        if !summary.imported.is_empty() {
            self.record_policy()?;
        }

        if let Some(alias) = bundle.default_account.as_deref() {
            if self.has_account(alias)? {
                self.set_default(alias)?;
            } else {
                tracing::warn!(alias, "bundled default account is not in the registry");
            }
        }
        if self.default_alias()?.is_none() {
            if let Some(first) = summary.imported.first() {
                self.set_default(first)?;
            }
        }
        summary.default_account = self.default_alias()?;

        tracing::info!(count = summary.imported.len(), "imported accounts");
        Ok(summary)
    }

    /// Expiry classification of every account at `now`.
    pub fn token_statuses(
        &self,
        now: DateTime<Utc>,
    ) -> Result<BTreeMap<String, TokenStatus>, IgtokenError> {
        Ok(self
            .store
            .list()?
            .into_iter()
            .map(|(alias, meta)| {
                let status = meta.status_at(now);
                (alias, status)
            })
            .collect())
    }

    pub fn expired_aliases(&self, now: DateTime<Utc>) -> Result<Vec<String>, IgtokenError> {
        Ok(self
            .token_statuses(now)?
            .into_iter()
            .filter(|(_, status)| status.is_expired())
            .map(|(alias, _)| alias)
            .collect())
    }

    /// Remove every account whose token has expired. Returns the removed aliases.
    pub fn remove_expired(&self, now: DateTime<Utc>) -> Result<Vec<String>, IgtokenError> {
        let expired = self.expired_aliases(now)?;
        for alias in &expired {
            self.remove_account(alias)?;
        }
        Ok(expired)
    }

    /// Remove every account and the default. Returns how many were removed.
    pub fn clear_all(&self) -> Result<usize, IgtokenError> {
        self.ensure_policy()?;
        let aliases: Vec<String> = self.store.list()?.into_keys().collect();
        for alias in &aliases {
            self.store.remove(alias)?;
        }
        self.update_settings(|s| *s = Settings::default())?;
        tracing::info!(count = aliases.len(), "cleared all accounts");
        Ok(aliases.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PlaintextStore;
    use crate::types::{AccountInfo, TOKEN_TYPE};
    use chrono::Duration;

    fn account(token: &str, last_refreshed: DateTime<Utc>, expires_in: i64) -> Account {
        Account {
            access_token: token.into(),
            metadata: AccountMetadata {
                token_type: TOKEN_TYPE.into(),
                expires_in,
                created_at: last_refreshed,
                last_refreshed,
                instagram_business_account_id: "178".into(),
                facebook_page_id: "100".into(),
                facebook_page_name: "Shop".into(),
                account_info: AccountInfo {
                    id: "178".into(),
                    username: "shop".into(),
                    ..Default::default()
                },
            },
        }
    }

    fn registry(dir: &tempfile::TempDir) -> AccountRegistry {
        AccountRegistry::new(
            Box::new(PlaintextStore::new(dir.path().join("accounts.json"))),
            dir.path().join("settings.json"),
        )
    }

    #[test]
    fn validate_alias_accepts_pattern() {
        assert!(validate_alias("brand_main-2").is_ok());
        assert!(validate_alias("").is_err());
        assert!(validate_alias("has space").is_err());
        assert!(validate_alias("dots.are.bad").is_err());
    }

    #[test]
    fn suggest_alias_close_match() {
        let known = ["brand", "personal"];
        assert_eq!(suggest_alias("brnad", known), Some("brand".into()));
        assert_eq!(suggest_alias("zzzzzzz", known), None);
    }

    #[test]
    fn suggest_alias_ambiguous() {
        assert_eq!(suggest_alias("ab", ["aa", "bb"]), None);
    }

    #[test]
    fn first_account_becomes_default() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&dir);
        let now = Utc::now();
        reg.save_account("a", &account("t1", now, 86_400)).unwrap();
        reg.save_account("b", &account("t2", now, 86_400)).unwrap();
        assert_eq!(reg.default_alias().unwrap().as_deref(), Some("a"));
        assert_eq!(reg.account_count().unwrap(), 2);
    }

    #[test]
    fn save_rejects_bad_alias() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&dir);
        let err = reg
            .save_account("bad alias", &account("t", Utc::now(), 60))
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");
        assert_eq!(reg.account_count().unwrap(), 0);
    }

    #[test]
    fn resolve_uses_default_or_errors() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&dir);
        assert!(matches!(
            reg.resolve(None).unwrap_err(),
            IgtokenError::NoDefaultAccount
        ));
        reg.save_account("a", &account("t1", Utc::now(), 60)).unwrap();
        let (alias, acct) = reg.resolve(None).unwrap();
        assert_eq!(alias, "a");
        assert_eq!(acct.access_token, "t1");
    }

    #[test]
    fn unknown_alias_suggests_neighbour() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&dir);
        reg.save_account("brand", &account("t", Utc::now(), 60)).unwrap();
        let err = reg.get_account("brnd").unwrap_err();
        assert!(err.to_string().contains("Did you mean 'brand'?"));
    }

    #[test]
    fn stale_default_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&dir);
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"defaultAccount":"ghost"}"#,
        )
        .unwrap();
        assert_eq!(reg.default_alias().unwrap(), None);
    }

    #[test]
    fn remove_repairs_stale_default() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&dir);
        let now = Utc::now();
        for alias in ["a", "b", "c"] {
            reg.save_account(alias, &account(alias, now, 60)).unwrap();
        }
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"defaultAccount":"ghost","storage":"plaintext"}"#,
        )
        .unwrap();

        reg.remove_account("c").unwrap();
        assert_eq!(reg.default_alias().unwrap().as_deref(), Some("a"));
    }

    #[test]
    fn first_save_records_policy_and_empty_registry_forgets_it() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&dir);
        reg.save_account("a", &account("t", Utc::now(), 60)).unwrap();
        assert_eq!(reg.settings().unwrap().storage, Some(StoragePolicy::Plaintext));

        reg.remove_account("a").unwrap();
        assert_eq!(reg.settings().unwrap(), Settings::default());
    }

    #[test]
    fn recorded_policy_is_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&dir);
        reg.save_account("a", &account("t", Utc::now(), 60)).unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{"defaultAccount":"a","storage":"keychain"}"#,
        )
        .unwrap();

        for err in [
            reg.get_account("a").unwrap_err(),
            reg.remove_account("a").unwrap_err(),
            reg.save_account("b", &account("t", Utc::now(), 60)).unwrap_err(),
            reg.clear_all().unwrap_err(),
        ] {
            assert_eq!(err.code(), "storage_mismatch");
        }
        assert_eq!(reg.account_count().unwrap(), 1);
    }

    #[test]
    fn open_uses_recorded_policy_and_rejects_another() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ConfigPaths::new(dir.path());
        std::fs::write(paths.settings_file(), r#"{"storage":"keychain"}"#).unwrap();

        let reg = AccountRegistry::open(None, &paths).unwrap();
        assert_eq!(reg.policy(), StoragePolicy::Keychain);
        assert!(AccountRegistry::open(Some(StoragePolicy::Keychain), &paths).is_ok());
        let err = AccountRegistry::open(Some(StoragePolicy::Plaintext), &paths)
            .err()
            .unwrap();
        assert_eq!(err.code(), "storage_mismatch");
    }

    #[test]
    fn open_defaults_to_plaintext() {
        let dir = tempfile::tempdir().unwrap();
        let reg = AccountRegistry::open(None, &ConfigPaths::new(dir.path())).unwrap();
        assert_eq!(reg.policy(), StoragePolicy::Plaintext);
    }

    #[test]
    fn set_default_unknown_alias_fails() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&dir);
        assert_eq!(reg.set_default("nope").unwrap_err().code(), "not_found");
    }

    #[test]
    fn remove_promotes_next_default() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&dir);
        let now = Utc::now();
        for alias in ["a", "b", "c"] {
            reg.save_account(alias, &account(alias, now, 60)).unwrap();
        }
        reg.remove_account("a").unwrap();
        assert_eq!(reg.default_alias().unwrap().as_deref(), Some("b"));
        reg.remove_account("c").unwrap();
        assert_eq!(reg.default_alias().unwrap().as_deref(), Some("b"));
        reg.remove_account("b").unwrap();
        assert_eq!(reg.default_alias().unwrap(), None);
        assert_eq!(reg.remove_account("b").unwrap_err().code(), "not_found");
    }

    #[test]
    fn expired_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&dir);
        let now = Utc::now();
        reg.save_account("old", &account("t1", now - Duration::days(11), 86_400 * 10))
            .unwrap();
        reg.save_account("fresh", &account("t2", now, 86_400 * 10))
            .unwrap();

        let statuses = reg.token_statuses(now).unwrap();
        assert_eq!(statuses["old"], TokenStatus::Expired);
        assert_eq!(statuses["fresh"], TokenStatus::Valid { days_remaining: 10 });

        assert_eq!(reg.remove_expired(now).unwrap(), vec!["old".to_string()]);
        assert_eq!(reg.default_alias().unwrap().as_deref(), Some("fresh"));
        assert!(reg.expired_aliases(now).unwrap().is_empty());
    }

    #[test]
    fn clear_all_empties_registry() {
        let dir = tempfile::tempdir().unwrap();
        let reg = registry(&dir);
        reg.save_account("a", &account("t", Utc::now(), 60)).unwrap();
        reg.save_account("b", &account("t", Utc::now(), 60)).unwrap();
        assert_eq!(reg.clear_all().unwrap(), 2);
        assert_eq!(reg.account_count().unwrap(), 0);
        assert_eq!(reg.default_alias().unwrap(), None);
    }
}
