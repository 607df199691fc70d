use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::IgtokenError;

/// Service name under which tokens are filed in the OS keychain.
pub const KEYCHAIN_SERVICE: &str = "igtoken";

/// Platform secret storage keyed by `(service, account)`.
pub trait SecretVault: Send + Sync {
    fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), IgtokenError>;

    /// `Ok(None)` when no entry exists.
    fn get(&self, service: &str, account: &str) -> Result<Option<String>, IgtokenError>;

    /// Removing an entry that is already gone succeeds.
    fn delete(&self, service: &str, account: &str) -> Result<(), IgtokenError>;
}

/// The OS keychain (macOS Keychain, Windows Credential Manager, Secret Service).
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyringVault;

impl KeyringVault {
    fn entry(service: &str, account: &str) -> Result<keyring::Entry, IgtokenError> {
        keyring::Entry::new(service, account)
            .map_err(|e| IgtokenError::Keychain(format!("failed to access keychain: {e}")))
    }
}

impl SecretVault for KeyringVault {
    fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), IgtokenError> {
        Self::entry(service, account)?
            .set_password(secret)
            .map_err(|e| {
                IgtokenError::Keychain(format!("failed to store token for '{account}': {e}"))
            })
    }

    fn get(&self, service: &str, account: &str) -> Result<Option<String>, IgtokenError> {
        match Self::entry(service, account)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(IgtokenError::Keychain(format!(
                "failed to load token for '{account}': {e}"
            ))),
        }
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), IgtokenError> {
        match Self::entry(service, account)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(IgtokenError::Keychain(format!(
                "failed to delete token for '{account}': {e}"
            ))),
        }
    }
}

/// In-process vault. Secrets live only as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryVault {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<(String, String), String>>, IgtokenError> {
        self.entries
            .lock()
            .map_err(|_| IgtokenError::Keychain("vault lock poisoned".into()))
    }
}

impl SecretVault for MemoryVault {
    fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), IgtokenError> {
        self.lock()?
            .insert((service.to_string(), account.to_string()), secret.to_string());
        Ok(())
    }

    fn get(&self, service: &str, account: &str) -> Result<Option<String>, IgtokenError> {
        Ok(self
            .lock()?
            .get(&(service.to_string(), account.to_string()))
            .cloned())
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), IgtokenError> {
        self.lock()?
            .remove(&(service.to_string(), account.to_string()));
        Ok(())
    }
}

impl<V: SecretVault + ?Sized> SecretVault for std::sync::Arc<V> {
    fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), IgtokenError> {
        (**self).set(service, account, secret)
    }

    fn get(&self, service: &str, account: &str) -> Result<Option<String>, IgtokenError> {
        (**self).get(service, account)
    }

    fn delete(&self, service: &str, account: &str) -> Result<(), IgtokenError> {
        (**self).delete(service, account)
    }
}
