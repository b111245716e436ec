//! Developer key storage in the OS credential store.

use async_trait::async_trait;
use keyring::Entry;
use tracing::debug;

use crate::error::KeychainError;

/// Prefix that keeps our entries apart from other apps using the same store.
const SERVICE_PREFIX: &str = "pocketbar";

/// Read/write access to stored secrets, keyed by service and account.
///
/// A missing entry reads as `Ok(None)` and deletes as `Ok(())`.
#[async_trait]
pub trait KeychainApi: Send + Sync {
    /// Reads a secret.
    async fn get(&self, service: &str, account: &str) -> Result<Option<String>, KeychainError>;

    /// Stores a secret, replacing any previous one.
    async fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError>;

    /// Removes a secret.
    async fn delete(&self, service: &str, account: &str) -> Result<(), KeychainError>;

    /// Returns true if a non-empty secret is stored. Read errors count as absent.
    async fn exists(&self, service: &str, account: &str) -> bool {
        matches!(self.get(service, account).await, Ok(Some(_)))
    }
}

/// [`KeychainApi`] over the `keyring` crate.
#[derive(Debug, Clone, Default)]
pub struct SystemKeychain;

impl SystemKeychain {
    /// Creates the system keychain handle.
    pub fn new() -> Self {
        Self
    }

    fn full_service(service: &str) -> String {
        format!("{SERVICE_PREFIX}:{service}")
    }

    fn entry(service: &str, account: &str) -> Result<Entry, KeychainError> {
        Entry::new(&Self::full_service(service), account).map_err(KeychainError::from)
    }
}

#[async_trait]
impl KeychainApi for SystemKeychain {
    async fn get(&self, service: &str, account: &str) -> Result<Option<String>, KeychainError> {
        let secret = match Self::entry(service, account)?.get_password() {
            Ok(secret) if !secret.is_empty() => Some(secret),
            Ok(_) | Err(keyring::Error::NoEntry) => None,
            Err(e) => return Err(e.into()),
        };
        debug!(service, account, found = secret.is_some(), "Keychain lookup");
        Ok(secret)
    }

    async fn set(&self, service: &str, account: &str, secret: &str) -> Result<(), KeychainError> {
        Self::entry(service, account)?.set_password(secret)?;
        debug!(service, account, "Keychain entry stored");
        Ok(())
    }

    async fn delete(&self, service: &str, account: &str) -> Result<(), KeychainError> {
        match Self::entry(service, account)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Service names under [`SERVICE_PREFIX`].
pub mod services {
    /// `PocketSmith` API.
    pub const POCKETSMITH: &str = "pocketsmith";
}

/// Account names within a service.
pub mod accounts {
    /// `PocketSmith` developer key.
    pub const DEVELOPER_KEY: &str = "developer_key";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_service_name() {
        assert_eq!(
            SystemKeychain::full_service(services::POCKETSMITH),
            "pocketbar:pocketsmith"
        );
    }
}
