//! Developer key resolution.
//!
//! The key is looked up once at startup through a [`CredentialChain`]. The
//! resolved [`Credential`] is immutable and shared by every sensor.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::host::keychain::{accounts, services, KeychainApi};

/// Environment variable checked for the developer key.
pub const DEVELOPER_KEY_ENV: &str = "POCKETSMITH_DEVELOPER_KEY";

// ============================================================================
// Credential
// ============================================================================

/// A `PocketSmith` developer key.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Arc<str>);

impl Credential {
    /// Wraps a secret as given. Returns `None` for empty or all-whitespace
    /// input.
    pub fn new(secret: impl AsRef<str>) -> Option<Self> {
        let secret = secret.as_ref();
        if secret.trim().is_empty() {
            None
        } else {
            Some(Self(Arc::from(secret)))
        }
    }

    /// Returns the secret.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

// ============================================================================
// Credential Sources
// ============================================================================

/// One place a developer key may be found.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Returns the key if this source has one.
    async fn resolve(&self) -> Result<Option<Credential>, FetchError>;
}

/// A key supplied directly (command line or config file).
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: &'static str,
    value: Option<String>,
}

impl StaticSource {
    /// Creates a source named `name` holding `value`.
    pub fn new(name: &'static str, value: Option<String>) -> Self {
        Self { name, value }
    }
}

#[async_trait]
impl CredentialSource for StaticSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn resolve(&self) -> Result<Option<Credential>, FetchError> {
        Ok(self.value.as_deref().and_then(Credential::new))
    }
}

/// A key read from an environment variable.
#[derive(Debug, Clone)]
pub struct EnvSource {
    var: String,
}

impl EnvSource {
    /// Reads from `var`.
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvSource {
    fn default() -> Self {
        Self::new(DEVELOPER_KEY_ENV)
    }
}

#[async_trait]
impl CredentialSource for EnvSource {
    fn name(&self) -> &str {
        "env"
    }

    async fn resolve(&self) -> Result<Option<Credential>, FetchError> {
        Ok(std::env::var(&self.var).ok().and_then(Credential::new))
    }
}

/// A key stored in the system keychain.
pub struct KeychainSource {
    keychain: Arc<dyn KeychainApi>,
}

impl KeychainSource {
    /// Reads `pocketsmith/developer_key` from `keychain`.
    pub fn new(keychain: Arc<dyn KeychainApi>) -> Self {
        Self { keychain }
    }
}

#[async_trait]
impl CredentialSource for KeychainSource {
    fn name(&self) -> &str {
        "keychain"
    }

    async fn resolve(&self) -> Result<Option<Credential>, FetchError> {
        let secret = self
            .keychain
            .get(services::POCKETSMITH, accounts::DEVELOPER_KEY)
            .await?;
        Ok(secret.and_then(Credential::new))
    }
}

// ============================================================================
// Credential Chain
// ============================================================================

/// Sources tried in order; the first key found wins.
///
/// A source that errors is logged and skipped so that, for example, a
/// locked keychain does not hide a key set in the environment.
#[derive(Default)]
pub struct CredentialChain {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a source.
    #[must_use]
    pub fn with(mut self, source: impl CredentialSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Returns the number of sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns true if there are no sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[async_trait]
impl CredentialSource for CredentialChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn resolve(&self) -> Result<Option<Credential>, FetchError> {
        for source in &self.sources {
            match source.resolve().await {
                Ok(Some(credential)) => {
                    debug!(source = source.name(), "Developer key resolved");
                    return Ok(Some(credential));
                }
                Ok(None) => debug!(source = source.name(), "No developer key"),
                Err(e) => warn!(source = source.name(), error = %e, "Credential source failed"),
            }
        }
        Ok(None)
    }
}
