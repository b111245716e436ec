//! Store error types.

use pocketbar_fetch::FetchError;
use thiserror::Error;

/// Errors raised while setting up or managing sensors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No developer key in any credential source.
    #[error("No PocketSmith developer key configured")]
    NoCredential,

    /// A credential source failed.
    #[error("Credential lookup failed: {0}")]
    Credential(FetchError),

    /// A discovery call failed during setup.
    #[error("Discovery failed: {0}")]
    Discovery(#[from] FetchError),

    /// Two sensors share a unique ID.
    #[error("Duplicate sensor: {0}")]
    DuplicateSensor(String),

    /// The coordinator was already shut down.
    #[error("Coordinator has been shut down")]
    ShutDown,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns true if setup failed because of the credential, either
    /// missing or rejected by the API.
    pub fn is_auth(&self) -> bool {
        match self {
            StoreError::NoCredential => true,
            StoreError::Discovery(e) => e.is_auth(),
            _ => false,
        }
    }
}
