//! Shared fetch context.
//!
//! A [`FetchContext`] bundles the single HTTP session and the developer key.
//! It is built once during setup and cloned into every sensor; clones share
//! the same session and nothing in it is mutable.
//!
//! Sensors only see the [`PocketSmithApi`] trait, so they can be driven by
//! any implementation.

use std::sync::Arc;

use async_trait::async_trait;
use pocketbar_core::{Account, Transaction};
use url::Url;

use crate::client::{PocketSmithClient, DEFAULT_BASE_URL};
use crate::credential::Credential;
use crate::error::{FetchError, HttpError};
use crate::host::http::HttpClient;

// ============================================================================
// API Trait
// ============================================================================

/// The remote calls the sensors and the coordinator make.
#[async_trait]
pub trait PocketSmithApi: Send + Sync {
    /// Fetches the authenticated user's ID.
    async fn user_id(&self) -> Result<i64, FetchError>;

    /// Fetches all accounts of a user.
    async fn accounts(&self, user_id: i64) -> Result<Vec<Account>, FetchError>;

    /// Fetches a single account.
    async fn account(&self, account_id: i64) -> Result<Account, FetchError>;

    /// Fetches a user's transactions.
    async fn transactions(&self, user_id: i64) -> Result<Vec<Transaction>, FetchError>;
}

// ============================================================================
// Fetch Context
// ============================================================================

/// The API client plus the credential every call is made with.
#[derive(Debug, Clone)]
pub struct FetchContext {
    client: PocketSmithClient,
    credential: Credential,
}

impl FetchContext {
    /// Creates a context from an existing client.
    pub fn new(client: PocketSmithClient, credential: Credential) -> Self {
        Self { client, credential }
    }

    /// Creates a builder.
    pub fn builder(credential: Credential) -> FetchContextBuilder {
        FetchContextBuilder::new(credential)
    }

    /// Returns the API client.
    pub fn client(&self) -> &PocketSmithClient {
        &self.client
    }

    /// Returns the credential.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }
}

#[async_trait]
impl PocketSmithApi for FetchContext {
    async fn user_id(&self) -> Result<i64, FetchError> {
        self.client.get_user_id(&self.credential).await
    }

    async fn accounts(&self, user_id: i64) -> Result<Vec<Account>, FetchError> {
        self.client.get_accounts(&self.credential, user_id).await
    }

    async fn account(&self, account_id: i64) -> Result<Account, FetchError> {
        self.client.get_account(&self.credential, account_id).await
    }

    async fn transactions(&self, user_id: i64) -> Result<Vec<Transaction>, FetchError> {
        self.client.get_transactions(&self.credential, user_id).await
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`FetchContext`].
#[derive(Debug)]
pub struct FetchContextBuilder {
    credential: Credential,
    base_url: String,
}

impl FetchContextBuilder {
    /// Starts a builder for the public API.
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builds the context. The HTTP session only accepts requests to the
    /// base URL's host.
    pub fn build(self) -> Result<FetchContext, FetchError> {
        let parsed =
            Url::parse(&self.base_url).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| HttpError::InvalidUrl("No host in URL".to_string()))?
            .to_string();

        let http = HttpClient::new()?.allow_domains(vec![host]);
        let client = PocketSmithClient::with_base_url(Arc::new(http), self.base_url);
        Ok(FetchContext::new(client, self.credential))
    }
}
