//! `PocketSmith` API client.
//!
//! Stateless: every call issues exactly one authenticated GET and decodes
//! the JSON body. There is no caching and no retry; callers are expected
//! to rate-limit themselves.

use std::sync::Arc;
use std::time::Duration;

use pocketbar_core::{Account, Transaction, User};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::credential::Credential;
use crate::error::{FetchError, HttpError};
use crate::host::http::HttpClient;

// ============================================================================
// Constants
// ============================================================================

/// `PocketSmith` API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.pocketsmith.com/v2";

/// Per-call timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// API Client
// ============================================================================

/// Client for the `PocketSmith` endpoints the sensors use.
#[derive(Debug, Clone)]
pub struct PocketSmithClient {
    http: Arc<HttpClient>,
    base_url: String,
    timeout: Duration,
}

impl PocketSmithClient {
    /// Creates a client against the public API.
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self::with_base_url(http, DEFAULT_BASE_URL)
    }

    /// Creates a client against another base URL (tests, proxies).
    pub fn with_base_url(http: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn build_headers(credential: &Credential) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut auth = HeaderValue::from_str(&format!("Key {}", credential.expose()))
            .map_err(|e| HttpError::InvalidHeader(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        Ok(headers)
    }

    /// Issues one GET and decodes a 200 response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        credential: &Credential,
        path: &str,
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let headers = Self::build_headers(credential)?;

        let request = self.http.get_with_headers(&url, headers, self.timeout);
        let response = match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(HttpError::Timeout)) | Err(_) => {
                return Err(FetchError::Timeout(self.timeout));
            }
            Ok(Err(e)) => return Err(e.into()),
        };

        match response.status {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(FetchError::Auth(format!(
                    "developer key rejected with HTTP {}",
                    response.status.as_u16()
                )));
            }
            status => {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                    url,
                });
            }
        }

        serde_json::from_str(&response.body).map_err(|e| {
            warn!(url = %url, error = %e, "Failed to decode response");
            FetchError::Decode(e)
        })
    }

    /// Fetches the authenticated user (`GET /me`).
    #[instrument(skip(self, credential))]
    pub async fn get_user(&self, credential: &Credential) -> Result<User, FetchError> {
        debug!("Fetching current user");
        self.get_json(credential, "/me").await
    }

    /// Fetches the authenticated user's ID.
    pub async fn get_user_id(&self, credential: &Credential) -> Result<i64, FetchError> {
        Ok(self.get_user(credential).await?.id)
    }

    /// Fetches all accounts of a user (`GET /users/{id}/accounts`).
    #[instrument(skip(self, credential))]
    pub async fn get_accounts(
        &self,
        credential: &Credential,
        user_id: i64,
    ) -> Result<Vec<Account>, FetchError> {
        debug!("Fetching accounts");
        self.get_json(credential, &format!("/users/{user_id}/accounts"))
            .await
    }

    /// Fetches a single account (`GET /accounts/{id}`).
    #[instrument(skip(self, credential))]
    pub async fn get_account(
        &self,
        credential: &Credential,
        account_id: i64,
    ) -> Result<Account, FetchError> {
        debug!("Fetching account");
        self.get_json(credential, &format!("/accounts/{account_id}"))
            .await
    }

    /// Fetches a user's transactions (`GET /users/{id}/transactions`).
    ///
    /// Only the first page the API returns is read.
    #[instrument(skip(self, credential))]
    pub async fn get_transactions(
        &self,
        credential: &Credential,
        user_id: i64,
    ) -> Result<Vec<Transaction>, FetchError> {
        debug!("Fetching transactions");
        self.get_json(credential, &format!("/users/{user_id}/transactions"))
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================
