//! HTTP client with tracing and a domain allowlist.
//!
//! One [`HttpClient`] is the shared session for the whole process. It is
//! cheap to clone (the inner reqwest client is reference counted) and is
//! only ever read by the sensors.

use reqwest::{header::HeaderMap, Client, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::HttpError;

/// Default request timeout, used when a call does not supply its own.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for `PocketBar`.
const USER_AGENT: &str = concat!("PocketBar/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Response
// ============================================================================

/// A fully read response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response body.
    pub body: String,
}

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with tracing and domain allowlist.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    allowed_domains: Option<Vec<String>>,
}

impl HttpClient {
    /// Creates a new HTTP client with default settings.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new HTTP client with a custom default timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            inner: client,
            allowed_domains: None,
        })
    }

    /// Restricts requests to the given domains and their subdomains.
    pub fn allow_domains(mut self, domains: Vec<String>) -> Self {
        self.allowed_domains = Some(domains);
        self
    }

    /// Checks if a URL's domain is allowed.
    fn is_domain_allowed(&self, url: &str) -> Result<(), HttpError> {
        let Some(ref allowed) = self.allowed_domains else {
            return Ok(()); // No restrictions
        };

        let parsed = Url::parse(url).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| HttpError::InvalidUrl("No host in URL".to_string()))?;

        let allowed = allowed
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{domain}")));

        if allowed {
            Ok(())
        } else {
            Err(HttpError::DomainNotAllowed(host.to_string()))
        }
    }

    /// Performs a GET request with custom headers and reads the whole body.
    ///
    /// `timeout` covers connecting, sending and reading the body.
    #[instrument(skip(self, headers), fields(url = %url))]
    pub async fn get_with_headers(
        &self,
        url: &str,
        headers: HeaderMap,
        timeout: Duration,
    ) -> Result<HttpResponse, HttpError> {
        self.is_domain_allowed(url)?;
        debug!("GET request with headers");

        let response = self
            .inner
            .get(url)
            .headers(headers)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_request_error)?;
        let status = response.status();
        debug!(status = %status, "Response received");

        let body = response.text().await.map_err(map_request_error)?;
        Ok(HttpResponse { status, body })
    }
}

fn map_request_error(err: reqwest::Error) -> HttpError {
    if err.is_timeout() {
        HttpError::Timeout
    } else {
        HttpError::Request(err)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> HttpClient {
        HttpClient::new().unwrap()
    }

    #[test]
    fn test_domain_allowlist() {
        let client = client().allow_domains(vec!["api.pocketsmith.com".to_string()]);

        assert!(client.is_domain_allowed("https://api.pocketsmith.com/v2/me").is_ok());
        assert!(client.is_domain_allowed("https://evil.com/steal").is_err());
        assert!(client.is_domain_allowed("https://pocketsmith.com/").is_err());
    }

    #[test]
    fn test_subdomain_matching() {
        let client = client().allow_domains(vec!["pocketsmith.com".to_string()]);
        assert!(client.is_domain_allowed("https://api.pocketsmith.com/v2/me").is_ok());
    }

    #[test]
    fn test_no_domain_restrictions() {
        assert!(client().is_domain_allowed("https://any.domain.com").is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let client = client().allow_domains(vec!["example.com".to_string()]);
        assert!(matches!(
            client.is_domain_allowed("not-a-valid-url"),
            Err(HttpError::InvalidUrl(_))
        ));
    }
}
