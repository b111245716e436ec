//! Host APIs for `PocketBar`.
//!
//! - [`keychain`] - Secure credential storage (system keychain)
//! - [`http`] - HTTP client with tracing and domain allowlist

pub mod http;
pub mod keychain;

pub use http::{HttpClient, HttpResponse};
pub use keychain::{KeychainApi, SystemKeychain};
