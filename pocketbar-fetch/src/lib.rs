// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `PocketBar` Fetch
//!
//! `PocketSmith` API access for the `PocketBar` sensors.
//!
//! ## Host APIs
//!
//! - [`host::keychain`] - Secure credential storage (system keychain)
//! - [`host::http`] - HTTP client with tracing and domain allowlist
//!
//! ## API Access
//!
//! - [`credential::CredentialChain`] - Resolves the developer key
//! - [`client::PocketSmithClient`] - One authenticated GET per call
//! - [`context::FetchContext`] - Shared session + credential handed to sensors
//! - [`context::PocketSmithApi`] - The calls sensors depend on
//!
//! ## Example
//!
//! ```ignore
//! use pocketbar_fetch::{Credential, FetchContext};
//!
//! let ctx = FetchContext::builder(Credential::new(key).unwrap()).build()?;
//! let user_id = ctx.user_id().await?; // via PocketSmithApi
//! let accounts = ctx.accounts(user_id).await?;
//! ```

pub mod client;
pub mod context;
pub mod credential;
pub mod error;
pub mod host;

// Errors
pub use error::{FetchError, HttpError, KeychainError};

// Host APIs
pub use host::{
    http::{HttpClient, HttpResponse},
    keychain::{KeychainApi, SystemKeychain},
};

// API access
pub use client::{PocketSmithClient, DEFAULT_BASE_URL, REQUEST_TIMEOUT};
pub use context::{FetchContext, FetchContextBuilder, PocketSmithApi};
pub use credential::{
    Credential, CredentialChain, CredentialSource, EnvSource, KeychainSource, StaticSource,
    DEVELOPER_KEY_ENV,
};
