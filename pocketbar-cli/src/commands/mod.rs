//! CLI command implementations.

pub mod auth;
pub mod config;
pub mod sensors;
pub mod watch;

use std::sync::Arc;

use anyhow::Result;
use pocketbar_fetch::SystemKeychain;
use pocketbar_store::{Config, Coordinator};

use crate::Cli;

/// Resolves the developer key and runs discovery.
pub async fn connect(cli: &Cli, config: &Config) -> Result<Coordinator> {
    let keychain = Arc::new(SystemKeychain::new());
    let chain = config.credential_chain(cli.developer_key.clone(), keychain);
    Ok(Coordinator::setup(config, &chain).await?)
}
