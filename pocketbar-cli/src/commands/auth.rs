//! Auth command - developer key in the system keychain.

use anyhow::Result;
use clap::{Args, Subcommand};
use pocketbar_fetch::host::keychain::{accounts, services};
use pocketbar_fetch::{KeychainApi, SystemKeychain};

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the auth command.
#[derive(Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub action: AuthAction,
}

/// Auth subcommands.
#[derive(Subcommand)]
pub enum AuthAction {
    /// Store a developer key.
    Set {
        /// The `PocketSmith` developer key.
        key: String,
    },

    /// Remove the stored developer key.
    Delete,

    /// Show whether a developer key is stored.
    Status,
}

/// Runs the auth command.
pub async fn run(args: &AuthArgs, cli: &Cli) -> Result<()> {
    let keychain = SystemKeychain::new();

    match &args.action {
        AuthAction::Set { key } => {
            let key = key.trim();
            if key.is_empty() {
                anyhow::bail!("Developer key is empty");
            }
            keychain
                .set(services::POCKETSMITH, accounts::DEVELOPER_KEY, key)
                .await?;
            if !cli.quiet {
                println!("Developer key stored in the system keychain");
            }
        }
        AuthAction::Delete => {
            keychain
                .delete(services::POCKETSMITH, accounts::DEVELOPER_KEY)
                .await?;
            if !cli.quiet {
                println!("Developer key removed");
            }
        }
        AuthAction::Status => {
            let stored = keychain
                .exists(services::POCKETSMITH, accounts::DEVELOPER_KEY)
                .await;
            match cli.format {
                OutputFormat::Text => {
                    let status = if stored { "stored" } else { "not stored" };
                    println!("Keychain developer key: {status}");
                }
                OutputFormat::Json => {
                    let formatter = JsonFormatter::new(cli.pretty);
                    println!("{}", formatter.format(&serde_json::json!({ "stored": stored }))?);
                }
            }
        }
    }

    Ok(())
}
