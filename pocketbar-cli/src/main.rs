// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `PocketBar` CLI - `PocketSmith` balances from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Refresh once and print every sensor
//! pocketbar
//!
//! # JSON output
//! pocketbar --format json --pretty
//!
//! # Keep refreshing on the configured scan interval
//! pocketbar watch
//!
//! # Store the developer key in the system keychain
//! pocketbar auth set <KEY>
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use pocketbar_store::{Config, StoreError};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{auth, config, sensors, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// `PocketBar` CLI - `PocketSmith` account sensors.
#[derive(Parser)]
#[command(name = "pocketbar")]
#[command(about = "PocketSmith balance and transaction sensors")]
#[command(long_about = r#"
PocketBar polls the PocketSmith API and shows one sensor per account
balance plus a count of uncategorised transactions.

The developer key is looked up in this order:
  1. --developer-key
  2. POCKETSMITH_DEVELOPER_KEY
  3. pocketsmith.developer_key in the config file
  4. the system keychain (see `pocketbar auth set`)

Examples:
  pocketbar                      # Refresh once and print
  pocketbar --format json        # JSON output
  pocketbar watch                # Refresh on the scan interval
  pocketbar config show          # Current settings
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'sensors' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// `PocketSmith` developer key.
    #[arg(long, global = true)]
    pub developer_key: Option<String>,

    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// Returns the config file path in effect.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Loads the config file in effect.
    pub fn load_config(&self) -> Result<Config> {
        Ok(Config::load_from(&self.config_path())?)
    }
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Refresh every sensor once and print it (default).
    #[command(visible_alias = "s")]
    Sensors(sensors::SensorsArgs),

    /// Keep refreshing on an interval until Ctrl+C.
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),

    /// Manage the developer key in the system keychain.
    Auth(auth::AuthArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// General error.
    Error = 1,
    /// No developer key could be found.
    CredentialMissing = 2,
}

impl ExitCode {
    fn for_error(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<StoreError>() {
            Some(StoreError::NoCredential) => Self::CredentialMissing,
            _ => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: &str) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("pocketbar=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("pocketbar={level}")))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The configured level only applies when the file is readable; a broken
    // file is reported through the command's own load below.
    let level = cli
        .load_config()
        .map_or_else(|_| "warn".to_string(), |c| c.general.log_level);
    setup_logging(cli.verbose, cli.quiet, &level);

    let result = match &cli.command {
        Some(Commands::Sensors(args)) => sensors::run(args, &cli).await,
        Some(Commands::Watch(args)) => watch::run(args, &cli).await,
        Some(Commands::Auth(args)) => auth::run(args, &cli).await,
        Some(Commands::Config(args)) => config::run(args, &cli),
        None => sensors::run(&sensors::SensorsArgs::default(), &cli).await,
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_exit_code() {
        let err = anyhow::Error::new(StoreError::NoCredential);
        assert_eq!(ExitCode::for_error(&err) as i32, 2);

        let err = anyhow::anyhow!("boom");
        assert_eq!(ExitCode::for_error(&err) as i32, 1);
    }

    #[test]
    fn test_default_command_parses() {
        let cli = Cli::try_parse_from(["pocketbar", "--format", "json"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_config_override() {
        let cli = Cli::try_parse_from(["pocketbar", "--config", "/tmp/pb.json", "config", "path"])
            .unwrap();
        assert_eq!(cli.config_path(), PathBuf::from("/tmp/pb.json"));
    }
}
