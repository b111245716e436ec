//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use pocketbar_store::Config;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show the configuration path.
    Path,

    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => show_path(cli),
        ConfigAction::Init { force } => init_config(cli, *force),
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;

    match cli.format {
        OutputFormat::Text => {
            println!("PocketBar Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Scan interval: {}s", config.general.scan_interval_secs);
            println!("Log level:     {}", config.general.log_level);
            println!("API base URL:  {}", config.api_base_url());
            println!(
                "Developer key: {}",
                mask_key(config.pocketsmith.developer_key.as_deref())
            );
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&masked(&config))?);
        }
    }

    Ok(())
}

fn show_path(cli: &Cli) -> Result<()> {
    let path = cli.config_path();

    match cli.format {
        OutputFormat::Text => println!("{}", path.display()),
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            let paths = serde_json::json!({ "config_file": path.display().to_string() });
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

fn init_config(cli: &Cli, force: bool) -> Result<()> {
    let path = cli.config_path();
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    Config::default().save_to(&path)?;
    if !cli.quiet {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn masked(config: &Config) -> Config {
    let mut config = config.clone();
    if let Some(key) = config.pocketsmith.developer_key.as_mut() {
        *key = mask_key(Some(key.as_str()));
    }
    config
}

/// Shows the last four characters of a key at most.
fn mask_key(key: Option<&str>) -> String {
    match key {
        None => "(not set)".to_string(),
        Some(key) if key.chars().count() <= 8 => "****".to_string(),
        Some(key) => {
            let tail: String = key.chars().skip(key.chars().count() - 4).collect();
            format!("****{tail}")
        }
    }
}
