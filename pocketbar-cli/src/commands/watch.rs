//! Watch command - periodic refresh until interrupted.

use std::future::Future;
use std::io::{Write, stdout};

use anyhow::Result;
use clap::Args;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

use super::connect;

/// Arguments for watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Refresh interval in seconds (defaults to the configured scan interval).
    #[arg(long, short)]
    pub interval: Option<u64>,
}

/// Runs the watch command.
pub async fn run(args: &WatchArgs, cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    let refresh_interval = args
        .interval
        .map_or_else(|| config.scan_interval(), |secs| Duration::from_secs(secs.max(1)));

    let coordinator = connect(cli, &config).await?;
    info!(interval = ?refresh_interval, "Starting watch mode");

    let text = TextFormatter::new(!cli.no_color);
    let json = JsonFormatter::new(false);

    let mut ticker = interval(refresh_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut interrupted => {
                info!("Interrupted, shutting down");
                break;
            }
        }

        // Sensors still cooling down answer with their last snapshot.
        let round = async {
            coordinator.refresh_all().await?;
            anyhow::Ok(coordinator.snapshots().await)
        };
        let Some(snapshots) = until_interrupted(round, &mut interrupted).await else {
            info!("Interrupted during refresh, shutting down");
            break;
        };
        let snapshots = snapshots?;

        match cli.format {
            OutputFormat::Text => {
                print!("\x1b[2J\x1b[H");
                let now = chrono::Local::now();
                println!(
                    "PocketBar Watch Mode - {} (refresh: {}s)",
                    now.format("%H:%M:%S"),
                    refresh_interval.as_secs()
                );
                println!("{}", "─".repeat(50));
                println!();
                println!("{}", text.format_snapshots(&snapshots));
                println!();
                println!("Press Ctrl+C to exit");
            }
            // One document per line so the stream can be piped.
            OutputFormat::Json => println!("{}", json.format_snapshots(&snapshots)?),
        }
        stdout().flush()?;
    }

    coordinator.shutdown().await;
    Ok(())
}

/// Drives `work` to completion unless `interrupted` resolves first.
async fn until_interrupted<T>(work: impl Future<Output = T>, interrupted: impl Future) -> Option<T> {
    tokio::select! {
        biased;
        _ = interrupted => None,
        value = work => Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_cuts_refresh_short() {
        let started = tokio::time::Instant::now();
        let work = async {
            sleep(Duration::from_secs(60)).await;
            1
        };

        let result = until_interrupted(work, sleep(Duration::from_secs(1))).await;
        assert_eq!(result, None);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_finishes_without_interrupt() {
        let work = async {
            sleep(Duration::from_secs(5)).await;
            7
        };

        let result = until_interrupted(work, std::future::pending::<()>()).await;
        assert_eq!(result, Some(7));
    }
}
