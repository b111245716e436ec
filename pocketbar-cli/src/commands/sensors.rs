//! Sensors command - refresh once and print.

use anyhow::Result;
use clap::Args;
use pocketbar_core::SensorSnapshot;
use tracing::debug;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

use super::connect;

/// Arguments for the sensors command.
#[derive(Args, Default)]
pub struct SensorsArgs {
    /// Only show the sensor with this unique ID.
    #[arg(long, short)]
    pub sensor: Option<String>,

    /// Print the sensors discovered without refreshing them.
    #[arg(long)]
    pub no_refresh: bool,
}

/// Runs the sensors command.
pub async fn run(args: &SensorsArgs, cli: &Cli) -> Result<()> {
    let config = cli.load_config()?;
    let coordinator = connect(cli, &config).await?;

    if !args.no_refresh {
        let reports = coordinator.refresh_all().await?;
        let failed = reports.iter().filter(|r| r.outcome.is_failure()).count();
        debug!(sensors = reports.len(), failed, "Refreshed sensors");
    }

    let snapshots = coordinator.snapshots().await;
    coordinator.shutdown().await;
    let snapshots = filter_sensor(snapshots, args.sensor.as_deref())?;

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_snapshots(&snapshots));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_snapshots(&snapshots)?);
        }
    }

    Ok(())
}

fn filter_sensor(
    snapshots: Vec<SensorSnapshot>,
    id: Option<&str>,
) -> Result<Vec<SensorSnapshot>> {
    let Some(id) = id else {
        return Ok(snapshots);
    };

    let selected: Vec<SensorSnapshot> = snapshots
        .into_iter()
        .filter(|s| s.unique_id == id)
        .collect();
    if selected.is_empty() {
        anyhow::bail!("Unknown sensor: {id}");
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocketbar_core::DeviceClass;

    fn snapshot(id: &str) -> SensorSnapshot {
        SensorSnapshot::new(id, id, "NZD", DeviceClass::Monetary, "mdi:currency-usd")
    }

    #[test]
    fn test_select_all() {
        let all = vec![snapshot("a"), snapshot("b")];
        assert_eq!(filter_sensor(all, None).unwrap().len(), 2);
    }

    #[test]
    fn test_select_one() {
        let all = vec![snapshot("a"), snapshot("b")];
        let selected = filter_sensor(all, Some("b")).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].unique_id, "b");
    }

    #[test]
    fn test_select_unknown() {
        let err = filter_sensor(vec![snapshot("a")], Some("zzz")).unwrap_err();
        assert!(err.to_string().contains("zzz"));
    }
}
