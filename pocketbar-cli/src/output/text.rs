//! Text output formatting with colors.

use chrono::{DateTime, Utc};
use pocketbar_core::{DeviceClass, SensorSnapshot};
use serde_json::Value;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats every sensor, one block each.
    pub fn format_snapshots(&self, snapshots: &[SensorSnapshot]) -> String {
        if snapshots.is_empty() {
            return self.dim("No sensors");
        }

        snapshots
            .iter()
            .map(|s| self.format_snapshot(s))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Formats one sensor.
    pub fn format_snapshot(&self, snapshot: &SensorSnapshot) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "{} {}",
            self.bold(&snapshot.name),
            self.dim(&format!("({})", snapshot.unique_id))
        ));
        lines.push(format!("  State:   {}", self.format_state(snapshot)));

        if let Some(updated) = snapshot.last_updated {
            lines.push(format!("  Updated: {}", self.dim(&format_age(updated, Utc::now()))));
        }

        for (name, balance) in transaction_accounts(snapshot) {
            lines.push(format!("    • {}: {balance}", self.cyan(&name)));
        }

        if let Some(error) = &snapshot.last_error {
            lines.push(format!("  {} {}", self.red("Last error:"), error));
        }

        lines.join("\n")
    }

    /// Formats the state with its unit, colored by sign or count.
    fn format_state(&self, snapshot: &SensorSnapshot) -> String {
        if !snapshot.available {
            return self.dim("unavailable");
        }

        let text = format!("{} {}", snapshot.state_text(), snapshot.unit);
        match snapshot.device_class {
            DeviceClass::Monetary if snapshot.state_text().starts_with('-') => self.red(&text),
            DeviceClass::Monetary => self.green(&text),
            DeviceClass::Count if snapshot.state_text() == "0" => self.green(&text),
            DeviceClass::Count => self.yellow(&text),
        }
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

/// Reads the `transaction_accounts` attribute as `(name, balance)` pairs.
pub(crate) fn transaction_accounts(snapshot: &SensorSnapshot) -> Vec<(String, String)> {
    let Some(Value::Array(items)) = snapshot.attributes.get("transaction_accounts") else {
        return Vec::new();
    };

    items
        .iter()
        .map(|item| {
            let name = item
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("Unnamed")
                .to_string();
            let balance = item
                .get("current_balance")
                .and_then(Value::as_f64)
                .map_or_else(|| "-".to_string(), |b| format!("{b:.2}"));
            (name, balance)
        })
        .collect()
}

/// Formats how long ago `at` was, relative to `now`.
pub(crate) fn format_age(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds().max(0);
    match secs {
        0..=4 => "just now".to_string(),
        5..=59 => format!("{secs}s ago"),
        60..=3599 => format!("{}m ago", secs / 60),
        _ => format!("{}h {}m ago", secs / 3600, (secs % 3600) / 60),
    }
}
