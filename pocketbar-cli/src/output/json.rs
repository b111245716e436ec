//! JSON output formatting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use pocketbar_core::SensorSnapshot;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for a single sensor.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorOutput {
    pub unique_id: String,
    pub name: String,
    /// Display text; `"unavailable"` before the first successful refresh.
    pub state: String,
    pub unit: String,
    pub device_class: String,
    pub icon: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_datetime_opt")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl From<&SensorSnapshot> for SensorOutput {
    fn from(snapshot: &SensorSnapshot) -> Self {
        Self {
            unique_id: snapshot.unique_id.clone(),
            name: snapshot.name.clone(),
            state: snapshot.state_text(),
            unit: snapshot.unit.clone(),
            device_class: snapshot.device_class.to_string(),
            icon: snapshot.icon.clone(),
            available: snapshot.available,
            last_updated: snapshot.last_updated,
            last_error: snapshot.last_error.clone(),
            attributes: snapshot.attributes.clone(),
        }
    }
}

// ============================================================================
// Serialization helpers
// ============================================================================

fn serialize_datetime_opt<S>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => s.serialize_str(&dt.to_rfc3339()),
        None => s.serialize_none(),
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats sensors as an array.
    pub fn format_snapshots(&self, snapshots: &[SensorSnapshot]) -> Result<String> {
        let outputs: Vec<SensorOutput> = snapshots.iter().map(SensorOutput::from).collect();
        self.format(&outputs)
    }
}

// ============================================================================
// Tests
// ============================================================================
