//! The published sensor record.
//!
//! A [`SensorSnapshot`] is the full view of one sensor that the registry
//! stores and the display layer renders.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Device Class
// ============================================================================

/// How the host should interpret a sensor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    /// A money amount in the sensor's currency unit.
    Monetary,
    /// A plain count.
    Count,
}

impl DeviceClass {
    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monetary => "monetary",
            Self::Count => "count",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Sensor Value
// ============================================================================

/// Numeric state of a sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorValue {
    /// A count.
    Count(u64),
    /// A decimal money amount, serialized as a string.
    Money(Decimal),
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(count) => write!(f, "{count}"),
            Self::Money(amount) => write!(f, "{amount}"),
        }
    }
}

// ============================================================================
// Sensor Snapshot
// ============================================================================

/// Everything the host displays for one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Stable identifier.
    pub unique_id: String,
    /// Human-readable name.
    pub name: String,
    /// Unit of measurement.
    pub unit: String,
    /// How to interpret the value.
    pub device_class: DeviceClass,
    /// Material Design icon name.
    pub icon: String,
    /// Last successfully fetched value.
    pub state: Option<SensorValue>,
    /// Extra attributes from the last successful refresh.
    #[serde(default)]
    pub attributes: Map<String, Value>,
    /// False until the first refresh succeeds.
    pub available: bool,
    /// When the state was last replaced.
    pub last_updated: Option<DateTime<Utc>>,
    /// Message of the most recent failed refresh, cleared on success.
    pub last_error: Option<String>,
}

impl SensorSnapshot {
    /// Creates a snapshot with no state yet.
    pub fn new(
        unique_id: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        device_class: DeviceClass,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            unique_id: unique_id.into(),
            name: name.into(),
            unit: unit.into(),
            device_class,
            icon: icon.into(),
            state: None,
            attributes: Map::new(),
            available: false,
            last_updated: None,
            last_error: None,
        }
    }

    /// Returns true if a value has been fetched at least once.
    pub fn has_state(&self) -> bool {
        self.state.is_some()
    }

    /// Returns the state as display text, `"unavailable"` before the first
    /// successful refresh.
    pub fn state_text(&self) -> String {
        match &self.state {
            Some(value) if self.available => value.to_string(),
            _ => "unavailable".to_string(),
        }
    }
}
