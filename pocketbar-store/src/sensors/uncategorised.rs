//! Uncategorised transaction count sensor.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pocketbar_core::{DeviceClass, SensorSnapshot, SensorValue, Transaction};
use pocketbar_fetch::{FetchError, PocketSmithApi};
use serde_json::Map;
use tracing::{debug, error};

use super::{publish, record_failure, Sensor, SensorCore, SharedSnapshot};
use crate::debounce::{CallOutcome, DebounceStatus};

/// Minimum time between two transaction listings. Longer than the balance
/// cooldown because a listing is far heavier than a single account.
pub const UNCATEGORISED_COOLDOWN: Duration = Duration::from_secs(300);

const ICON: &str = "mdi:alert-circle-outline";
const UNIT: &str = "transactions";

/// Number of a user's transactions that have no category.
pub struct UncategorisedSensor {
    user_id: i64,
    core: SensorCore,
}

impl UncategorisedSensor {
    /// Creates the sensor for a user.
    pub fn new(api: Arc<dyn PocketSmithApi>, user_id: i64) -> Self {
        let initial = SensorSnapshot::new(
            Self::unique_id_for(user_id),
            "Pocketsmith Uncategorised Transactions",
            UNIT,
            DeviceClass::Count,
            ICON,
        );

        let core = SensorCore::new(initial, UNCATEGORISED_COOLDOWN, move |snapshot| {
            refresh(Arc::clone(&api), user_id, snapshot)
        });

        Self { user_id, core }
    }

    /// Builds `pocketsmith_{user_id}_uncategorised_transactions`.
    pub fn unique_id_for(user_id: i64) -> String {
        format!("pocketsmith_{user_id}_uncategorised_transactions")
    }

    /// Returns the user this sensor tracks.
    pub fn user_id(&self) -> i64 {
        self.user_id
    }
}

/// Counts transactions whose category is absent or null.
pub fn count_uncategorised(transactions: &[Transaction]) -> u64 {
    transactions
        .iter()
        .filter(|t| t.is_uncategorised())
        .count() as u64
}

async fn refresh(
    api: Arc<dyn PocketSmithApi>,
    user_id: i64,
    snapshot: SharedSnapshot,
) -> Result<(), FetchError> {
    let transactions = match api.transactions(user_id).await {
        Ok(transactions) => transactions,
        Err(e) => {
            error!(user_id, error = %e, "Failed to refresh uncategorised transactions");
            record_failure(&snapshot, &e).await;
            return Err(e);
        }
    };

    let count = count_uncategorised(&transactions);
    debug!(user_id, count, total = transactions.len(), "Counted uncategorised transactions");

    publish(&snapshot, SensorValue::Count(count), Map::new()).await;
    Ok(())
}

#[async_trait]
impl Sensor for UncategorisedSensor {
    fn unique_id(&self) -> &str {
        self.core.unique_id()
    }

    async fn snapshot(&self) -> SensorSnapshot {
        self.core.snapshot().await
    }

    async fn request_refresh(&self) -> CallOutcome {
        self.core.request_refresh().await
    }

    fn debounce_status(&self) -> DebounceStatus {
        self.core.debounce_status()
    }

    fn shutdown(&self) {
        self.core.shutdown();
    }
}
