//! In-process sensor registry.
//!
//! Holds every sensor by unique ID in registration order and notifies
//! subscribers through a watch channel whenever a refresh round finishes.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;
use pocketbar_core::SensorSnapshot;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use crate::debounce::CallOutcome;
use crate::error::StoreError;
use crate::sensors::Sensor;

// ============================================================================
// Refresh Report
// ============================================================================

/// Outcome of a refresh request for one sensor.
#[derive(Debug)]
pub struct RefreshReport {
    /// Sensor ID.
    pub unique_id: String,
    /// What the debouncer did with the request.
    pub outcome: CallOutcome,
}

// ============================================================================
// Inner State
// ============================================================================

#[derive(Default)]
struct RegistryInner {
    ids: HashSet<String>,
    sensors: Vec<Arc<dyn Sensor>>,
}

// ============================================================================
// Sensor Registry
// ============================================================================

/// Registry of all live sensors.
pub struct SensorRegistry {
    inner: RwLock<RegistryInner>,
    notify: watch::Sender<u64>,
}

impl Default for SensorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        let (notify, _) = watch::channel(0);
        Self {
            inner: RwLock::new(RegistryInner::default()),
            notify,
        }
    }

    /// Adds a sensor. Fails if its unique ID is already taken.
    pub async fn register(&self, sensor: Arc<dyn Sensor>) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.write().await;
            let id = sensor.unique_id().to_string();
            if !inner.ids.insert(id.clone()) {
                return Err(StoreError::DuplicateSensor(id));
            }
            debug!(unique_id = %id, "Sensor registered");
            inner.sensors.push(sensor);
        }
        self.notify_change();
        Ok(())
    }

    /// Adds several sensors, skipping duplicates. Returns how many were added.
    pub async fn register_all(&self, sensors: Vec<Arc<dyn Sensor>>) -> usize {
        let mut added = 0;
        for sensor in sensors {
            match self.register(sensor).await {
                Ok(()) => added += 1,
                Err(e) => warn!(error = %e, "Skipping sensor"),
            }
        }
        added
    }

    /// Gets a sensor by unique ID.
    pub async fn get(&self, unique_id: &str) -> Option<Arc<dyn Sensor>> {
        self.inner
            .read()
            .await
            .sensors
            .iter()
            .find(|s| s.unique_id() == unique_id)
            .cloned()
    }

    /// Returns all sensors in registration order.
    pub async fn sensors(&self) -> Vec<Arc<dyn Sensor>> {
        self.inner.read().await.sensors.clone()
    }

    /// Returns the number of sensors.
    pub async fn len(&self) -> usize {
        self.inner.read().await.sensors.len()
    }

    /// Returns true if no sensor is registered.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns every sensor's published view.
    pub async fn snapshots(&self) -> Vec<SensorSnapshot> {
        let sensors = self.sensors().await;
        join_all(sensors.iter().map(|s| s.snapshot())).await
    }

    /// Requests a refresh on every sensor at once.
    ///
    /// Each sensor's debouncer decides independently whether to run; a
    /// failure in one sensor has no effect on the others.
    pub async fn refresh_all(&self) -> Vec<RefreshReport> {
        let sensors = self.sensors().await;
        let outcomes = join_all(sensors.iter().map(|s| s.request_refresh())).await;

        let reports: Vec<RefreshReport> = sensors
            .iter()
            .zip(outcomes)
            .map(|(sensor, outcome)| RefreshReport {
                unique_id: sensor.unique_id().to_string(),
                outcome,
            })
            .collect();

        let failed = reports.iter().filter(|r| r.outcome.is_failure()).count();
        debug!(sensors = reports.len(), failed, "Refresh round finished");
        self.notify_change();
        reports
    }

    /// Requests a refresh on one sensor.
    pub async fn refresh(&self, unique_id: &str) -> Option<CallOutcome> {
        let sensor = self.get(unique_id).await?;
        let outcome = sensor.request_refresh().await;
        self.notify_change();
        Some(outcome)
    }

    /// Shuts down and removes every sensor.
    pub async fn clear(&self) {
        let sensors = {
            let mut inner = self.inner.write().await;
            inner.ids.clear();
            std::mem::take(&mut inner.sensors)
        };
        for sensor in &sensors {
            sensor.shutdown();
        }
        info!(sensors = sensors.len(), "Sensors removed");
        self.notify_change();
    }

    /// Subscribes to change notifications.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.notify.subscribe()
    }

    fn notify_change(&self) {
        self.notify.send_modify(|version| *version += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::testing::FakeApi;
    use crate::sensors::{AccountBalanceSensor, UncategorisedSensor};
    use pocketbar_core::Account;
    use pocketbar_fetch::PocketSmithApi;

    fn api() -> Arc<dyn PocketSmithApi> {
        let api = FakeApi::default();
        api.set_account(Ok(Account::new(1, "Everyday")));
        api.set_transactions(Err(500));
        Arc::new(api)
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_is_rejected() {
        let api = api();
        let registry = SensorRegistry::new();
        let account = Account::new(1, "Everyday");

        registry
            .register(Arc::new(AccountBalanceSensor::new(Arc::clone(&api), &account)))
            .await
            .unwrap();
        let result = registry
            .register(Arc::new(AccountBalanceSensor::new(api, &account)))
            .await;

        assert!(matches!(result, Err(StoreError::DuplicateSensor(_))));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_all_isolates_failures() {
        let api = api();
        let registry = SensorRegistry::new();
        let sensors: Vec<Arc<dyn Sensor>> = vec![
            Arc::new(AccountBalanceSensor::new(
                Arc::clone(&api),
                &Account::new(1, "Everyday"),
            )),
            Arc::new(UncategorisedSensor::new(api, 42)),
        ];
        assert_eq!(registry.register_all(sensors).await, 2);

        let mut rx = registry.subscribe();
        let reports = registry.refresh_all().await;
        assert!(rx.has_changed().unwrap());
        rx.mark_unchanged();

        assert_eq!(reports.len(), 2);
        assert!(matches!(reports[0].outcome, CallOutcome::Executed(Ok(()))));
        assert!(reports[1].outcome.is_failure());

        let snapshots = registry.snapshots().await;
        assert!(snapshots[0].available);
        assert!(!snapshots[1].available);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_shuts_down_sensors() {
        let api = api();
        let registry = SensorRegistry::new();
        let sensor = Arc::new(UncategorisedSensor::new(api, 42));
        registry.register(sensor.clone()).await.unwrap();

        registry.clear().await;
        assert!(registry.is_empty().await);
        assert!(matches!(sensor.request_refresh().await, CallOutcome::ShutDown));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_unknown_sensor() {
        let registry = SensorRegistry::new();
        assert!(registry.refresh("nope").await.is_none());
    }
}
