//! Sensors.
//!
//! Each sensor owns its published [`SensorSnapshot`] and a [`Debouncer`]
//! guarding its refresh. Nothing mutable is shared between sensors; the
//! only shared piece is the read-only API handle.
//!
//! - [`AccountBalanceSensor`] - one per account
//! - [`UncategorisedSensor`] - one per user

mod balance;
mod uncategorised;

pub use balance::{AccountBalanceSensor, BALANCE_COOLDOWN};
pub use uncategorised::{UncategorisedSensor, UNCATEGORISED_COOLDOWN};

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::FutureExt;
use pocketbar_core::{SensorSnapshot, SensorValue};
use pocketbar_fetch::FetchError;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::debounce::{CallOutcome, DebounceStatus, Debouncer};

/// Published state shared between a sensor and its refresh action.
pub(crate) type SharedSnapshot = Arc<RwLock<SensorSnapshot>>;

// ============================================================================
// Sensor Trait
// ============================================================================

/// A sensor as seen by the registry.
#[async_trait]
pub trait Sensor: Send + Sync {
    /// Stable identifier.
    fn unique_id(&self) -> &str;

    /// Current published view.
    async fn snapshot(&self) -> SensorSnapshot;

    /// Asks for a refresh. Subject to the sensor's cooldown.
    async fn request_refresh(&self) -> CallOutcome;

    /// Debounce bookkeeping.
    fn debounce_status(&self) -> DebounceStatus;

    /// Stops any queued refresh.
    fn shutdown(&self);
}

// ============================================================================
// Shared Plumbing
// ============================================================================

/// Snapshot plus the debouncer that guards its refresh.
pub(crate) struct SensorCore {
    unique_id: String,
    snapshot: SharedSnapshot,
    debouncer: Debouncer,
}

impl SensorCore {
    pub(crate) fn new<F, Fut>(initial: SensorSnapshot, cooldown: Duration, refresh: F) -> Self
    where
        F: Fn(SharedSnapshot) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), FetchError>> + Send + 'static,
    {
        let unique_id = initial.unique_id.clone();
        let snapshot = Arc::new(RwLock::new(initial));

        let action = {
            let snapshot = Arc::clone(&snapshot);
            move || refresh(Arc::clone(&snapshot)).boxed()
        };
        let debouncer = Debouncer::new(unique_id.clone(), cooldown, true, action);

        Self {
            unique_id,
            snapshot,
            debouncer,
        }
    }

    pub(crate) fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub(crate) async fn snapshot(&self) -> SensorSnapshot {
        self.snapshot.read().await.clone()
    }

    pub(crate) async fn request_refresh(&self) -> CallOutcome {
        self.debouncer.call().await
    }

    pub(crate) fn debounce_status(&self) -> DebounceStatus {
        self.debouncer.status()
    }

    pub(crate) fn shutdown(&self) {
        self.debouncer.shutdown();
    }
}

/// Replaces state and attributes after a successful refresh.
pub(crate) async fn publish(
    snapshot: &SharedSnapshot,
    value: SensorValue,
    attributes: Map<String, Value>,
) {
    let mut snapshot = snapshot.write().await;
    snapshot.state = Some(value);
    snapshot.attributes = attributes;
    snapshot.available = true;
    snapshot.last_updated = Some(Utc::now());
    snapshot.last_error = None;
}

/// Records a failed refresh. State and attributes are left as they were.
pub(crate) async fn record_failure(snapshot: &SharedSnapshot, error: &FetchError) {
    snapshot.write().await.last_error = Some(error.to_string());
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory API used by the sensor tests.

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use pocketbar_core::{Account, Transaction};
    use pocketbar_fetch::{FetchError, PocketSmithApi};

    /// Scripted response: `Ok` payload or an HTTP status to fail with.
    pub type Scripted<T> = Result<T, u16>;

    fn status_error(status: u16) -> FetchError {
        FetchError::Status {
            status,
            url: "fake".to_string(),
        }
    }

    #[derive(Default)]
    pub struct FakeApi {
        pub account: Mutex<Option<Scripted<Account>>>,
        pub transactions: Mutex<Option<Scripted<Vec<Transaction>>>>,
        pub account_calls: AtomicUsize,
        pub transaction_calls: AtomicUsize,
        pub latency: Mutex<Option<Duration>>,
    }

    impl FakeApi {
        pub fn set_account(&self, response: Scripted<Account>) {
            *self.account.lock().unwrap() = Some(response);
        }

        pub fn set_transactions(&self, response: Scripted<Vec<Transaction>>) {
            *self.transactions.lock().unwrap() = Some(response);
        }

        /// Makes every account and transaction call take `latency`.
        pub fn set_latency(&self, latency: Duration) {
            *self.latency.lock().unwrap() = Some(latency);
        }

        async fn respond(&self) {
            let latency = *self.latency.lock().unwrap();
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
        }

        pub fn account_calls(&self) -> usize {
            self.account_calls.load(Ordering::SeqCst)
        }

        pub fn transaction_calls(&self) -> usize {
            self.transaction_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PocketSmithApi for FakeApi {
        async fn user_id(&self) -> Result<i64, FetchError> {
            Ok(42)
        }

        async fn accounts(&self, _user_id: i64) -> Result<Vec<Account>, FetchError> {
            Ok(Vec::new())
        }

        async fn account(&self, _account_id: i64) -> Result<Account, FetchError> {
            self.account_calls.fetch_add(1, Ordering::SeqCst);
            self.respond().await;
            match self.account.lock().unwrap().clone() {
                Some(Ok(account)) => Ok(account),
                Some(Err(status)) => Err(status_error(status)),
                None => Err(status_error(404)),
            }
        }

        async fn transactions(&self, _user_id: i64) -> Result<Vec<Transaction>, FetchError> {
            self.transaction_calls.fetch_add(1, Ordering::SeqCst);
            self.respond().await;
            match self.transactions.lock().unwrap().clone() {
                Some(Ok(transactions)) => Ok(transactions),
                Some(Err(status)) => Err(status_error(status)),
                None => Err(status_error(404)),
            }
        }
    }
}
