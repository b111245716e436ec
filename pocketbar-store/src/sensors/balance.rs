//! Account balance sensor.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pocketbar_core::{
    normalize_title, Account, DeviceClass, SensorSnapshot, SensorValue, TransactionAccount,
};
use pocketbar_fetch::{FetchError, PocketSmithApi};
use serde_json::{Map, Value};
use tracing::{debug, error};

use super::{publish, record_failure, Sensor, SensorCore, SharedSnapshot};
use crate::debounce::{CallOutcome, DebounceStatus};

/// Minimum time between two account fetches.
pub const BALANCE_COOLDOWN: Duration = Duration::from_secs(60);

const ICON: &str = "mdi:currency-usd";

/// Balance of one `PocketSmith` account.
///
/// Identity, name and unit are taken from the account at discovery and do
/// not change afterwards.
pub struct AccountBalanceSensor {
    account_id: i64,
    core: SensorCore,
}

impl AccountBalanceSensor {
    /// Creates the sensor for a discovered account.
    pub fn new(api: Arc<dyn PocketSmithApi>, account: &Account) -> Self {
        let account_id = account.id;
        let initial = SensorSnapshot::new(
            Self::unique_id_for(account),
            format!("PocketSmith Account {} Balance", account.title()),
            account.unit(),
            DeviceClass::Monetary,
            ICON,
        );

        let core = SensorCore::new(initial, BALANCE_COOLDOWN, move |snapshot| {
            refresh(Arc::clone(&api), account_id, snapshot)
        });

        Self { account_id, core }
    }

    /// Builds `pocketsmith_{id}_{normalized title}_balance`.
    pub fn unique_id_for(account: &Account) -> String {
        format!(
            "pocketsmith_{}_{}_balance",
            account.id,
            normalize_title(account.title())
        )
    }

    /// Returns the account this sensor tracks.
    pub fn account_id(&self) -> i64 {
        self.account_id
    }
}

/// Fetches the account and publishes its balance and filtered sub-accounts.
async fn refresh(
    api: Arc<dyn PocketSmithApi>,
    account_id: i64,
    snapshot: SharedSnapshot,
) -> Result<(), FetchError> {
    let account = match api.account(account_id).await {
        Ok(account) => account,
        Err(e) => {
            error!(account_id, error = %e, "Failed to refresh account balance");
            record_failure(&snapshot, &e).await;
            return Err(e);
        }
    };

    let balance = account.balance();
    let sub_accounts: Vec<Value> = account
        .transaction_accounts()
        .iter()
        .map(TransactionAccount::to_attribute)
        .collect();
    debug!(account_id, %balance, sub_accounts = sub_accounts.len(), "Fetched account");

    let mut attributes = Map::new();
    attributes.insert("transaction_accounts".to_string(), Value::Array(sub_accounts));

    publish(&snapshot, SensorValue::Money(balance), attributes).await;
    Ok(())
}

#[async_trait]
impl Sensor for AccountBalanceSensor {
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

// ============================================================================
// Tests
// ============================================================================
