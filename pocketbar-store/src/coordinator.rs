//! Startup wiring.
//!
//! The [`Coordinator`] resolves the developer key, discovers the user and
//! accounts once, and registers one sensor per account plus the
//! uncategorised transaction sensor. Accounts added or removed remotely are
//! only picked up by a new setup.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use pocketbar_core::SensorSnapshot;
use pocketbar_fetch::{CredentialSource, FetchContext, PocketSmithApi};
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::config::Config;
use crate::error::StoreError;
use crate::registry::{RefreshReport, SensorRegistry};
use crate::sensors::{AccountBalanceSensor, Sensor, UncategorisedSensor};

/// Owns the shared API handle and the registered sensors.
pub struct Coordinator {
    api: RwLock<Option<Arc<dyn PocketSmithApi>>>,
    user_id: i64,
    registry: Arc<SensorRegistry>,
    shut_down: AtomicBool,
}

impl Coordinator {
    /// Full setup against the live API.
    ///
    /// Failures are logged once here and returned; nothing is registered.
    pub async fn setup(
        config: &Config,
        credentials: &dyn CredentialSource,
    ) -> Result<Self, StoreError> {
        let result = Self::try_setup(config, credentials).await;
        if let Err(e) = &result {
            error!(error = %e, "Error setting up PocketSmith sensors");
        }
        result
    }

    async fn try_setup(
        config: &Config,
        credentials: &dyn CredentialSource,
    ) -> Result<Self, StoreError> {
        let credential = credentials
            .resolve()
            .await
            .map_err(StoreError::Credential)?
            .ok_or(StoreError::NoCredential)?;

        let ctx = FetchContext::builder(credential)
            .base_url(config.api_base_url())
            .build()
            .map_err(|e| StoreError::Config(e.to_string()))?;

        Self::discover(Arc::new(ctx)).await
    }

    /// Discovers the user and accounts through `api` and builds the sensors.
    pub async fn discover(api: Arc<dyn PocketSmithApi>) -> Result<Self, StoreError> {
        info!("Discovering PocketSmith accounts");

        let user_id = api.user_id().await?;
        let accounts = api.accounts(user_id).await?;

        let mut sensors: Vec<Arc<dyn Sensor>> = accounts
            .iter()
            .map(|account| {
                Arc::new(AccountBalanceSensor::new(Arc::clone(&api), account)) as Arc<dyn Sensor>
            })
            .collect();
        sensors.push(Arc::new(UncategorisedSensor::new(Arc::clone(&api), user_id)));

        let registry = Arc::new(SensorRegistry::new());
        let registered = registry.register_all(sensors).await;
        info!(
            user_id,
            accounts = accounts.len(),
            sensors = registered,
            "PocketSmith setup complete"
        );

        Ok(Self {
            api: RwLock::new(Some(api)),
            user_id,
            registry,
            shut_down: AtomicBool::new(false),
        })
    }

    /// Returns the discovered user ID.
    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    /// Returns the shared API handle, or `None` after shutdown.
    pub async fn api(&self) -> Option<Arc<dyn PocketSmithApi>> {
        self.api.read().await.clone()
    }

    /// Returns the registry.
    pub fn registry(&self) -> &Arc<SensorRegistry> {
        &self.registry
    }

    /// Requests a refresh on every sensor. This is the host's periodic or
    /// on-demand trigger.
    pub async fn refresh_all(&self) -> Result<Vec<RefreshReport>, StoreError> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Err(StoreError::ShutDown);
        }
        Ok(self.registry.refresh_all().await)
    }

    /// Returns every sensor's published view.
    pub async fn snapshots(&self) -> Vec<SensorSnapshot> {
        self.registry.snapshots().await
    }

    /// Cancels queued refreshes, abandons running ones, removes all sensors
    /// and releases the API session.
    pub async fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        self.registry.clear().await;
        self.api.write().await.take();
        info!(user_id = self.user_id, "PocketSmith sensors shut down");
    }

    /// Returns true once [`Coordinator::shutdown`] has run.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }
}
