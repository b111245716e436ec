// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `PocketBar` Store
//!
//! Sensors and their refresh coordination.
//!
//! This crate provides:
//!
//! - **Debouncer**: single-flight, cooldown-gated refresh per sensor
//! - **Sensors**: account balances and the uncategorised transaction count
//! - **SensorRegistry**: every live sensor, with change notifications
//! - **Coordinator**: one-time discovery and shutdown
//! - **Config**: settings file handling
//!
//! ## Usage
//!
//! ```ignore
//! use pocketbar_store::{Config, Coordinator};
//! use pocketbar_fetch::SystemKeychain;
//!
//! let config = Config::load()?;
//! let chain = config.credential_chain(None, Arc::new(SystemKeychain::new()));
//! let coordinator = Coordinator::setup(&config, &chain).await?;
//!
//! // Host trigger
//! coordinator.refresh_all().await?;
//! for snapshot in coordinator.snapshots().await {
//!     println!("{} = {}", snapshot.name, snapshot.state_text());
//! }
//! ```

pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod error;
pub mod registry;
pub mod sensors;

pub use config::{Config, GeneralConfig, PocketSmithConfig};
pub use coordinator::Coordinator;
pub use debounce::{
    CallOutcome, DebouncePhase, DebounceStatus, Debouncer, RefreshAction, RefreshFuture,
};
pub use error::StoreError;
pub use registry::{RefreshReport, SensorRegistry};
pub use sensors::{
    AccountBalanceSensor, Sensor, UncategorisedSensor, BALANCE_COOLDOWN, UNCATEGORISED_COOLDOWN,
};
