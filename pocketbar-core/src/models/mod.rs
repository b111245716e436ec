//! Domain models for `PocketBar`.
//!
//! ## Submodules
//!
//! - [`remote`] - Shapes returned by the `PocketSmith` API
//! - [`sensor`] - The published sensor record

mod remote;
mod sensor;

pub use remote::{normalize_title, Account, Transaction, TransactionAccount, User};
pub use sensor::{DeviceClass, SensorSnapshot, SensorValue};

#[cfg(test)]
mod serde_tests;
