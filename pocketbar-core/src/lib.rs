// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `PocketBar` Core
//!
//! Core types and models for the `PocketBar` sensors.
//!
//! This crate has no I/O. It provides:
//!
//! - Remote models decoded from the `PocketSmith` API
//! - The published sensor record handed to the registry
//!
//! ## Key Types
//!
//! ### Remote Types
//! - [`User`] - The authenticated user (`GET /me`)
//! - [`Account`] - A financial account with its balance
//! - [`TransactionAccount`] - The filtered sub-account view that gets published
//! - [`Transaction`] - A transaction, only inspected for its category
//!
//! ### Sensor Types
//! - [`SensorSnapshot`] - Everything the host displays for one sensor
//! - [`SensorValue`] - Numeric state (money or count)
//! - [`DeviceClass`] - How the host should treat the value

pub mod models;

pub use models::{
    // Remote types
    Account,
    Transaction,
    TransactionAccount,
    User,
    // Sensor types
    DeviceClass,
    SensorSnapshot,
    SensorValue,
    // Helpers
    normalize_title,
};
