//! ynab-sensors - YNAB budget data as sensor entities
//!
//! This library polls the YNAB API for one or more configured budgets and
//! publishes a snapshot of each (accounts, categories and a monthly
//! summary) as a set of sensor entities.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `api`: YNAB HTTP client, wire types and request accounting
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Snapshot records, money and poll status
//! - `services`: Snapshot building, refresh coordination and scheduling
//! - `sensors`: Sensor entities built from a snapshot
//! - `storage`: Persisted snapshots
//! - `setup`: Interactive setup wizard
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use ynab_sensors::config::{SensorPaths, Settings};
//!
//! let paths = SensorPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod sensors;
pub mod services;
pub mod setup;
pub mod storage;

pub use error::{YnabError, YnabResult};
