//! Storage layer for ynab-sensors
//!
//! Persists the last good snapshot and poll status per budget instance, and
//! the per-account values users enter, as JSON written atomically.

pub mod file_io;
pub mod snapshots;
pub mod user_values;

pub use snapshots::{PersistedState, SnapshotStore};
pub use user_values::{AccountExtras, UserValues, UserValuesStore};
