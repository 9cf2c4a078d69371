//! Service layer for ynab-sensors
//!
//! The snapshot builder derives the published records from raw API data,
//! the coordinator runs and publishes refreshes for one budget, and the
//! scheduler drives the coordinator on an interval.

pub mod coordinator;
pub mod scheduler;
pub mod snapshot;

pub use coordinator::{BudgetCoordinator, RefreshOutcome, DEFAULT_REFRESH_TIMEOUT};
pub use scheduler::{first_refresh, run_budget, run_budget_from};
pub use snapshot::build_snapshot;
