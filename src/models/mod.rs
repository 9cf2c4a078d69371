//! Core data models for ynab-sensors
//!
//! This module contains the normalized, entity-facing records built from the
//! YNAB API: account and category snapshots, the monthly summary, the
//! complete budget snapshot and the poll status.

pub mod account;
pub mod category;
pub mod ids;
pub mod money;
pub mod snapshot;
pub mod status;
pub mod summary;

pub use account::{AccountSnapshot, AccountType};
pub use category::{AttentionReason, CategorySnapshot, GoalProgress, GoalType, HIDDEN_SUFFIX};
pub use ids::{AccountId, BudgetId, CategoryId};
pub use money::{currency_fraction_digits, currency_symbol, Milliunits};
pub use snapshot::Snapshot;
pub use status::{ConnectionStatus, PollError, PollStatus, RateLimitInfo, RefreshState};
pub use summary::MonthlySummary;
