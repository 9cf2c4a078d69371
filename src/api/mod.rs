//! YNAB API access
//!
//! [`BudgetSource`] is the seam between the poller and the network: the
//! coordinator only talks to the trait, [`YnabClient`] implements it over
//! HTTP, and tests substitute an in-memory fake.

pub mod client;
pub mod rate;
pub mod types;

use async_trait::async_trait;
use chrono::NaiveDate;

pub use client::{YnabClient, YNAB_API_URL};
pub use rate::{QuotaRegistry, RequestTracker, TokenQuota, HOURLY_REQUEST_LIMIT};
pub use types::{
    RawAccount, RawBudgetData, RawBudgetSummary, RawCategory, RawCategoryGroup, RawMonth,
    RawTransaction,
};

use crate::error::YnabResult;
use crate::models::{BudgetId, RateLimitInfo};

/// Read access to YNAB budget data
#[async_trait]
pub trait BudgetSource: Send + Sync {
    /// Budgets visible to the access token
    async fn list_budgets(&self) -> YnabResult<Vec<RawBudgetSummary>>;

    async fn accounts(&self, budget: &BudgetId) -> YnabResult<Vec<RawAccount>>;

    async fn categories(&self, budget: &BudgetId) -> YnabResult<Vec<RawCategoryGroup>>;

    /// Month record for the month starting on `month`
    async fn month(&self, budget: &BudgetId, month: NaiveDate) -> YnabResult<RawMonth>;

    async fn transactions(&self, budget: &BudgetId) -> YnabResult<Vec<RawTransaction>>;

    /// Request usage against the hourly budget
    fn rate_limit(&self) -> RateLimitInfo {
        RateLimitInfo::default()
    }
}
