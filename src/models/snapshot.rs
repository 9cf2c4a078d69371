//! Budget snapshot
//!
//! The complete, entity-facing view of one budget at one point in time.
//! A snapshot is immutable once built; consumers receive it behind an `Arc`
//! and a new refresh replaces it wholesale.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::account::AccountSnapshot;
use super::category::CategorySnapshot;
use super::ids::{AccountId, BudgetId, CategoryId};
use super::summary::MonthlySummary;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub budget_id: BudgetId,

    pub instance_name: String,

    /// ISO currency code used for display
    pub currency: String,

    /// First day of the month the figures belong to
    pub month: NaiveDate,

    pub fetched_at: DateTime<Utc>,

    pub accounts: Vec<AccountSnapshot>,

    pub categories: Vec<CategorySnapshot>,

    pub summary: MonthlySummary,
}

impl Snapshot {
    pub fn account(&self, id: &AccountId) -> Option<&AccountSnapshot> {
        self.accounts.iter().find(|a| &a.id == id)
    }

    pub fn category(&self, id: &CategoryId) -> Option<&CategorySnapshot> {
        self.categories.iter().find(|c| &c.id == id)
    }

    /// Categories currently flagged as overspent or underfunded
    pub fn categories_needing_attention(&self) -> impl Iterator<Item = &CategorySnapshot> {
        self.categories.iter().filter(|c| c.needs_attention())
    }
}
