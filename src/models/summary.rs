//! Monthly summary model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::money::Milliunits;

/// Budget-wide figures for the current month plus the attention counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    /// First day of the summarized month
    pub month: NaiveDate,

    pub budgeted: Milliunits,

    pub activity: Milliunits,

    pub to_be_budgeted: Milliunits,

    /// Days; `None` until YNAB has enough history to compute it
    pub age_of_money: Option<i64>,

    pub unapproved_transactions: u32,

    pub uncleared_transactions: u32,

    pub overspent_categories: u32,

    /// How many of the three counters above are non-zero (0-3)
    pub needs_attention_count: u8,
}

impl MonthlySummary {
    /// Number of non-zero counters among unapproved, uncleared and overspent
    pub fn attention_count(unapproved: u32, uncleared: u32, overspent: u32) -> u8 {
        [unapproved, uncleared, overspent]
            .iter()
            .filter(|count| **count > 0)
            .count() as u8
    }
}
