//! Raw YNAB API records
//!
//! These mirror the JSON the API returns. Required fields are plain, optional
//! ones are `Option`, and missing amounts default to zero so a sparse record
//! degrades instead of failing the whole refresh.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::models::{AccountId, BudgetId, CategoryId, Milliunits};

/// `{ "data": ... }` wrapper around every successful response
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// `{ "error": { ... } }` body of a failed response
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub detail: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BudgetsData {
    pub budgets: Vec<RawBudgetSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountsData {
    pub accounts: Vec<RawAccount>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoriesData {
    pub category_groups: Vec<RawCategoryGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonthData {
    pub month: RawMonth,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionsData {
    pub transactions: Vec<RawTransaction>,
}

/// Budget as listed by `GET /budgets`
#[derive(Debug, Clone, Deserialize)]
pub struct RawBudgetSummary {
    pub id: BudgetId,
    pub name: String,
    #[serde(default)]
    pub last_modified_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub currency_format: Option<RawCurrencyFormat>,
}

impl RawBudgetSummary {
    /// ISO code of the budget's currency, if YNAB reported one
    pub fn iso_code(&self) -> Option<&str> {
        self.currency_format.as_ref().map(|c| c.iso_code.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCurrencyFormat {
    pub iso_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAccount {
    pub id: AccountId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub account_type: String,
    #[serde(default)]
    pub on_budget: bool,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub balance: Milliunits,
    #[serde(default)]
    pub cleared_balance: Milliunits,
    #[serde(default)]
    pub uncleared_balance: Milliunits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCategoryGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub categories: Vec<RawCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCategory {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub category_group_name: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub budgeted: Milliunits,
    #[serde(default)]
    pub activity: Milliunits,
    #[serde(default)]
    pub balance: Milliunits,
    #[serde(default)]
    pub goal_type: Option<String>,
    #[serde(default)]
    pub goal_target: Option<Milliunits>,
    #[serde(default)]
    pub goal_percentage_complete: Option<i64>,
    #[serde(default)]
    pub goal_overall_left: Option<Milliunits>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMonth {
    pub month: NaiveDate,
    #[serde(default)]
    pub income: Milliunits,
    #[serde(default)]
    pub budgeted: Milliunits,
    #[serde(default)]
    pub activity: Milliunits,
    #[serde(default)]
    pub to_be_budgeted: Milliunits,
    #[serde(default)]
    pub age_of_money: Option<i64>,
    #[serde(default)]
    pub categories: Vec<RawCategory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
    pub id: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub amount: Milliunits,
    /// `cleared`, `uncleared` or `reconciled`
    #[serde(default)]
    pub cleared: String,
    /// Missing means approved
    #[serde(default = "default_approved")]
    pub approved: bool,
    pub account_id: AccountId,
    #[serde(default)]
    pub scheduled_transaction_id: Option<String>,
    #[serde(default)]
    pub deleted: bool,
}

fn default_approved() -> bool {
    true
}

impl RawTransaction {
    pub fn is_uncleared(&self) -> bool {
        self.cleared == "uncleared"
    }
}

/// Everything one refresh fetches for a budget
#[derive(Debug, Clone)]
pub struct RawBudgetData {
    pub accounts: Vec<RawAccount>,
    pub category_groups: Vec<RawCategoryGroup>,
    pub month: RawMonth,
    pub transactions: Vec<RawTransaction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_missing_amounts_default_to_zero() {
        let raw: RawCategory = serde_json::from_value(json!({
            "id": "c1",
            "name": "Groceries"
        }))
        .unwrap();

        assert_eq!(raw.budgeted, Milliunits::zero());
        assert!(raw.goal_type.is_none());
        assert!(!raw.hidden);
    }

    #[test]
    fn test_transaction_defaults() {
        let raw: RawTransaction = serde_json::from_value(json!({
            "id": "t1",
            "account_id": "a1",
            "cleared": "uncleared"
        }))
        .unwrap();

        assert!(raw.approved);
        assert!(raw.is_uncleared());
        assert!(raw.scheduled_transaction_id.is_none());
    }

    #[test]
    fn test_account_type_field_rename() {
        let raw: RawAccount = serde_json::from_value(json!({
            "id": "a1",
            "name": "Checking",
            "type": "checking",
            "balance": 125000,
            "cleared_balance": 100000,
            "uncleared_balance": 25000
        }))
        .unwrap();

        assert_eq!(raw.account_type, "checking");
        assert_eq!(raw.balance.raw(), 125_000);
    }
}
