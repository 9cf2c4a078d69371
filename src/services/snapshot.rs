//! Budget snapshot builder
//!
//! Turns the raw records of one refresh into the normalized [`Snapshot`]
//! published to sensors. Everything here is pure: no I/O and no clock, the
//! reference date is passed in.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashSet;

use crate::api::{RawAccount, RawBudgetData, RawCategory, RawCategoryGroup, RawTransaction};
use crate::config::{AttentionPolicy, BudgetConfig, UnderfundedRule};
use crate::models::{
    AccountId, AccountSnapshot, AccountType, AttentionReason, CategorySnapshot, GoalProgress,
    GoalType, Milliunits, MonthlySummary, Snapshot, HIDDEN_SUFFIX,
};

/// YNAB's built-in group holding "Inflow: Ready to Assign" and friends
pub const INTERNAL_GROUP: &str = "Internal Master Category";

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Build the snapshot for one budget from a completed fetch
pub fn build_snapshot(
    raw: RawBudgetData,
    budget: &BudgetConfig,
    policy: &AttentionPolicy,
    fetched_at: DateTime<Utc>,
    today: NaiveDate,
) -> Snapshot {
    let month = raw.month.month;
    let month_open = today < next_month_start(month);

    let accounts = build_accounts(&raw.accounts, budget);
    let categories = build_categories(&raw.category_groups, budget, policy, month_open);

    let open_accounts: HashSet<&AccountId> = accounts
        .iter()
        .filter(|a| !a.closed)
        .map(|a| &a.id)
        .collect();

    let unapproved = count_unapproved(&raw.transactions);
    let uncleared = count_uncleared(&raw.transactions, &open_accounts);
    let overspent = count_overspent(&raw.month.categories);

    let summary = MonthlySummary {
        month,
        budgeted: raw.month.budgeted,
        activity: raw.month.activity,
        to_be_budgeted: raw.month.to_be_budgeted,
        age_of_money: raw.month.age_of_money,
        unapproved_transactions: unapproved,
        uncleared_transactions: uncleared,
        overspent_categories: overspent,
        needs_attention_count: MonthlySummary::attention_count(unapproved, uncleared, overspent),
    };

    Snapshot {
        budget_id: budget.budget_id.clone(),
        instance_name: budget.instance_name.clone(),
        currency: budget.currency.clone(),
        month,
        fetched_at,
        accounts,
        categories,
        summary,
    }
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month after the one containing `date`
pub fn next_month_start(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
}

fn build_accounts(raw: &[RawAccount], budget: &BudgetConfig) -> Vec<AccountSnapshot> {
    raw.iter()
        .filter(|a| !a.deleted)
        .filter(|a| budget.options.include_closed_accounts || !a.closed)
        .filter(|a| budget.selected_accounts.contains(&a.id))
        .map(|a| AccountSnapshot {
            id: a.id.clone(),
            name: a.name.clone(),
            balance: a.balance,
            cleared_balance: a.cleared_balance,
            uncleared_balance: a.uncleared_balance,
            on_budget: a.on_budget,
            account_type: AccountType::parse(&a.account_type),
            closed: a.closed,
        })
        .collect()
}

fn build_categories(
    groups: &[RawCategoryGroup],
    budget: &BudgetConfig,
    policy: &AttentionPolicy,
    month_open: bool,
) -> Vec<CategorySnapshot> {
    let include_hidden = budget.options.include_hidden_categories;
    let mut categories = Vec::new();

    for group in groups {
        if group.deleted || group.name == INTERNAL_GROUP {
            continue;
        }
        for raw in &group.categories {
            if raw.deleted {
                continue;
            }
            let hidden = raw.hidden || group.hidden;
            if hidden && !include_hidden {
                continue;
            }
            if !budget.selected_categories.contains(&raw.id) {
                continue;
            }
            categories.push(build_category(raw, &group.name, hidden, policy, month_open));
        }
    }

    categories
}

/// Normalize one category and derive its computed fields
pub fn build_category(
    raw: &RawCategory,
    group_name: &str,
    hidden: bool,
    policy: &AttentionPolicy,
    month_open: bool,
) -> CategorySnapshot {
    let balance = raw.budgeted + raw.activity;
    let goal = goal_progress(raw, balance);
    let attention_reason = attention_reason(balance, goal.as_ref(), policy, month_open);

    let name = if hidden {
        format!("{}{}", raw.name, HIDDEN_SUFFIX)
    } else {
        raw.name.clone()
    };

    CategorySnapshot {
        id: raw.id.clone(),
        name,
        group_name: raw
            .category_group_name
            .clone()
            .unwrap_or_else(|| group_name.to_string()),
        budgeted: raw.budgeted,
        activity: raw.activity,
        balance,
        goal,
        percentage_spent: percentage_spent(raw.budgeted, raw.activity),
        attention_reason,
        hidden,
    }
}

/// Share of `budgeted` consumed by spending, 0-100, two decimals
pub fn percentage_spent(budgeted: Milliunits, activity: Milliunits) -> Decimal {
    if !budgeted.is_positive() {
        return Decimal::ZERO;
    }
    let spent = Decimal::from(-activity.raw());
    let share = spent * HUNDRED / Decimal::from(budgeted.raw());
    clamp_percent(share).round_dp(2)
}

fn goal_progress(raw: &RawCategory, balance: Milliunits) -> Option<GoalProgress> {
    let goal_type = GoalType::parse(raw.goal_type.as_deref()?);
    let target = raw.goal_target.unwrap_or_default();

    let percentage_complete = match raw.goal_percentage_complete {
        Some(reported) => clamp_percent(Decimal::from(reported)),
        None if target.is_positive() => {
            let share = Decimal::from(balance.raw()) * HUNDRED / Decimal::from(target.raw());
            clamp_percent(share).round_dp(2)
        }
        None => Decimal::ZERO,
    };

    let overall_left = raw
        .goal_overall_left
        .unwrap_or_else(|| (target - balance).max(Milliunits::zero()));

    Some(GoalProgress {
        goal_type,
        target,
        percentage_complete,
        overall_left,
    })
}

/// Decide whether a category needs attention and why
pub fn attention_reason(
    balance: Milliunits,
    goal: Option<&GoalProgress>,
    policy: &AttentionPolicy,
    month_open: bool,
) -> AttentionReason {
    let overspent = balance.is_negative();
    let underfunded = month_open
        && goal.is_some_and(|g| match policy.underfunded_rule {
            UnderfundedRule::BalanceBelowTarget => g.target.is_positive() && balance < g.target,
            UnderfundedRule::GoalOverallLeft => {
                g.target.is_positive() && g.overall_left.is_positive()
            }
        });

    match (overspent, underfunded) {
        (true, true) if policy.underfunded_first => AttentionReason::Underfunded,
        (true, _) => AttentionReason::Overspent,
        (false, true) => AttentionReason::Underfunded,
        (false, false) => AttentionReason::Ok,
    }
}

fn clamp_percent(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, HUNDRED)
}

fn count_unapproved(transactions: &[RawTransaction]) -> u32 {
    count(transactions.iter().filter(|t| !t.deleted && !t.approved))
}

fn count_uncleared(transactions: &[RawTransaction], open_accounts: &HashSet<&AccountId>) -> u32 {
    count(transactions.iter().filter(|t| {
        !t.deleted
            && t.is_uncleared()
            && t.scheduled_transaction_id.is_none()
            && open_accounts.contains(&t.account_id)
    }))
}

fn count_overspent(month_categories: &[RawCategory]) -> u32 {
    count(
        month_categories
            .iter()
            .filter(|c| !c.deleted && c.balance.is_negative()),
    )
}

fn count<I: Iterator>(iter: I) -> u32 {
    u32::try_from(iter.count()).unwrap_or(u32::MAX)
}
