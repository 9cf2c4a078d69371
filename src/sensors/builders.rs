//! Builders turning snapshot records into sensor entities

use chrono::{DateTime, Local, Utc};
use std::collections::BTreeMap;

use super::icons::category_icon;
use super::{AttributeValue, EntityCategory, SensorEntity, SensorKind};
use crate::config::BudgetConfig;
use crate::models::{AccountSnapshot, CategorySnapshot, MonthlySummary, PollStatus, Snapshot};
use crate::storage::{AccountExtras, UserValues};

/// Format of timestamps shown in sensor states
pub const TIMESTAMP_FORMAT: &str = "%B %d, %Y - %I:%M %p";

/// Per-instance naming and presentation shared by all builders
struct Context<'a> {
    instance: String,
    unit: &'a str,
    available: bool,
}

impl<'a> Context<'a> {
    fn new(budget: &'a BudgetConfig, status: &PollStatus, unavailable_after: u32) -> Self {
        Self {
            instance: budget.sanitized_instance_name(),
            unit: budget.currency_symbol(),
            available: status.is_available(unavailable_after),
        }
    }
}

/// All entities for one budget instance
///
/// Without a snapshot only the diagnostic sensor exists.
pub fn build_entities(
    budget: &BudgetConfig,
    snapshot: Option<&Snapshot>,
    user_values: &UserValues,
    status: &PollStatus,
    unavailable_after: u32,
) -> Vec<SensorEntity> {
    let ctx = Context::new(budget, status, unavailable_after);
    let mut entities = Vec::new();

    if let Some(snapshot) = snapshot {
        entities.extend(
            snapshot
                .accounts
                .iter()
                .map(|a| account_entity(&ctx, a, user_values.get(&a.id))),
        );
        entities.extend(snapshot.categories.iter().map(|c| category_entity(&ctx, c)));
        entities.push(summary_entity(&ctx, &snapshot.summary));
    }
    entities.push(last_poll_sensor(budget, status));

    entities
}

pub fn account_sensor(
    budget: &BudgetConfig,
    account: &AccountSnapshot,
    extras: Option<&AccountExtras>,
    status: &PollStatus,
    unavailable_after: u32,
) -> SensorEntity {
    account_entity(
        &Context::new(budget, status, unavailable_after),
        account,
        extras,
    )
}

pub fn category_sensor(
    budget: &BudgetConfig,
    category: &CategorySnapshot,
    status: &PollStatus,
    unavailable_after: u32,
) -> SensorEntity {
    category_entity(&Context::new(budget, status, unavailable_after), category)
}

pub fn monthly_summary_sensor(
    budget: &BudgetConfig,
    summary: &MonthlySummary,
    status: &PollStatus,
    unavailable_after: u32,
) -> SensorEntity {
    summary_entity(&Context::new(budget, status, unavailable_after), summary)
}

fn account_entity(
    ctx: &Context<'_>,
    account: &AccountSnapshot,
    extras: Option<&AccountExtras>,
) -> SensorEntity {
    let mut attributes = BTreeMap::new();
    attributes.insert("balance".into(), account.balance.to_decimal().into());
    attributes.insert(
        "cleared_balance".into(),
        account.cleared_balance.to_decimal().into(),
    );
    attributes.insert(
        "uncleared_balance".into(),
        account.uncleared_balance.to_decimal().into(),
    );
    attributes.insert("on_budget".into(), account.on_budget.into());
    attributes.insert("type".into(), account.account_type.api_name().into());
    attributes.insert("closed".into(), account.closed.into());

    // Unset values show as null on the account types that take them
    if account.account_type.has_credit_limit() {
        attributes.insert(
            "credit_limit".into(),
            extras
                .and_then(|e| e.credit_limit)
                .map(|m| m.to_decimal())
                .into(),
        );
    }
    if account.account_type.has_repayment_terms() {
        attributes.insert("apr".into(), extras.and_then(|e| e.apr).into());
        attributes.insert("due_day".into(), extras.and_then(|e| e.due_day).into());
    }

    SensorEntity {
        unique_id: format!("ynab_{}_{}", ctx.instance, account.id),
        name: format!("{} YNAB {}", account.name, ctx.instance),
        kind: SensorKind::Account,
        state: account.cleared_balance.to_decimal().into(),
        unit: Some(ctx.unit.to_string()),
        icon: account.account_type.icon().to_string(),
        entity_category: None,
        available: ctx.available,
        attributes,
    }
}

fn category_entity(ctx: &Context<'_>, category: &CategorySnapshot) -> SensorEntity {
    let mut attributes = BTreeMap::new();
    attributes.insert("budgeted".into(), category.budgeted.to_decimal().into());
    attributes.insert("activity".into(), category.activity.to_decimal().into());
    attributes.insert("balance".into(), category.balance.to_decimal().into());
    attributes.insert(
        "category_group".into(),
        category.group_name.as_str().into(),
    );
    attributes.insert(
        "goal_type".into(),
        category.goal_type().map(|g| g.code().to_string()).into(),
    );
    attributes.insert(
        "goal_target".into(),
        category.goal_target().map(|m| m.to_decimal()).into(),
    );
    attributes.insert(
        "goal_percentage_complete".into(),
        category.goal_percentage_complete().into(),
    );
    attributes.insert(
        "goal_overall_left".into(),
        category.goal_overall_left().map(|m| m.to_decimal()).into(),
    );
    attributes.insert(
        "percentage_spent".into(),
        category.percentage_spent.into(),
    );
    attributes.insert(
        "needs_attention".into(),
        category.needs_attention().into(),
    );
    attributes.insert(
        "attention_reason".into(),
        category.attention_reason.to_string().into(),
    );
    attributes.insert("hidden".into(), category.hidden.into());

    SensorEntity {
        unique_id: format!("ynab_{}_{}", ctx.instance, category.id),
        name: format!("{} YNAB {}", category.name, ctx.instance),
        kind: SensorKind::Category,
        state: category.balance.to_decimal().into(),
        unit: Some(ctx.unit.to_string()),
        icon: category_icon(&category.name).to_string(),
        entity_category: None,
        available: ctx.available,
        attributes,
    }
}

fn summary_entity(ctx: &Context<'_>, summary: &MonthlySummary) -> SensorEntity {
    let mut attributes = BTreeMap::new();
    attributes.insert(
        "month".into(),
        summary.month.format("%Y-%m-%d").to_string().into(),
    );
    attributes.insert("budgeted".into(), summary.budgeted.to_decimal().into());
    attributes.insert("activity".into(), summary.activity.to_decimal().into());
    attributes.insert(
        "to_be_budgeted".into(),
        summary.to_be_budgeted.to_decimal().into(),
    );
    attributes.insert("age_of_money".into(), summary.age_of_money.into());
    attributes.insert(
        "unapproved_transactions".into(),
        summary.unapproved_transactions.into(),
    );
    attributes.insert(
        "uncleared_transactions".into(),
        summary.uncleared_transactions.into(),
    );
    attributes.insert(
        "overspent_categories".into(),
        summary.overspent_categories.into(),
    );
    attributes.insert(
        "needs_attention_count".into(),
        summary.needs_attention_count.into(),
    );

    SensorEntity {
        unique_id: format!("latest_month_summary_ynab_{}", ctx.instance),
        name: format!("Latest Month Summary YNAB {}", ctx.instance),
        kind: SensorKind::MonthlySummary,
        state: summary.activity.to_decimal().into(),
        unit: Some(ctx.unit.to_string()),
        icon: "mdi:calendar-month".to_string(),
        entity_category: None,
        available: ctx.available,
        attributes,
    }
}

/// Diagnostic sensor reporting the poller's own health; always available
pub fn last_poll_sensor(budget: &BudgetConfig, status: &PollStatus) -> SensorEntity {
    let instance = budget.sanitized_instance_name();
    let mut attributes = BTreeMap::new();

    attributes.insert("status".into(), status.connection.to_string().into());
    attributes.insert("refresh_state".into(), format!("{:?}", status.state).into());
    attributes.insert(
        "last_error".into(),
        status.last_error.as_ref().map(|e| e.message.clone()).into(),
    );
    attributes.insert(
        "last_error_kind".into(),
        status.last_error.as_ref().map(|e| e.kind.to_string()).into(),
    );
    attributes.insert(
        "last_error_time".into(),
        status.last_error.as_ref().map(|e| format_time(e.at)).into(),
    );
    attributes.insert(
        "consecutive_failures".into(),
        status.consecutive_failures.into(),
    );
    attributes.insert(
        "requests_this_hour".into(),
        status.rate_limit.requests_this_hour.into(),
    );
    attributes.insert(
        "estimated_remaining".into(),
        status.rate_limit.estimated_remaining.into(),
    );
    attributes.insert(
        "rate_limit_resets_at".into(),
        status.rate_limit.resets_at.map(format_time).into(),
    );

    SensorEntity {
        unique_id: format!("last_successful_poll_ynab_{}", instance),
        name: format!("Last Successful Poll YNAB {}", instance),
        kind: SensorKind::LastSuccessfulPoll,
        state: status
            .last_success
            .map_or_else(|| "Never".to_string(), format_time)
            .into(),
        unit: None,
        icon: "mdi:clock-check-outline".to_string(),
        entity_category: Some(EntityCategory::Diagnostic),
        available: true,
        attributes,
    }
}

fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
}
