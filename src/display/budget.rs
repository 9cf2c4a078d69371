//! Budget display formatting

use crate::api::RawBudgetSummary;
use crate::config::BudgetConfig;

/// Format configured budget instances
pub fn format_budget_list(budgets: &[BudgetConfig]) -> String {
    if budgets.is_empty() {
        return "No budgets configured.".to_string();
    }

    let name_width = budgets
        .iter()
        .map(|b| b.instance_name.chars().count())
        .max()
        .unwrap_or(8)
        .max(8);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<24}  {:<8}  {:>8}\n",
        "Instance",
        "Budget",
        "Currency",
        "Interval",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:-<24}  {:-<8}  {:->8}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for budget in budgets {
        output.push_str(&format!(
            "{:<name_width$}  {:<24}  {:<8}  {:>6}m\n",
            budget.instance_name,
            truncate(&budget.budget_name, 24),
            budget.currency,
            budget.options.update_interval().as_secs() / 60,
            name_width = name_width,
        ));
    }

    output
}

/// Format budgets visible to an access token
pub fn format_available_budgets(budgets: &[RawBudgetSummary]) -> String {
    if budgets.is_empty() {
        return "No budgets available for this token.".to_string();
    }

    let mut output = String::new();
    for (i, budget) in budgets.iter().enumerate() {
        output.push_str(&format!(
            "{:>3}. {} ({}) [{}]\n",
            i + 1,
            budget.name,
            budget.iso_code().unwrap_or("?"),
            budget.id.short(),
        ));
    }
    output
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
