//! Category display formatting
//!
//! Formats category snapshots grouped by category group.

use crate::models::{AttentionReason, CategorySnapshot};

/// Format categories as a table grouped by their category group
pub fn format_category_table(categories: &[CategorySnapshot], symbol: &str, digits: u32) -> String {
    if categories.is_empty() {
        return "No categories found.".to_string();
    }

    let name_width = categories
        .iter()
        .map(|c| c.name.chars().count() + 2)
        .chain(categories.iter().map(|c| c.group_name.chars().count()))
        .max()
        .unwrap_or(8)
        .max(8);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:>12}  {:>12}  {:>12}  {:>7}  {:>7}  {}\n",
        "Category",
        "Budgeted",
        "Activity",
        "Balance",
        "Spent%",
        "Goal%",
        "Attention",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:->12}  {:->12}  {:->12}  {:->7}  {:->7}  {:-<11}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    let mut current_group: Option<&str> = None;
    for category in categories {
        if current_group != Some(category.group_name.as_str()) {
            output.push_str(&format!("{}\n", category.group_name));
            current_group = Some(category.group_name.as_str());
        }

        let goal = category
            .goal_percentage_complete()
            .map_or_else(|| "-".to_string(), |p| format!("{}%", p.round_dp(0)));
        let attention = match category.attention_reason {
            AttentionReason::Ok => String::new(),
            reason => format!("! {}", reason),
        };

        output.push_str(&format!(
            "  {:<width$}  {:>12}  {:>12}  {:>12}  {:>7}  {:>7}  {}\n",
            category.name,
            category.budgeted.format_with(symbol, digits),
            category.activity.format_with(symbol, digits),
            category.balance.format_with(symbol, digits),
            format!("{}%", category.percentage_spent.round_dp(0)),
            goal,
            attention,
            width = name_width - 2,
        ));
    }

    output
}

/// One line per category flagged for attention
pub fn format_attention_list<'a>(
    categories: impl IntoIterator<Item = &'a CategorySnapshot>,
    symbol: &str,
    digits: u32,
) -> String {
    let mut output = String::new();
    for category in categories {
        output.push_str(&format!(
            "  ! {} ({}): {}\n",
            category.name,
            category.attention_reason,
            category.balance.format_with(symbol, digits),
        ));
    }

    if output.is_empty() {
        "No categories need attention.\n".to_string()
    } else {
        format!("Needs attention:\n{}", output)
    }
}
