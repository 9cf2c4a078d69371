//! Summary, poll status and sensor display formatting

use crate::models::{MonthlySummary, PollStatus};
use crate::sensors::SensorEntity;

/// Format the monthly summary block
pub fn format_summary(summary: &MonthlySummary, symbol: &str, digits: u32) -> String {
    let mut output = String::new();

    output.push_str(&format!("Month: {}\n", summary.month.format("%B %Y")));
    output.push_str(&format!(
        "  Budgeted:        {}\n",
        summary.budgeted.format_with(symbol, digits)
    ));
    output.push_str(&format!(
        "  Activity:        {}\n",
        summary.activity.format_with(symbol, digits)
    ));
    output.push_str(&format!(
        "  To Be Budgeted:  {}\n",
        summary.to_be_budgeted.format_with(symbol, digits)
    ));
    output.push_str(&format!(
        "  Age of Money:    {}\n",
        summary
            .age_of_money
            .map_or_else(|| "-".to_string(), |days| format!("{} days", days))
    ));
    output.push('\n');
    output.push_str(&format!(
        "  Unapproved:      {}\n",
        summary.unapproved_transactions
    ));
    output.push_str(&format!(
        "  Uncleared:       {}\n",
        summary.uncleared_transactions
    ));
    output.push_str(&format!(
        "  Overspent:       {}\n",
        summary.overspent_categories
    ));
    output.push_str(&format!(
        "  Needs Attention: {}/3\n",
        summary.needs_attention_count
    ));

    output
}

/// Format the poll status block
pub fn format_status(status: &PollStatus) -> String {
    let mut output = String::new();

    output.push_str(&format!("Status: {}\n", status.connection));
    output.push_str(&format!(
        "  Last Success:         {}\n",
        status
            .last_success
            .map_or_else(|| "Never".to_string(), |t| t.format("%Y-%m-%d %H:%M UTC").to_string())
    ));
    output.push_str(&format!(
        "  Consecutive Failures: {}\n",
        status.consecutive_failures
    ));
    if let Some(err) = &status.last_error {
        output.push_str(&format!(
            "  Last Error:           [{}] {} ({})\n",
            err.kind,
            err.message,
            err.at.format("%Y-%m-%d %H:%M UTC")
        ));
    }
    output.push_str(&format!(
        "  Requests This Hour:   {} ({} remaining)\n",
        status.rate_limit.requests_this_hour, status.rate_limit.estimated_remaining
    ));

    output
}

/// Format sensors as `name = state unit` lines
pub fn format_sensor_list(entities: &[SensorEntity]) -> String {
    if entities.is_empty() {
        return "No sensors.".to_string();
    }

    let name_width = entities
        .iter()
        .map(|e| e.name.chars().count())
        .max()
        .unwrap_or(4);

    let mut output = String::new();
    for entity in entities {
        let state = if entity.available {
            match &entity.unit {
                Some(unit) => format!("{} {}", entity.state, unit),
                None => entity.state.to_string(),
            }
        } else {
            "unavailable".to_string()
        };
        output.push_str(&format!(
            "{:<name_width$}  {}\n",
            entity.name,
            state,
            name_width = name_width,
        ));
    }
    output
}
