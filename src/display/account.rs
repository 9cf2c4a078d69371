//! Account display formatting
//!
//! Formats account snapshots for terminal output.

use crate::models::{AccountSnapshot, Milliunits};

/// Format accounts with balances as a table
pub fn format_account_list(accounts: &[AccountSnapshot], symbol: &str, digits: u32) -> String {
    if accounts.is_empty() {
        return "No accounts found.".to_string();
    }

    let name_width = accounts
        .iter()
        .map(|a| a.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4);

    let type_width = accounts
        .iter()
        .map(|a| a.account_type.to_string().len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<name_width$}  {:<type_width$}  {:>14}  {:>14}  {}\n",
        "Name",
        "Type",
        "Balance",
        "Cleared",
        "Status",
        name_width = name_width,
        type_width = type_width,
    ));
    output.push_str(&separator(name_width, type_width));

    for account in accounts {
        let status = if account.closed {
            "Closed".to_string()
        } else if !account.on_budget {
            "Tracking".to_string()
        } else if !account.uncleared_balance.is_zero() {
            format!(
                "{} uncleared",
                account.uncleared_balance.format_with(symbol, digits)
            )
        } else {
            String::new()
        };

        output.push_str(&format!(
            "{:<name_width$}  {:<type_width$}  {:>14}  {:>14}  {}\n",
            account.name,
            account.account_type,
            account.balance.format_with(symbol, digits),
            account.cleared_balance.format_with(symbol, digits),
            status,
            name_width = name_width,
            type_width = type_width,
        ));
    }

    let total: Milliunits = accounts.iter().map(|a| a.balance).sum();
    let cleared: Milliunits = accounts.iter().map(|a| a.cleared_balance).sum();

    output.push_str(&separator(name_width, type_width));
    output.push_str(&format!(
        "{:<name_width$}  {:<type_width$}  {:>14}  {:>14}\n",
        "TOTAL",
        "",
        total.format_with(symbol, digits),
        cleared.format_with(symbol, digits),
        name_width = name_width,
        type_width = type_width,
    ));

    output
}

fn separator(name_width: usize, type_width: usize) -> String {
    format!(
        "{:-<name_width$}  {:-<type_width$}  {:->14}  {:->14}  {:-<10}\n",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
        type_width = type_width,
    )
}
