//! Refresh options step

use crate::config::settings::{
    BudgetOptions, DEFAULT_UPDATE_INTERVAL_MINUTES, MAX_UPDATE_INTERVAL_MINUTES,
    MIN_UPDATE_INTERVAL_MINUTES,
};
use crate::error::{YnabError, YnabResult};
use crate::setup::prompt::{prompt_string, prompt_yes_no};

/// Options setup step
pub struct OptionsSetupStep;

impl OptionsSetupStep {
    /// Run the options step
    pub fn run() -> YnabResult<BudgetOptions> {
        println!();
        println!("Step 3: Options");
        println!("===============");
        println!();

        let interval = prompt_string(&format!(
            "Update interval in minutes ({}-{}) [{}]: ",
            MIN_UPDATE_INTERVAL_MINUTES, MAX_UPDATE_INTERVAL_MINUTES, DEFAULT_UPDATE_INTERVAL_MINUTES
        ))?;
        let update_interval_minutes = parse_interval(&interval)?;

        let include_closed_accounts = prompt_yes_no("Include closed accounts? (yes/no) [no]: ", false)?;
        let include_hidden_categories =
            prompt_yes_no("Include hidden categories? (yes/no) [no]: ", false)?;

        Ok(BudgetOptions {
            update_interval_minutes,
            include_closed_accounts,
            include_hidden_categories,
        })
    }
}

/// Parse an interval answer; empty means the default
pub fn parse_interval(input: &str) -> YnabResult<u32> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(DEFAULT_UPDATE_INTERVAL_MINUTES);
    }
    let minutes: u32 = input
        .parse()
        .map_err(|_| YnabError::Validation(format!("'{}' is not a number of minutes", input)))?;
    if !(MIN_UPDATE_INTERVAL_MINUTES..=MAX_UPDATE_INTERVAL_MINUTES).contains(&minutes) {
        return Err(YnabError::Validation(format!(
            "Update interval must be between {} and {} minutes",
            MIN_UPDATE_INTERVAL_MINUTES, MAX_UPDATE_INTERVAL_MINUTES
        )));
    }
    Ok(minutes)
}
