//! Budget selection step
//!
//! Picks one of the budgets visible to the token and names the instance.

use crate::api::RawBudgetSummary;
use crate::error::{YnabError, YnabResult};
use crate::models::money::SUPPORTED_CURRENCIES;
use crate::setup::prompt::prompt_string;

/// Budget step result
pub struct BudgetSetupResult {
    pub budget: RawBudgetSummary,
    pub instance_name: String,
    pub currency: String,
}

/// Budget setup step
pub struct BudgetSetupStep;

impl BudgetSetupStep {
    /// Run the budget step
    ///
    /// `preset` (id or name) skips the choice; `instance` and `currency`
    /// skip their prompts, as does `use_defaults`.
    pub fn run(
        budgets: &[RawBudgetSummary],
        preset: Option<&str>,
        instance: Option<String>,
        currency: Option<String>,
        use_defaults: bool,
    ) -> YnabResult<BudgetSetupResult> {
        println!();
        println!("Step 2: Budget");
        println!("==============");
        println!();

        if budgets.is_empty() {
            return Err(YnabError::Validation(
                "No budgets found for this access token".into(),
            ));
        }

        let budget = match preset {
            Some(wanted) => find_budget(budgets, wanted)
                .ok_or_else(|| YnabError::budget_not_found(wanted))?
                .clone(),
            None => {
                for (i, budget) in budgets.iter().enumerate() {
                    println!("  {}. {}", i + 1, budget.name);
                }
                println!();
                let choice = prompt_string("Select budget [1]: ")?;
                let index = match choice.trim() {
                    "" => 0,
                    s => s
                        .parse::<usize>()
                        .ok()
                        .filter(|n| (1..=budgets.len()).contains(n))
                        .map(|n| n - 1)
                        .ok_or_else(|| {
                            YnabError::Validation(format!("Invalid budget choice '{}'", s))
                        })?,
                };
                budgets[index].clone()
            }
        };

        let instance_name = match instance {
            Some(name) => name,
            None if use_defaults => budget.name.clone(),
            None => {
                let name = prompt_string(&format!("Instance name [{}]: ", budget.name))?;
                if name.is_empty() {
                    budget.name.clone()
                } else {
                    name
                }
            }
        };

        let default_currency = budget.iso_code().unwrap_or("USD").to_string();
        let currency = match currency {
            Some(code) => code,
            None if use_defaults => default_currency,
            None => {
                println!("Supported currencies: {}", SUPPORTED_CURRENCIES.join(", "));
                let code = prompt_string(&format!("Currency [{}]: ", default_currency))?;
                if code.is_empty() {
                    default_currency
                } else {
                    code
                }
            }
        };

        Ok(BudgetSetupResult {
            budget,
            instance_name,
            currency: currency.to_uppercase(),
        })
    }
}

/// Find a budget by id, or by case-insensitive name
pub fn find_budget<'a>(budgets: &'a [RawBudgetSummary], wanted: &str) -> Option<&'a RawBudgetSummary> {
    budgets
        .iter()
        .find(|b| b.id.as_str() == wanted)
        .or_else(|| budgets.iter().find(|b| b.name.eq_ignore_ascii_case(wanted)))
}
