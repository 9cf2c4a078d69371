//! Account and category selection step
//!
//! "All" is resolved to the explicit ids visible at setup time, so accounts
//! and categories created later are not picked up until setup runs again.

use crate::api::{RawAccount, RawCategoryGroup};
use crate::config::{BudgetOptions, Selection};
use crate::error::YnabResult;
use crate::models::{AccountId, CategoryId};
use crate::services::snapshot::INTERNAL_GROUP;
use crate::setup::prompt::{parse_index_list, prompt_string, prompt_yes_no};

/// Selection step result
pub struct SelectionSetupResult {
    pub accounts: Selection<AccountId>,
    pub categories: Selection<CategoryId>,
}

/// An account or category offered for selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<T> {
    pub id: T,
    pub label: String,
}

/// Accounts that pass the include-closed filter
pub fn account_candidates(
    accounts: &[RawAccount],
    options: &BudgetOptions,
) -> Vec<Candidate<AccountId>> {
    accounts
        .iter()
        .filter(|a| !a.deleted)
        .filter(|a| options.include_closed_accounts || !a.closed)
        .map(|a| Candidate {
            id: a.id.clone(),
            label: a.name.clone(),
        })
        .collect()
}

/// Categories that pass the include-hidden filter, labelled with their group
pub fn category_candidates(
    groups: &[RawCategoryGroup],
    options: &BudgetOptions,
) -> Vec<Candidate<CategoryId>> {
    groups
        .iter()
        .filter(|g| !g.deleted && g.name != INTERNAL_GROUP)
        .flat_map(|g| {
            g.categories
                .iter()
                .filter(|c| !c.deleted)
                .filter(move |c| options.include_hidden_categories || !(c.hidden || g.hidden))
                .map(move |c| Candidate {
                    id: c.id.clone(),
                    label: format!("{} / {}", g.name, c.name),
                })
        })
        .collect()
}

/// Explicit selection of every candidate
pub fn select_all<T: Clone>(candidates: &[Candidate<T>]) -> Selection<T> {
    Selection::Only(candidates.iter().map(|c| c.id.clone()).collect())
}

/// Selection step
pub struct SelectionSetupStep;

impl SelectionSetupStep {
    /// Run the selection step; `all` skips the prompts
    pub fn run(
        accounts: &[RawAccount],
        groups: &[RawCategoryGroup],
        options: &BudgetOptions,
        all: bool,
    ) -> YnabResult<SelectionSetupResult> {
        let accounts = account_candidates(accounts, options);
        let categories = category_candidates(groups, options);

        if all {
            return Ok(SelectionSetupResult {
                accounts: select_all(&accounts),
                categories: select_all(&categories),
            });
        }

        println!();
        println!("Step 4: Accounts and Categories");
        println!("===============================");

        Ok(SelectionSetupResult {
            accounts: pick("accounts", &accounts)?,
            categories: pick("categories", &categories)?,
        })
    }
}

fn pick<T: Clone>(what: &str, candidates: &[Candidate<T>]) -> YnabResult<Selection<T>> {
    println!();
    if prompt_yes_no(
        &format!("Import all {} {}? (yes/no) [yes]: ", candidates.len(), what),
        true,
    )? {
        return Ok(select_all(candidates));
    }

    for (i, candidate) in candidates.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, candidate.label);
    }
    let answer = prompt_string(&format!("Numbers of {} to import (comma separated): ", what))?;
    let picked = parse_index_list(&answer, candidates.len())?;

    Ok(Selection::Only(
        picked.into_iter().map(|i| candidates[i].id.clone()).collect(),
    ))
}
