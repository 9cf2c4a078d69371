//! Polling CLI commands
//!
//! `run` keeps every configured budget fresh until Ctrl+C; `refresh` runs a
//! single refresh and prints the result.

use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::Instant;

use super::{build_client, build_coordinator, select_budgets};
use crate::api::QuotaRegistry;
use crate::config::{BudgetConfig, SensorPaths, Settings};
use crate::display::{
    format_account_list, format_attention_list, format_category_table, format_sensor_list,
    format_status, format_summary,
};
use crate::error::{YnabError, YnabResult};
use crate::models::{RefreshState, Snapshot};
use crate::sensors::build_entities;
use crate::services::{first_refresh, run_budget_from, BudgetCoordinator, RefreshOutcome};
use crate::storage::{UserValues, UserValuesStore};

/// Arguments of `ynab-sensors run`
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Only poll this instance
    pub instance: Option<String>,

    /// Print the sensors after every refresh
    #[arg(long)]
    pub print: bool,
}

/// Arguments of `ynab-sensors refresh`
#[derive(Args, Debug, Default)]
pub struct RefreshArgs {
    /// Only refresh this instance
    pub instance: Option<String>,

    /// Print the snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

/// Poll the selected budgets until Ctrl+C
pub async fn handle_run_command(
    paths: &SensorPaths,
    settings: &Settings,
    args: RunArgs,
) -> YnabResult<()> {
    let budgets = select_budgets(settings, args.instance.as_deref())?;
    paths.ensure_directories()?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut quotas = QuotaRegistry::new();

    let mut coordinators = Vec::with_capacity(budgets.len());
    for budget in budgets {
        let client = build_client(settings, budget, &mut quotas)?;
        let coordinator = Arc::new(build_coordinator(
            paths,
            settings,
            budget,
            Arc::new(client),
            shutdown_rx.clone(),
        ));
        if let Err(e) = coordinator.restore_from_store() {
            tracing::warn!(
                instance = %budget.instance_name,
                error = %e,
                "Ignoring unreadable persisted snapshot"
            );
        }
        first_refresh(&coordinator).await?;
        coordinators.push(coordinator);
    }

    let mut tasks = JoinSet::new();
    for coordinator in &coordinators {
        let interval = coordinator.budget().options.update_interval();
        tasks.spawn(run_budget_from(
            Arc::clone(coordinator),
            Instant::now() + interval,
            interval,
            shutdown_rx.clone(),
        ));
        if args.print {
            tasks.spawn(print_updates(
                Arc::clone(coordinator),
                paths.clone(),
                settings.unavailable_after_failures,
                shutdown_rx.clone(),
            ));
        }
    }

    println!(
        "Polling {} budget(s). Press Ctrl+C to stop.",
        coordinators.len()
    );

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| YnabError::Io(format!("Failed to listen for Ctrl+C: {}", e)))?;

    tracing::info!("Shutdown requested");
    // `shutdown_rx` is still held here, so the send cannot fail
    let _ = shutdown_tx.send(true);

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::warn!(error = %e, "Poller task ended abnormally");
        }
    }

    Ok(())
}

/// Refresh the selected budgets once
///
/// Every budget is attempted; the first failure is returned at the end.
pub async fn handle_refresh_command(
    paths: &SensorPaths,
    settings: &Settings,
    args: RefreshArgs,
) -> YnabResult<()> {
    let budgets = select_budgets(settings, args.instance.as_deref())?;
    paths.ensure_directories()?;

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut quotas = QuotaRegistry::new();
    let mut first_error = None;

    for budget in budgets {
        let client = build_client(settings, budget, &mut quotas)?;
        let coordinator = build_coordinator(
            paths,
            settings,
            budget,
            Arc::new(client),
            shutdown_rx.clone(),
        );
        if let Err(e) = coordinator.restore_from_store() {
            tracing::warn!(
                instance = %budget.instance_name,
                error = %e,
                "Ignoring unreadable persisted snapshot"
            );
        }

        match coordinator.refresh().await {
            Ok(RefreshOutcome::Published(snapshot)) => {
                if args.json {
                    println!("{}", serde_json::to_string_pretty(snapshot.as_ref())?);
                } else {
                    print_snapshot(budget, &snapshot);
                }
            }
            Ok(RefreshOutcome::Skipped | RefreshOutcome::Cancelled) => {}
            Err(e) => {
                eprintln!("{}: refresh failed", budget.instance_name);
                eprint!("{}", format_status(&coordinator.status()));
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn print_snapshot(budget: &BudgetConfig, snapshot: &Snapshot) {
    let symbol = budget.currency_symbol();
    let digits = budget.currency_fraction_digits();

    println!("{} ({})", budget.instance_name, budget.budget_name);
    println!();
    print!("{}", format_account_list(&snapshot.accounts, symbol, digits));
    println!();
    print!("{}", format_category_table(&snapshot.categories, symbol, digits));
    println!();
    print!("{}", format_summary(&snapshot.summary, symbol, digits));
    println!();
    print!(
        "{}",
        format_attention_list(snapshot.categories_needing_attention(), symbol, digits)
    );
}

/// Print the sensors of one budget whenever a refresh settles
async fn print_updates(
    coordinator: Arc<BudgetCoordinator>,
    paths: SensorPaths,
    unavailable_after: u32,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut status = coordinator.subscribe_status();

    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                if current.state == RefreshState::Fetching {
                    continue;
                }

                let budget = coordinator.budget();
                // Reloaded each time so values set while polling show up
                let user_values = UserValuesStore::new(&paths, &budget.sanitized_instance_name())
                    .load()
                    .unwrap_or_else(|e| {
                        tracing::warn!(error = %e, "Ignoring unreadable user values");
                        UserValues::default()
                    });
                let snapshot = coordinator.snapshot();
                let entities = build_entities(
                    budget,
                    snapshot.as_deref(),
                    &user_values,
                    &current,
                    unavailable_after,
                );
                println!("[{}]", coordinator.budget().instance_name);
                print!("{}", format_sensor_list(&entities));
            }
        }
    }
}
