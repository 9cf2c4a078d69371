//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod budget;
pub mod poll;
pub mod sensors;
pub mod setup;

use std::sync::Arc;
use tokio::sync::watch;

use crate::api::{BudgetSource, QuotaRegistry, YnabClient};
use crate::config::{BudgetConfig, SensorPaths, Settings};
use crate::error::{YnabError, YnabResult};
use crate::services::BudgetCoordinator;
use crate::storage::SnapshotStore;

pub use budget::{handle_budget_command, BudgetCommands};
pub use poll::{handle_refresh_command, handle_run_command, RefreshArgs, RunArgs};
pub use sensors::{collect_sensors, handle_sensors_command, handle_status_command, SensorsArgs};
pub use setup::{handle_setup_command, SetupCommand};

/// The configured budgets a command applies to
///
/// With no instance named every configured budget is selected.
pub(crate) fn select_budgets<'a>(
    settings: &'a Settings,
    instance: Option<&str>,
) -> YnabResult<Vec<&'a BudgetConfig>> {
    match instance {
        Some(name) => settings
            .find_budget(name)
            .map(|b| vec![b])
            .ok_or_else(|| YnabError::budget_not_found(name)),
        None if settings.budgets.is_empty() => Err(YnabError::Config(
            "No budgets configured. Run 'ynab-sensors setup' first.".into(),
        )),
        None => Ok(settings.budgets.iter().collect()),
    }
}

/// Client for one budget's token
///
/// Budgets polled with the same token share one throttle and one hourly
/// usage count, since YNAB limits requests per token.
pub(crate) fn build_client(
    settings: &Settings,
    budget: &BudgetConfig,
    quotas: &mut QuotaRegistry,
) -> YnabResult<YnabClient> {
    let client = YnabClient::new(budget.access_token.clone(), settings.request_timeout())?;
    Ok(client.with_quota(quotas.quota_for(&budget.access_token)))
}

/// Wire a coordinator for one budget
pub(crate) fn build_coordinator(
    paths: &SensorPaths,
    settings: &Settings,
    budget: &BudgetConfig,
    source: Arc<dyn BudgetSource>,
    shutdown: watch::Receiver<bool>,
) -> BudgetCoordinator {
    let store = SnapshotStore::new(paths, &budget.sanitized_instance_name());

    BudgetCoordinator::new(budget.clone(), source, shutdown)
        .with_policy(settings.attention)
        .with_timeout(settings.request_timeout())
        .with_store(store)
}
