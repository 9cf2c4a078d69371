//! Interval scheduling of budget refreshes
//!
//! Each configured budget runs its own loop. Ticks never queue up behind a
//! slow refresh: the loop awaits the refresh before looking at the next tick
//! and missed ticks are skipped.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use super::coordinator::{BudgetCoordinator, RefreshOutcome};
use crate::error::YnabResult;

/// Run the first refresh of a budget at start-up
///
/// A rejected access token aborts start-up; any other failure is logged and
/// left to the regular polling loop.
pub async fn first_refresh(coordinator: &BudgetCoordinator) -> YnabResult<()> {
    match coordinator.refresh().await {
        Ok(_) => Ok(()),
        Err(err) if err.is_auth() => Err(err),
        Err(err) => {
            tracing::warn!(
                instance = %coordinator.budget().instance_name,
                error = %err,
                "First refresh failed, will retry on the next interval"
            );
            Ok(())
        }
    }
}

/// Poll one budget every `interval` until shutdown is signalled
///
/// The first tick fires immediately.
pub async fn run_budget(
    coordinator: Arc<BudgetCoordinator>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
) {
    run_budget_from(coordinator, Instant::now(), interval, shutdown).await;
}

/// Like [`run_budget`], with the first tick at `start`
pub async fn run_budget_from(
    coordinator: Arc<BudgetCoordinator>,
    start: Instant,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let instance = coordinator.budget().instance_name.clone();
    let mut ticker = tokio::time::interval_at(start, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        instance = %instance,
        interval_secs = interval.as_secs(),
        "Starting budget poller"
    );

    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                match coordinator.refresh().await {
                    Ok(RefreshOutcome::Cancelled) => break,
                    Ok(RefreshOutcome::Skipped) => {
                        tracing::debug!(instance = %instance, "Tick coalesced into running refresh");
                    }
                    Ok(RefreshOutcome::Published(_)) => {}
                    // Already recorded in the poll status and logged
                    Err(_) => {}
                }
            }
        }
    }

    tracing::info!(instance = %instance, "Budget poller stopped");
}
