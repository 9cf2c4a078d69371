//! Refresh coordinator for one budget
//!
//! Owns the published snapshot and poll status of a single configured
//! budget. Both are held in `watch` channels: a refresh replaces the snapshot
//! in one send, so readers see either the previous snapshot or the new one.

use chrono::{DateTime, Local, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

use super::snapshot::{build_snapshot, month_start};
use crate::api::{BudgetSource, RawBudgetData};
use crate::config::{AttentionPolicy, BudgetConfig};
use crate::error::{YnabError, YnabResult};
use crate::models::{PollStatus, RefreshState, Snapshot};
use crate::storage::{PersistedState, SnapshotStore};

/// Default upper bound for one refresh
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(30);

/// Result of a refresh call that did not fail
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// A new snapshot was built and published
    Published(Arc<Snapshot>),
    /// Another refresh for this budget was already in flight
    Skipped,
    /// The instance shut down before the fetch finished; nothing was published
    Cancelled,
}

/// Polls one budget and publishes its snapshot
pub struct BudgetCoordinator {
    budget: BudgetConfig,
    policy: AttentionPolicy,
    timeout: Duration,
    source: Arc<dyn BudgetSource>,
    store: Option<SnapshotStore>,
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
    status_tx: watch::Sender<PollStatus>,
    shutdown: watch::Receiver<bool>,
    in_flight: Mutex<()>,
}

impl BudgetCoordinator {
    pub fn new(
        budget: BudgetConfig,
        source: Arc<dyn BudgetSource>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(None);
        let (status_tx, _) = watch::channel(PollStatus::default());

        Self {
            budget,
            policy: AttentionPolicy::default(),
            timeout: DEFAULT_REFRESH_TIMEOUT,
            source,
            store: None,
            snapshot_tx,
            status_tx,
            shutdown,
            in_flight: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: AttentionPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Persist every published snapshot and status change to `store`
    #[must_use]
    pub fn with_store(mut self, store: SnapshotStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn budget(&self) -> &BudgetConfig {
        &self.budget
    }

    /// Latest published snapshot, if any refresh has succeeded
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot_tx.borrow().clone()
    }

    pub fn status(&self) -> PollStatus {
        self.status_tx.borrow().clone()
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.snapshot_tx.subscribe()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<PollStatus> {
        self.status_tx.subscribe()
    }

    /// Publish state persisted by a previous run
    pub fn restore(&self, state: PersistedState) {
        if let Some(snapshot) = state.snapshot {
            tracing::info!(
                instance = %self.budget.instance_name,
                fetched_at = %snapshot.fetched_at,
                "Restored persisted snapshot"
            );
            self.snapshot_tx.send_replace(Some(Arc::new(snapshot)));
        }
        self.status_tx.send_replace(state.status);
    }

    /// Load and publish persisted state from the configured store
    pub fn restore_from_store(&self) -> YnabResult<bool> {
        let Some(store) = &self.store else {
            return Ok(false);
        };
        match store.load()? {
            Some(state) => {
                self.restore(state);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Fetch, build and publish a new snapshot
    ///
    /// At most one refresh runs per budget; a call made while another is in
    /// flight returns [`RefreshOutcome::Skipped`]. On failure the published
    /// snapshot is left untouched and the error is recorded in the status.
    pub async fn refresh(&self) -> YnabResult<RefreshOutcome> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!(
                instance = %self.budget.instance_name,
                "Refresh already in flight, skipping"
            );
            return Ok(RefreshOutcome::Skipped);
        };

        if *self.shutdown.borrow() {
            return Ok(RefreshOutcome::Cancelled);
        }

        self.status_tx
            .send_modify(|status| status.state = RefreshState::Fetching);
        tracing::debug!(
            instance = %self.budget.instance_name,
            budget = %self.budget.budget_id.short(),
            "Refreshing budget"
        );

        let today = Local::now().date_naive();
        let fetch = tokio::time::timeout(self.timeout, self.fetch(month_start(today)));

        let result = tokio::select! {
            biased;
            _ = shutdown_requested(self.shutdown.clone()) => {
                tracing::debug!(
                    instance = %self.budget.instance_name,
                    "Shutdown during refresh, discarding result"
                );
                self.status_tx.send_modify(|status| status.state = RefreshState::Idle);
                return Ok(RefreshOutcome::Cancelled);
            }
            result = fetch => match result {
                Ok(inner) => inner,
                Err(_) => Err(YnabError::Timeout(self.timeout.as_secs())),
            },
        };

        let now = Utc::now();
        match result {
            Ok(raw) => Ok(RefreshOutcome::Published(self.publish(raw, now, today))),
            Err(err) => {
                self.record_failure(&err, now);
                Err(err)
            }
        }
    }

    async fn fetch(&self, month: NaiveDate) -> YnabResult<RawBudgetData> {
        let budget = &self.budget.budget_id;
        let (accounts, category_groups, month, transactions) = tokio::try_join!(
            self.source.accounts(budget),
            self.source.categories(budget),
            self.source.month(budget, month),
            self.source.transactions(budget),
        )?;

        Ok(RawBudgetData {
            accounts,
            category_groups,
            month,
            transactions,
        })
    }

    fn publish(&self, raw: RawBudgetData, now: DateTime<Utc>, today: NaiveDate) -> Arc<Snapshot> {
        let snapshot = Arc::new(build_snapshot(raw, &self.budget, &self.policy, now, today));
        self.snapshot_tx.send_replace(Some(Arc::clone(&snapshot)));

        let rate_limit = self.source.rate_limit();
        self.status_tx.send_modify(|status| {
            status.record_success(now);
            status.rate_limit = rate_limit;
        });

        tracing::info!(
            instance = %self.budget.instance_name,
            accounts = snapshot.accounts.len(),
            categories = snapshot.categories.len(),
            needs_attention = snapshot.summary.needs_attention_count,
            "Published budget snapshot"
        );

        self.persist();
        snapshot
    }

    fn record_failure(&self, err: &YnabError, now: DateTime<Utc>) {
        let rate_limit = self.source.rate_limit();
        self.status_tx.send_modify(|status| {
            status.record_failure(err, now);
            status.rate_limit = rate_limit;
        });

        let failures = self.status_tx.borrow().consecutive_failures;
        if err.is_auth() {
            tracing::error!(
                instance = %self.budget.instance_name,
                error = %err,
                "Access token rejected by YNAB"
            );
        } else {
            tracing::warn!(
                instance = %self.budget.instance_name,
                kind = %err.kind(),
                error = %err,
                consecutive_failures = failures,
                "Refresh failed, keeping previous snapshot"
            );
        }

        self.persist();
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        let snapshot = self.snapshot();
        let status = self.status();
        if let Err(e) = store.save(snapshot.as_deref(), &status) {
            tracing::warn!(
                instance = %self.budget.instance_name,
                error = %e,
                "Failed to persist snapshot"
            );
        }
    }
}

/// Resolves once shutdown is signalled or the signalling side is gone
async fn shutdown_requested(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::{RawAccount, RawBudgetSummary, RawCategoryGroup, RawMonth, RawTransaction};
    use crate::error::ErrorKind;
    use crate::models::{BudgetId, ConnectionStatus};
    use crate::services::snapshot::tests::sample_data;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use tempfile::TempDir;

    /// In-memory budget source with scripted failures and latency
    pub(crate) struct FakeSource {
        data: RawBudgetData,
        failure: StdMutex<Option<fn() -> YnabError>>,
        delay: Option<Duration>,
        pub(crate) month_calls: AtomicUsize,
    }

    impl FakeSource {
        pub(crate) fn new() -> Self {
            Self {
                data: sample_data(),
                failure: StdMutex::new(None),
                delay: None,
                month_calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub(crate) fn fail_with(&self, failure: Option<fn() -> YnabError>) {
            *self.failure.lock().unwrap() = failure;
        }

        fn check(&self) -> YnabResult<()> {
            match *self.failure.lock().unwrap() {
                Some(make) => Err(make()),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl BudgetSource for FakeSource {
        async fn list_budgets(&self) -> YnabResult<Vec<RawBudgetSummary>> {
            self.check()?;
            Ok(Vec::new())
        }

        async fn accounts(&self, _budget: &BudgetId) -> YnabResult<Vec<RawAccount>> {
            self.check()?;
            Ok(self.data.accounts.clone())
        }

        async fn categories(&self, _budget: &BudgetId) -> YnabResult<Vec<RawCategoryGroup>> {
            self.check()?;
            Ok(self.data.category_groups.clone())
        }

        async fn month(&self, _budget: &BudgetId, _month: NaiveDate) -> YnabResult<RawMonth> {
            self.month_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.check()?;
            Ok(self.data.month.clone())
        }

        async fn transactions(&self, _budget: &BudgetId) -> YnabResult<Vec<RawTransaction>> {
            self.check()?;
            Ok(self.data.transactions.clone())
        }
    }

    pub(crate) fn coordinator(
        source: Arc<FakeSource>,
    ) -> (BudgetCoordinator, watch::Sender<bool>) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let budget = BudgetConfig::new("b1", "Home", "token");
        (
            BudgetCoordinator::new(budget, source, shutdown_rx),
            shutdown_tx,
        )
    }

    fn network_error() -> YnabError {
        YnabError::Network("connection reset".into())
    }

    #[tokio::test]
    async fn test_refresh_publishes_snapshot() {
        let (coordinator, _shutdown) = coordinator(Arc::new(FakeSource::new()));
        let mut updates = coordinator.subscribe_snapshot();

        let outcome = coordinator.refresh().await.unwrap();
        let RefreshOutcome::Published(snapshot) = outcome else {
            panic!("expected a published snapshot");
        };

        assert_eq!(snapshot.accounts.len(), 1);
        assert!(updates.has_changed().unwrap());
        assert_eq!(
            updates.borrow_and_update().as_ref().map(|s| s.fetched_at),
            Some(snapshot.fetched_at)
        );

        let status = coordinator.status();
        assert_eq!(status.state, RefreshState::Published);
        assert_eq!(status.consecutive_failures, 0);
        assert_eq!(status.last_success, Some(snapshot.fetched_at));
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_snapshot() {
        let source = Arc::new(FakeSource::new());
        let (coordinator, _shutdown) = coordinator(Arc::clone(&source));

        coordinator.refresh().await.unwrap();
        let before = coordinator.snapshot().unwrap();

        source.fail_with(Some(network_error));
        assert!(coordinator.refresh().await.is_err());
        assert!(coordinator.refresh().await.is_err());

        let after = coordinator.snapshot().unwrap();
        assert!(Arc::ptr_eq(&before, &after));

        let status = coordinator.status();
        assert_eq!(status.state, RefreshState::Failed);
        assert_eq!(status.consecutive_failures, 2);
        assert_eq!(status.last_error.as_ref().unwrap().kind, ErrorKind::Connect);
        assert_eq!(status.last_success, Some(before.fetched_at));

        source.fail_with(None);
        coordinator.refresh().await.unwrap();
        let status = coordinator.status();
        assert_eq!(status.consecutive_failures, 0);
        assert!(status.last_error.is_none());
    }

    #[tokio::test]
    async fn test_auth_failure_status() {
        let source = Arc::new(FakeSource::new());
        let (coordinator, _shutdown) = coordinator(Arc::clone(&source));

        source.fail_with(Some(|| YnabError::Auth("Unauthorized".into())));
        let err = coordinator.refresh().await.unwrap_err();

        assert!(err.is_auth());
        assert!(coordinator.snapshot().is_none());
        assert_eq!(coordinator.status().connection, ConnectionStatus::Unauthorized);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_refresh_is_skipped() {
        let source = Arc::new(FakeSource::new().with_delay(Duration::from_secs(5)));
        let (coordinator, _shutdown) = coordinator(Arc::clone(&source));
        let coordinator = Arc::new(coordinator);

        let first = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move { coordinator.refresh().await }
        });
        tokio::task::yield_now().await;

        let second = coordinator.refresh().await.unwrap();
        assert!(matches!(second, RefreshOutcome::Skipped));

        let first = first.await.unwrap().unwrap();
        assert!(matches!(first, RefreshOutcome::Published(_)));
        assert_eq!(source.month_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_times_out() {
        let source = Arc::new(FakeSource::new().with_delay(Duration::from_secs(60)));
        let (coordinator, _shutdown) = coordinator(source);

        let err = coordinator.refresh().await.unwrap_err();
        assert!(matches!(err, YnabError::Timeout(30)));
        assert_eq!(coordinator.status().consecutive_failures, 1);
        assert!(coordinator.snapshot().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_discards_in_flight_refresh() {
        let source = Arc::new(FakeSource::new().with_delay(Duration::from_secs(10)));
        let (coordinator, shutdown) = coordinator(source);
        let coordinator = Arc::new(coordinator);

        let refresh = tokio::spawn({
            let coordinator = Arc::clone(&coordinator);
            async move { coordinator.refresh().await }
        });
        tokio::task::yield_now().await;
        shutdown.send(true).unwrap();

        let outcome = refresh.await.unwrap().unwrap();
        assert!(matches!(outcome, RefreshOutcome::Cancelled));
        assert!(coordinator.snapshot().is_none());
        assert_eq!(coordinator.status().consecutive_failures, 0);
    }

    #[tokio::test]
    async fn test_persist_and_restore() {
        let temp_dir = TempDir::new().unwrap();
        let paths = crate::config::SensorPaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = SnapshotStore::new(&paths, "Home");

        let (coordinator, _shutdown) = coordinator(Arc::new(FakeSource::new()));
        let coordinator = coordinator.with_store(store.clone());
        coordinator.refresh().await.unwrap();
        let published = coordinator.snapshot().unwrap();

        let (restarted, _shutdown) = self::coordinator(Arc::new(FakeSource::new()));
        let restarted = restarted.with_store(store);
        assert!(restarted.restore_from_store().unwrap());

        let restored = restarted.snapshot().unwrap();
        assert_eq!(restored.fetched_at, published.fetched_at);
        assert_eq!(restarted.status().state, RefreshState::Published);
    }
}
