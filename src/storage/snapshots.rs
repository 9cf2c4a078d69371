//! Per-instance persistence of the last published snapshot and poll status
//!
//! One JSON file per configured budget instance. The poller reloads it at
//! start-up so sensors show the last known values before the first refresh
//! completes.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::file_io::{read_json_optional, remove_if_exists, write_json_atomic};
use crate::config::SensorPaths;
use crate::error::YnabResult;
use crate::models::{PollStatus, RefreshState, Snapshot};

/// What is written to `snapshots/<instance>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub snapshot: Option<Snapshot>,
    pub status: PollStatus,
}

/// File-backed store for one budget instance
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Store for the instance with the given sanitized name
    pub fn new(paths: &SensorPaths, instance: &str) -> Self {
        Self {
            path: paths.snapshot_file(instance),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the persisted state, if any
    ///
    /// A stored refresh that was still in flight is reported as idle.
    pub fn load(&self) -> YnabResult<Option<PersistedState>> {
        let mut state: Option<PersistedState> = read_json_optional(&self.path)?;
        if let Some(state) = state.as_mut() {
            if state.status.state == RefreshState::Fetching {
                state.status.state = RefreshState::Idle;
            }
        }
        Ok(state)
    }

    pub fn save(&self, snapshot: Option<&Snapshot>, status: &PollStatus) -> YnabResult<()> {
        #[derive(Serialize)]
        struct PersistedRef<'a> {
            snapshot: Option<&'a Snapshot>,
            status: &'a PollStatus,
        }

        write_json_atomic(&self.path, &PersistedRef { snapshot, status })
    }

    /// Delete the persisted state; returns whether a file was removed
    pub fn clear(&self) -> YnabResult<bool> {
        remove_if_exists(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::YnabError;
    use crate::models::{BudgetId, Milliunits, MonthlySummary};
    use chrono::{NaiveDate, Utc};
    use tempfile::TempDir;

    fn snapshot() -> Snapshot {
        let month = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        Snapshot {
            budget_id: BudgetId::new("b1"),
            instance_name: "Home".into(),
            currency: "USD".into(),
            month,
            fetched_at: Utc::now(),
            accounts: Vec::new(),
            categories: Vec::new(),
            summary: MonthlySummary {
                month,
                budgeted: Milliunits::new(1_000),
                activity: Milliunits::zero(),
                to_be_budgeted: Milliunits::zero(),
                age_of_money: None,
                unapproved_transactions: 0,
                uncleared_transactions: 0,
                overspent_categories: 0,
                needs_attention_count: 0,
            },
        }
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SensorPaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = SnapshotStore::new(&paths, "Home");

        assert!(store.load().unwrap().is_none());

        let mut status = PollStatus::default();
        status.record_success(Utc::now());
        let snapshot = snapshot();
        store.save(Some(&snapshot), &status).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.snapshot, Some(snapshot));
        assert_eq!(loaded.status, status);
    }

    #[test]
    fn test_in_flight_state_loads_as_idle() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SensorPaths::with_base_dir(temp_dir.path().to_path_buf());
        let store = SnapshotStore::new(&paths, "Home");

        let mut status = PollStatus::default();
        status.record_failure(&YnabError::Timeout(30), Utc::now());
        status.state = RefreshState::Fetching;
        store.save(None, &status).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.status.state, RefreshState::Idle);
        assert_eq!(loaded.status.consecutive_failures, 1);
        assert!(loaded.snapshot.is_none());

        assert!(store.clear().unwrap());
        assert!(store.load().unwrap().is_none());
    }
}
