//! Per-account values entered by the user
//!
//! YNAB does not know an account's credit limit, APR or payment due day.
//! Users set them from the CLI; they are kept per instance under
//! `user_values/<instance>.json` and attached to the account sensors.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::file_io::{read_json_optional, remove_if_exists, write_json_atomic};
use crate::config::SensorPaths;
use crate::error::{YnabError, YnabResult};
use crate::models::{AccountId, Milliunits};

/// Highest APR accepted, in percent
pub const MAX_APR_PERCENT: u32 = 40;

/// Highest payment due day accepted; every month has it
pub const MAX_DUE_DAY: u8 = 28;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountExtras {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<Milliunits>,

    /// Annual percentage rate, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apr: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_day: Option<u8>,
}

impl AccountExtras {
    pub fn is_empty(&self) -> bool {
        self.credit_limit.is_none() && self.apr.is_none() && self.due_day.is_none()
    }
}

/// All user values of one instance, keyed by account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserValues {
    #[serde(default)]
    pub accounts: BTreeMap<AccountId, AccountExtras>,
}

impl UserValues {
    pub fn get(&self, account: &AccountId) -> Option<&AccountExtras> {
        self.accounts.get(account)
    }

    pub fn set_credit_limit(
        &mut self,
        account: &AccountId,
        limit: Option<Decimal>,
    ) -> YnabResult<()> {
        let limit = limit
            .map(|value| {
                if value.is_sign_negative() {
                    return Err(YnabError::Validation(
                        "Credit limit cannot be negative".into(),
                    ));
                }
                Milliunits::from_decimal(value).ok_or_else(|| {
                    YnabError::Validation(format!("Credit limit {} is out of range", value))
                })
            })
            .transpose()?;

        self.update(account, |extras| extras.credit_limit = limit);
        Ok(())
    }

    pub fn set_apr(&mut self, account: &AccountId, apr: Option<Decimal>) -> YnabResult<()> {
        if let Some(value) = apr {
            if value.is_sign_negative() || value > Decimal::from(MAX_APR_PERCENT) {
                return Err(YnabError::Validation(format!(
                    "APR must be between 0 and {}%",
                    MAX_APR_PERCENT
                )));
            }
        }

        self.update(account, |extras| extras.apr = apr.map(|v| v.round_dp(2)));
        Ok(())
    }

    pub fn set_due_day(&mut self, account: &AccountId, day: Option<u8>) -> YnabResult<()> {
        if let Some(day) = day {
            if !(1..=MAX_DUE_DAY).contains(&day) {
                return Err(YnabError::Validation(format!(
                    "Due day must be between 1 and {}",
                    MAX_DUE_DAY
                )));
            }
        }

        self.update(account, |extras| extras.due_day = day);
        Ok(())
    }

    /// Apply a change and drop the entry once nothing is left in it
    fn update(&mut self, account: &AccountId, change: impl FnOnce(&mut AccountExtras)) {
        let extras = self.accounts.entry(account.clone()).or_default();
        change(extras);
        if extras.is_empty() {
            self.accounts.remove(account);
        }
    }
}

/// File-backed user values for one budget instance
#[derive(Debug, Clone)]
pub struct UserValuesStore {
    path: PathBuf,
}

impl UserValuesStore {
    /// Store for the instance with the given sanitized name
    pub fn new(paths: &SensorPaths, instance: &str) -> Self {
        Self {
            path: paths.user_values_file(instance),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Stored values, or none at all when nothing was ever set
    pub fn load(&self) -> YnabResult<UserValues> {
        Ok(read_json_optional(&self.path)?.unwrap_or_default())
    }

    pub fn save(&self, values: &UserValues) -> YnabResult<()> {
        write_json_atomic(&self.path, values)
    }

    pub fn clear(&self) -> YnabResult<bool> {
        remove_if_exists(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let temp = TempDir::new().unwrap();
        let paths = SensorPaths::with_base_dir(temp.path().to_path_buf());
        let store = UserValuesStore::new(&paths, "Home");

        assert_eq!(store.load().unwrap(), UserValues::default());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let paths = SensorPaths::with_base_dir(temp.path().to_path_buf());
        let store = UserValuesStore::new(&paths, "Home");
        let card = AccountId::new("card");

        let mut values = UserValues::default();
        values.set_credit_limit(&card, Some(dec("2500.50"))).unwrap();
        values.set_apr(&card, Some(dec("19.999"))).unwrap();
        values.set_due_day(&card, Some(15)).unwrap();
        store.save(&values).unwrap();

        let loaded = store.load().unwrap();
        let extras = loaded.get(&card).unwrap();
        assert_eq!(extras.credit_limit, Some(Milliunits::new(2_500_500)));
        assert_eq!(extras.apr, Some(dec("20.00")));
        assert_eq!(extras.due_day, Some(15));

        assert!(store.clear().unwrap());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        let mut values = UserValues::default();
        let card = AccountId::new("card");

        let err = values.set_credit_limit(&card, Some(dec("-1"))).unwrap_err();
        assert!(matches!(err, YnabError::Validation(_)));
        assert!(values.set_apr(&card, Some(dec("40.01"))).is_err());
        assert!(values.set_due_day(&card, Some(0)).is_err());
        assert!(values.set_due_day(&card, Some(29)).is_err());
        assert!(values.get(&card).is_none());

        values.set_apr(&card, Some(dec("40"))).unwrap();
        values.set_due_day(&card, Some(28)).unwrap();
        assert_eq!(values.get(&card).unwrap().due_day, Some(28));
    }

    #[test]
    fn test_clearing_last_value_drops_account() {
        let mut values = UserValues::default();
        let card = AccountId::new("card");

        values.set_due_day(&card, Some(3)).unwrap();
        values.set_credit_limit(&card, Some(dec("1000"))).unwrap();
        values.set_due_day(&card, None).unwrap();
        assert_eq!(values.get(&card).unwrap().due_day, None);

        values.set_credit_limit(&card, None).unwrap();
        assert!(values.accounts.is_empty());
    }
}
