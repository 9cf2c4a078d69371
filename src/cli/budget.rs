//! Budget CLI commands
//!
//! Lists and removes configured budget instances, lists the budgets an
//! access token can see, and records the per-account values YNAB does not
//! track.

use clap::{Args, Subcommand};
use rust_decimal::Decimal;

use crate::api::{BudgetSource, YnabClient};
use crate::config::{BudgetConfig, SensorPaths, Settings};
use crate::display::{format_available_budgets, format_budget_list};
use crate::error::{YnabError, YnabResult};
use crate::models::{AccountId, AccountSnapshot};
use crate::storage::{SnapshotStore, UserValues, UserValuesStore};

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// List configured budget instances
    List,

    /// List the budgets visible to an access token
    Available {
        /// YNAB personal access token
        #[arg(long, env = "YNAB_ACCESS_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Remove a configured budget instance and its persisted state
    Remove {
        /// Instance name
        instance: String,
    },

    /// Set the credit limit of a credit card or line of credit
    SetCreditLimit(AmountArgs),

    /// Set the APR (percent) of a credit card or personal loan
    SetApr(AmountArgs),

    /// Set the payment due day (1-28) of a credit card or personal loan
    SetDueDay(DueDayArgs),
}

/// Target account and new amount of `set-credit-limit` and `set-apr`
#[derive(Args, Debug)]
pub struct AmountArgs {
    /// Instance name
    pub instance: String,

    /// Account id or name, as in the last snapshot
    pub account: String,

    /// New value
    #[arg(required_unless_present = "clear")]
    pub value: Option<Decimal>,

    /// Remove the stored value
    #[arg(long, conflicts_with = "value")]
    pub clear: bool,
}

/// Target account and new day of `set-due-day`
#[derive(Args, Debug)]
pub struct DueDayArgs {
    /// Instance name
    pub instance: String,

    /// Account id or name, as in the last snapshot
    pub account: String,

    /// Day of the month
    #[arg(required_unless_present = "clear")]
    pub value: Option<u8>,

    /// Remove the stored value
    #[arg(long, conflicts_with = "value")]
    pub clear: bool,
}

/// A change to one user value; `None` removes it
#[derive(Debug, Clone, Copy, PartialEq)]
enum UserValueChange {
    CreditLimit(Option<Decimal>),
    Apr(Option<Decimal>),
    DueDay(Option<u8>),
}

impl UserValueChange {
    fn label(self) -> &'static str {
        match self {
            Self::CreditLimit(_) => "credit limit",
            Self::Apr(_) => "APR",
            Self::DueDay(_) => "due day",
        }
    }

    fn applies_to(self, account: &AccountSnapshot) -> bool {
        match self {
            Self::CreditLimit(_) => account.account_type.has_credit_limit(),
            Self::Apr(_) | Self::DueDay(_) => account.account_type.has_repayment_terms(),
        }
    }

    fn apply(self, values: &mut UserValues, account: &AccountId) -> YnabResult<()> {
        match self {
            Self::CreditLimit(limit) => values.set_credit_limit(account, limit),
            Self::Apr(apr) => values.set_apr(account, apr),
            Self::DueDay(day) => values.set_due_day(account, day),
        }
    }
}

/// Handle a budget command
pub async fn handle_budget_command(
    paths: &SensorPaths,
    settings: &mut Settings,
    cmd: BudgetCommands,
) -> YnabResult<()> {
    match cmd {
        BudgetCommands::List => {
            print!("{}", format_budget_list(&settings.budgets));
            if settings.budgets.is_empty() {
                println!();
                println!("Run 'ynab-sensors setup' to add one.");
            }
        }
        BudgetCommands::Available { token } => {
            let client = YnabClient::new(token, settings.request_timeout())?;
            let budgets = client.list_budgets().await?;
            print!("{}", format_available_budgets(&budgets));
        }
        BudgetCommands::Remove { instance } => {
            let budget = settings
                .find_budget(&instance)
                .cloned()
                .ok_or_else(|| YnabError::budget_not_found(&instance))?;

            settings.remove_budget(&budget.instance_name);
            settings.save(paths)?;

            let instance = budget.sanitized_instance_name();
            SnapshotStore::new(paths, &instance).clear()?;
            UserValuesStore::new(paths, &instance).clear()?;

            tracing::info!(instance = %budget.instance_name, "Budget removed");
            println!("Removed budget instance '{}'", budget.instance_name);
        }
        BudgetCommands::SetCreditLimit(args) => {
            let change = UserValueChange::CreditLimit(args.value.filter(|_| !args.clear));
            set_user_value(paths, settings, &args.instance, &args.account, change)?;
        }
        BudgetCommands::SetApr(args) => {
            let change = UserValueChange::Apr(args.value.filter(|_| !args.clear));
            set_user_value(paths, settings, &args.instance, &args.account, change)?;
        }
        BudgetCommands::SetDueDay(args) => {
            let change = UserValueChange::DueDay(args.value.filter(|_| !args.clear));
            set_user_value(paths, settings, &args.instance, &args.account, change)?;
        }
    }

    Ok(())
}

/// Resolve the account against the persisted snapshot, apply the change and
/// store it
fn set_user_value(
    paths: &SensorPaths,
    settings: &Settings,
    instance: &str,
    account: &str,
    change: UserValueChange,
) -> YnabResult<()> {
    let budget = settings
        .find_budget(instance)
        .ok_or_else(|| YnabError::budget_not_found(instance))?;
    let target = find_account(paths, budget, account)?;

    if !change.applies_to(&target) {
        return Err(YnabError::Validation(format!(
            "Cannot set {} on '{}' ({} account)",
            change.label(),
            target.name,
            target.account_type
        )));
    }

    let store = UserValuesStore::new(paths, &budget.sanitized_instance_name());
    let mut values = store.load()?;
    change.apply(&mut values, &target.id)?;
    store.save(&values)?;

    tracing::info!(
        instance = %budget.instance_name,
        account = %target.id,
        field = change.label(),
        "User value updated"
    );
    println!(
        "Updated {} of '{}' in '{}'",
        change.label(),
        target.name,
        budget.instance_name
    );
    Ok(())
}

/// Find an account by id, or by name ignoring case
fn find_account(
    paths: &SensorPaths,
    budget: &BudgetConfig,
    query: &str,
) -> YnabResult<AccountSnapshot> {
    let snapshot = SnapshotStore::new(paths, &budget.sanitized_instance_name())
        .load()?
        .and_then(|state| state.snapshot)
        .ok_or_else(|| {
            YnabError::Config(format!(
                "No snapshot for '{}' yet. Run 'ynab-sensors refresh' first.",
                budget.instance_name
            ))
        })?;

    snapshot
        .account(&AccountId::new(query))
        .or_else(|| {
            snapshot
                .accounts
                .iter()
                .find(|a| a.name.eq_ignore_ascii_case(query))
        })
        .cloned()
        .ok_or_else(|| YnabError::NotFound {
            entity_type: "Account",
            identifier: query.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetId, Milliunits, PollStatus};
    use crate::services::build_snapshot;
    use crate::services::snapshot::tests::sample_data;
    use chrono::{NaiveDate, Utc};
    use std::str::FromStr;
    use tempfile::TempDir;

    /// Settings with one budget whose snapshot includes the closed credit card
    fn with_snapshot(paths: &SensorPaths) -> Settings {
        let mut budget = BudgetConfig::new(BudgetId::new("b1"), "Home", "t");
        budget.options.include_closed_accounts = true;

        let snapshot = build_snapshot(
            sample_data(),
            &budget,
            &Default::default(),
            Utc::now(),
            NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
        );
        SnapshotStore::new(paths, "Home")
            .save(Some(&snapshot), &PollStatus::default())
            .unwrap();

        let mut settings = Settings::default();
        settings.upsert_budget(budget);
        settings
    }

    fn amount(account: &str, value: &str) -> AmountArgs {
        AmountArgs {
            instance: "Home".into(),
            account: account.into(),
            value: Some(Decimal::from_str(value).unwrap()),
            clear: false,
        }
    }

    #[tokio::test]
    async fn test_remove_clears_config_and_snapshot() {
        let temp = TempDir::new().unwrap();
        let paths = SensorPaths::with_base_dir(temp.path().to_path_buf());
        paths.ensure_directories().unwrap();

        let mut settings = Settings::default();
        settings.upsert_budget(BudgetConfig::new(BudgetId::new("b1"), "Home Budget", "t"));
        settings.save(&paths).unwrap();

        let store = SnapshotStore::new(&paths, "Home_Budget");
        store.save(None, &PollStatus::default()).unwrap();
        assert!(store.path().exists());
        let user_values = UserValuesStore::new(&paths, "Home_Budget");
        user_values.save(&UserValues::default()).unwrap();

        handle_budget_command(
            &paths,
            &mut settings,
            BudgetCommands::Remove {
                instance: "Home Budget".into(),
            },
        )
        .await
        .unwrap();

        assert!(settings.budgets.is_empty());
        assert!(!store.path().exists());
        assert!(!user_values.path().exists());
        assert!(Settings::load_or_create(&paths).unwrap().budgets.is_empty());
    }

    #[tokio::test]
    async fn test_remove_unknown_instance() {
        let temp = TempDir::new().unwrap();
        let paths = SensorPaths::with_base_dir(temp.path().to_path_buf());
        let mut settings = Settings::default();

        let err = handle_budget_command(
            &paths,
            &mut settings,
            BudgetCommands::Remove {
                instance: "missing".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_set_credit_card_values_by_name() {
        let temp = TempDir::new().unwrap();
        let paths = SensorPaths::with_base_dir(temp.path().to_path_buf());
        let mut settings = with_snapshot(&paths);

        handle_budget_command(
            &paths,
            &mut settings,
            BudgetCommands::SetCreditLimit(amount("old card", "2000")),
        )
        .await
        .unwrap();
        handle_budget_command(
            &paths,
            &mut settings,
            BudgetCommands::SetApr(amount("old-card", "18.5")),
        )
        .await
        .unwrap();
        handle_budget_command(
            &paths,
            &mut settings,
            BudgetCommands::SetDueDay(DueDayArgs {
                instance: "Home".into(),
                account: "Old Card".into(),
                value: Some(21),
                clear: false,
            }),
        )
        .await
        .unwrap();

        let store = UserValuesStore::new(&paths, "Home");
        let values = store.load().unwrap();
        let extras = values.get(&AccountId::new("old-card")).unwrap();
        assert_eq!(extras.credit_limit, Some(Milliunits::new(2_000_000)));
        assert_eq!(extras.apr, Some(Decimal::from_str("18.5").unwrap()));
        assert_eq!(extras.due_day, Some(21));

        let mut clear = amount("old-card", "0");
        clear.value = None;
        clear.clear = true;
        handle_budget_command(&paths, &mut settings, BudgetCommands::SetApr(clear))
            .await
            .unwrap();
        let values = store.load().unwrap();
        assert_eq!(values.get(&AccountId::new("old-card")).unwrap().apr, None);
    }

    #[tokio::test]
    async fn test_set_value_on_wrong_account_type() {
        let temp = TempDir::new().unwrap();
        let paths = SensorPaths::with_base_dir(temp.path().to_path_buf());
        let mut settings = with_snapshot(&paths);

        let err = handle_budget_command(
            &paths,
            &mut settings,
            BudgetCommands::SetCreditLimit(amount("Checking", "500")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, YnabError::Validation(_)));

        let err = handle_budget_command(
            &paths,
            &mut settings,
            BudgetCommands::SetApr(amount("Savings Jar", "5")),
        )
        .await
        .unwrap_err();
        assert!(err.is_not_found());
        assert!(!UserValuesStore::new(&paths, "Home").path().exists());
    }

    #[tokio::test]
    async fn test_set_value_needs_snapshot() {
        let temp = TempDir::new().unwrap();
        let paths = SensorPaths::with_base_dir(temp.path().to_path_buf());
        let mut settings = Settings::default();
        settings.upsert_budget(BudgetConfig::new(BudgetId::new("b1"), "Home", "t"));

        let err = handle_budget_command(
            &paths,
            &mut settings,
            BudgetCommands::SetCreditLimit(amount("old-card", "100")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, YnabError::Config(_)));
    }
}
