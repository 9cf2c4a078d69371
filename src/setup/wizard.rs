//! Setup wizard orchestration
//!
//! Coordinates the multi-step setup of one budget instance: token, budget,
//! options and selections. Every prompt can be answered up front through
//! [`SetupArgs`], which makes the wizard usable from scripts.

use std::sync::Arc;

use crate::api::{BudgetSource, YnabClient};
use crate::config::{BudgetConfig, BudgetOptions, SensorPaths, Settings};
use crate::error::{YnabError, YnabResult};

use super::steps::{BudgetSetupStep, OptionsSetupStep, SelectionSetupStep, TokenSetupStep};

/// Answers supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct SetupArgs {
    pub token: Option<String>,
    pub budget: Option<String>,
    pub instance: Option<String>,
    pub currency: Option<String>,
    pub interval: Option<u32>,
    pub include_closed: bool,
    pub include_hidden: bool,
    pub accept_terms: bool,
    /// Take defaults for everything not given instead of prompting
    pub use_defaults: bool,
}

/// The setup wizard
pub struct SetupWizard {
    paths: SensorPaths,
    base_url: Option<String>,
}

impl SetupWizard {
    /// Create a new setup wizard
    pub fn new(paths: SensorPaths) -> Self {
        Self {
            paths,
            base_url: None,
        }
    }

    /// Talk to a different API endpoint (useful for testing)
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Run the setup wizard and save the resulting budget
    pub async fn run(&self, settings: &mut Settings, args: SetupArgs) -> YnabResult<BudgetConfig> {
        println!();
        println!("===========================================");
        println!("  ynab-sensors Setup");
        println!("===========================================");
        println!();
        println!("Press Ctrl+C at any time to cancel.");

        let token = TokenSetupStep::run(args.token.clone(), args.accept_terms)?;

        let mut client = YnabClient::new(token.clone(), settings.request_timeout())?;
        if let Some(url) = &self.base_url {
            client = client.with_base_url(url.clone());
        }
        let source: Arc<dyn BudgetSource> = Arc::new(client);

        let budget = configure_budget(source.as_ref(), token, &args).await?;

        if settings.find_budget(&budget.instance_name).is_some() {
            println!("Replacing existing instance '{}'.", budget.instance_name);
        }
        settings.upsert_budget(budget.clone());
        settings.save(&self.paths)?;

        tracing::info!(
            instance = %budget.instance_name,
            budget = %budget.budget_id.short(),
            "Budget configured"
        );

        println!();
        println!("Setup complete!");
        println!();
        println!("  Instance:  {}", budget.instance_name);
        println!("  Budget:    {}", budget.budget_name);
        println!("  Currency:  {}", budget.currency);
        println!("  Interval:  {} minutes", budget.options.update_interval_minutes);
        println!();
        println!("Run 'ynab-sensors run' to start polling.");

        Ok(budget)
    }
}

/// Resolve all setup answers against the API into a budget config
///
/// A rejected token aborts setup with an `Auth` error.
pub async fn configure_budget(
    source: &dyn BudgetSource,
    token: String,
    args: &SetupArgs,
) -> YnabResult<BudgetConfig> {
    let budgets = source.list_budgets().await.map_err(|e| {
        if e.is_auth() {
            YnabError::Auth("The access token was rejected by YNAB".into())
        } else {
            e
        }
    })?;

    let chosen = BudgetSetupStep::run(
        &budgets,
        args.budget.as_deref(),
        args.instance.clone(),
        args.currency.clone(),
        args.use_defaults,
    )?;

    let options = if args.use_defaults || args.interval.is_some() {
        BudgetOptions {
            update_interval_minutes: args
                .interval
                .unwrap_or(BudgetOptions::default().update_interval_minutes),
            include_closed_accounts: args.include_closed,
            include_hidden_categories: args.include_hidden,
        }
    } else {
        OptionsSetupStep::run()?
    };

    let budget_id = chosen.budget.id.clone();
    let (accounts, groups) =
        tokio::try_join!(source.accounts(&budget_id), source.categories(&budget_id))?;
    let selection = SelectionSetupStep::run(&accounts, &groups, &options, args.use_defaults)?;

    let mut budget = BudgetConfig::new(budget_id, chosen.budget.name.clone(), token);
    budget.instance_name = chosen.instance_name;
    budget.currency = chosen.currency;
    budget.accepted_terms = true;
    budget.options = options;
    budget.selected_accounts = selection.accounts;
    budget.selected_categories = selection.categories;
    budget.validate()?;

    Ok(budget)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Selection;
    use crate::models::CategoryId;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_api() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/budgets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "budgets": [
                    { "id": "b1", "name": "Household", "currency_format": { "iso_code": "GBP" } }
                ]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/budgets/b1/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "accounts": [
                    { "id": "a1", "name": "Checking", "type": "checking" },
                    { "id": "a2", "name": "Old", "type": "savings", "closed": true }
                ]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/budgets/b1/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": { "category_groups": [
                    { "id": "g1", "name": "Needs", "categories": [
                        { "id": "c1", "name": "Groceries" },
                        { "id": "c2", "name": "Hidden", "hidden": true }
                    ]}
                ]}
            })))
            .mount(&server)
            .await;

        server
    }

    fn client(server: &MockServer) -> YnabClient {
        YnabClient::new("token", std::time::Duration::from_secs(5))
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_configure_with_defaults() {
        let server = mock_api().await;
        let args = SetupArgs {
            use_defaults: true,
            accept_terms: true,
            ..SetupArgs::default()
        };

        let budget = configure_budget(&client(&server), "token".into(), &args)
            .await
            .unwrap();

        assert_eq!(budget.budget_id.as_str(), "b1");
        assert_eq!(budget.instance_name, "Household");
        assert_eq!(budget.currency, "GBP");
        assert_eq!(budget.options, BudgetOptions::default());
        assert_eq!(
            budget.selected_categories,
            Selection::Only(vec![CategoryId::new("c1")])
        );
        match &budget.selected_accounts {
            Selection::Only(ids) => assert_eq!(ids.len(), 1),
            Selection::All => panic!("expected explicit account ids"),
        }
    }

    #[tokio::test]
    async fn test_configure_with_include_flags() {
        let server = mock_api().await;
        let args = SetupArgs {
            budget: Some("Household".into()),
            instance: Some("Home Budget".into()),
            interval: Some(30),
            include_closed: true,
            include_hidden: true,
            use_defaults: true,
            ..SetupArgs::default()
        };

        let budget = configure_budget(&client(&server), "token".into(), &args)
            .await
            .unwrap();

        assert_eq!(budget.sanitized_instance_name(), "Home_Budget");
        assert_eq!(budget.options.update_interval_minutes, 30);
        assert!(budget.selected_categories.contains(&CategoryId::new("c2")));
    }

    #[tokio::test]
    async fn test_rejected_token_aborts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/budgets"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let args = SetupArgs {
            use_defaults: true,
            ..SetupArgs::default()
        };
        let err = configure_budget(&client(&server), "token".into(), &args)
            .await
            .unwrap_err();
        assert!(err.is_auth());
    }
}
