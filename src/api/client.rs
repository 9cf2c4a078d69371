//! YNAB REST client with rate limiting.
//!
//! Provides typed access to the budget endpoints the poller needs. Requests
//! are throttled client-side with the governor crate and counted against
//! YNAB's hourly request budget, which clients sharing a token share.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::rate::TokenQuota;
use super::types::{
    AccountsData, BudgetsData, CategoriesData, Envelope, ErrorBody, MonthData, RawAccount,
    RawBudgetSummary, RawCategoryGroup, RawMonth, RawTransaction, TransactionsData,
};
use super::BudgetSource;
use crate::error::{YnabError, YnabResult};
use crate::models::{BudgetId, RateLimitInfo};

/// Default YNAB API base URL.
pub const YNAB_API_URL: &str = "https://api.ynab.com/v1";

/// YNAB REST client.
pub struct YnabClient {
    /// HTTP client
    http: Client,
    /// Base URL for API
    base_url: String,
    /// Personal access token
    token: String,
    /// Throttle and hourly usage counter for the token
    quota: TokenQuota,
}

impl YnabClient {
    /// Creates a client for one access token.
    ///
    /// `timeout` bounds every individual request.
    pub fn new(token: impl Into<String>, timeout: Duration) -> YnabResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ynab-sensors/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| YnabError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: YNAB_API_URL.to_string(),
            token: token.into(),
            quota: TokenQuota::default(),
        })
    }

    /// Draws from `quota` instead of a quota of its own.
    ///
    /// Clients for budgets on the same token must share one.
    #[must_use]
    pub fn with_quota(mut self, quota: TokenQuota) -> Self {
        self.quota = quota;
        self
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Waits for rate limit and makes an authenticated GET request.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> YnabResult<T> {
        self.quota.acquire().await;

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_for_status(status, &text, path));
        }

        let envelope = response.json::<Envelope<T>>().await?;
        Ok(envelope.data)
    }
}

/// Map a non-success response to the error taxonomy
fn error_for_status(status: StatusCode, body: &str, path: &str) -> YnabError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| {
            if b.error.detail.is_empty() {
                b.error.name
            } else {
                b.error.detail
            }
        })
        .unwrap_or_else(|_| body.chars().take(200).collect());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => YnabError::Auth(message),
        StatusCode::NOT_FOUND => YnabError::NotFound {
            entity_type: "Resource",
            identifier: path.to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => YnabError::RateLimited(message),
        s if s.is_server_error() => YnabError::ServiceUnavailable {
            status: s.as_u16(),
            message,
        },
        s => YnabError::Api {
            status: s.as_u16(),
            message,
        },
    }
}

/// Budget paths use the budget id, so a 404 there means a missing budget
fn budget_scoped(err: YnabError, budget: &BudgetId) -> YnabError {
    if err.is_not_found() {
        YnabError::budget_not_found(budget.as_str())
    } else {
        err
    }
}

#[async_trait]
impl BudgetSource for YnabClient {
    async fn list_budgets(&self) -> YnabResult<Vec<RawBudgetSummary>> {
        let data: BudgetsData = self.get("/budgets").await?;
        Ok(data.budgets)
    }

    async fn accounts(&self, budget: &BudgetId) -> YnabResult<Vec<RawAccount>> {
        let data: AccountsData = self
            .get(&format!("/budgets/{}/accounts", budget))
            .await
            .map_err(|e| budget_scoped(e, budget))?;
        Ok(data.accounts)
    }

    async fn categories(&self, budget: &BudgetId) -> YnabResult<Vec<RawCategoryGroup>> {
        let data: CategoriesData = self
            .get(&format!("/budgets/{}/categories", budget))
            .await
            .map_err(|e| budget_scoped(e, budget))?;
        Ok(data.category_groups)
    }

    async fn month(&self, budget: &BudgetId, month: NaiveDate) -> YnabResult<RawMonth> {
        let data: MonthData = self
            .get(&format!(
                "/budgets/{}/months/{}",
                budget,
                month.format("%Y-%m-%d")
            ))
            .await
            .map_err(|e| budget_scoped(e, budget))?;
        Ok(data.month)
    }

    async fn transactions(&self, budget: &BudgetId) -> YnabResult<Vec<RawTransaction>> {
        let data: TransactionsData = self
            .get(&format!("/budgets/{}/transactions", budget))
            .await
            .map_err(|e| budget_scoped(e, budget))?;
        Ok(data.transactions)
    }

    fn rate_limit(&self) -> RateLimitInfo {
        self.quota.info()
    }
}
