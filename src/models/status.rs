//! Poll status model
//!
//! Tracks the outcome of refresh attempts for one budget. This is the only
//! piece of state that carries history between refreshes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ErrorKind, YnabError};

/// Lifecycle of the refresh cycle for one budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RefreshState {
    #[default]
    Idle,
    Fetching,
    Published,
    Failed,
}

/// Connection health as seen from the last request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Unknown,
    Connected,
    RateLimited,
    Unauthorized,
    ServiceUnavailable,
    ApiError,
}

impl ConnectionStatus {
    /// Derive the connection status from a refresh failure
    pub fn from_error(err: &YnabError) -> Self {
        match err {
            YnabError::RateLimited(_) => Self::RateLimited,
            YnabError::Auth(_) => Self::Unauthorized,
            YnabError::ServiceUnavailable { .. } => Self::ServiceUnavailable,
            _ => Self::ApiError,
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Connected => write!(f, "Connected"),
            Self::RateLimited => write!(f, "Rate Limited"),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::ServiceUnavailable => write!(f, "Service Unavailable"),
            Self::ApiError => write!(f, "API Error"),
        }
    }
}

/// A recorded refresh failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollError {
    pub kind: ErrorKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Request accounting against the API's hourly budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RateLimitInfo {
    pub requests_made_total: u64,
    pub requests_this_hour: u32,
    pub estimated_remaining: u32,
    pub resets_at: Option<DateTime<Utc>>,
}

/// Status of the poller for one budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PollStatus {
    pub state: RefreshState,

    pub connection: ConnectionStatus,

    /// Time of the last refresh that published a snapshot
    pub last_success: Option<DateTime<Utc>>,

    /// Last failure; cleared by the next success
    pub last_error: Option<PollError>,

    pub consecutive_failures: u32,

    #[serde(default)]
    pub rate_limit: RateLimitInfo,
}

impl PollStatus {
    /// Record a successful refresh
    pub fn record_success(&mut self, at: DateTime<Utc>) {
        self.state = RefreshState::Published;
        self.connection = ConnectionStatus::Connected;
        self.last_success = Some(at);
        self.last_error = None;
        self.consecutive_failures = 0;
    }

    /// Record a failed refresh
    pub fn record_failure(&mut self, err: &YnabError, at: DateTime<Utc>) {
        self.state = RefreshState::Failed;
        self.connection = ConnectionStatus::from_error(err);
        self.last_error = Some(PollError {
            kind: err.kind(),
            message: err.to_string(),
            at,
        });
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }

    /// Whether sensors should still be reported as available
    ///
    /// A threshold of zero never marks them unavailable.
    pub fn is_available(&self, unavailable_after: u32) -> bool {
        unavailable_after == 0 || self.consecutive_failures < unavailable_after
    }
}
