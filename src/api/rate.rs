//! Request accounting against YNAB's hourly request budget
//!
//! YNAB allows 200 requests per rolling hour per access token. The tracker
//! keeps the timestamps of the requests made in the last hour so the poll
//! status can report usage and the time the oldest request falls out.
//!
//! Budgets polled with the same token draw from one [`TokenQuota`], handed
//! out by a [`QuotaRegistry`].

use chrono::{DateTime, Duration, Utc};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::models::RateLimitInfo;

/// Requests allowed per rolling hour
pub const HOURLY_REQUEST_LIMIT: u32 = 200;

#[derive(Debug, Default)]
struct Window {
    total: u64,
    recent: VecDeque<DateTime<Utc>>,
}

impl Window {
    fn prune(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::hours(1);
        while self.recent.front().is_some_and(|t| *t <= cutoff) {
            self.recent.pop_front();
        }
    }
}

/// Sliding one-hour request counter
#[derive(Debug)]
pub struct RequestTracker {
    limit: u32,
    window: Mutex<Window>,
}

impl Default for RequestTracker {
    fn default() -> Self {
        Self::new(HOURLY_REQUEST_LIMIT)
    }
}

impl RequestTracker {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            window: Mutex::new(Window::default()),
        }
    }

    /// Count one request made at `now`
    pub fn record(&self, now: DateTime<Utc>) {
        let mut window = self.window.lock().unwrap_or_else(|e| e.into_inner());
        window.prune(now);
        window.total += 1;
        window.recent.push_back(now);
    }

    /// Usage as of `now`
    pub fn info(&self, now: DateTime<Utc>) -> RateLimitInfo {
        let mut window = self.window.lock().unwrap_or_else(|e| e.into_inner());
        window.prune(now);

        let this_hour = u32::try_from(window.recent.len()).unwrap_or(u32::MAX);
        RateLimitInfo {
            requests_made_total: window.total,
            requests_this_hour: this_hour,
            estimated_remaining: self.limit.saturating_sub(this_hour),
            resets_at: window.recent.front().map(|t| *t + Duration::hours(1)),
        }
    }
}

/// Throttle and usage counter for one access token
///
/// Clones share the same limiter and tracker.
#[derive(Clone)]
pub struct TokenQuota {
    limiter: Arc<DefaultDirectRateLimiter>,
    tracker: Arc<RequestTracker>,
}

impl Default for TokenQuota {
    fn default() -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(Quota::per_hour(nonzero!(200u32)))),
            tracker: Arc::new(RequestTracker::default()),
        }
    }
}

impl TokenQuota {
    /// Wait for a free slot, then count the request
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
        self.tracker.record(Utc::now());
    }

    pub fn info(&self) -> RateLimitInfo {
        self.tracker.info(Utc::now())
    }

    /// Returns true if both handles count against the same quota
    pub fn shares_with(&self, other: &TokenQuota) -> bool {
        Arc::ptr_eq(&self.tracker, &other.tracker)
    }
}

/// One [`TokenQuota`] per distinct access token
#[derive(Default)]
pub struct QuotaRegistry {
    by_token: HashMap<String, TokenQuota>,
}

impl QuotaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quota_for(&mut self, token: &str) -> TokenQuota {
        self.by_token.entry(token.to_string()).or_default().clone()
    }

    /// Number of distinct tokens seen
    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }
}
