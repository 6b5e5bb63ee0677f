//! Per-client configuration: identifier, timeouts, TLS policy and dispatch behavior.

use std::time::Duration;

use serde::Deserialize;

use crate::courts::{RELAXED_TLS_COURTS, UNSUPPORTED_COURTS};
use crate::user_agent::DEFAULT_USER_AGENT;

/// What the dispatcher does when one day's request fails in transit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayFailurePolicy {
    /// Fail the whole dispatch on the first failed day.
    #[default]
    Abort,
    /// Record the failed day and keep going; the batch is marked incomplete.
    Tolerate,
}

/// Settings shared by every request a [`crate::Client`] makes.
///
/// Nothing here is mutated after construction; each dispatch builds its own
/// HTTP session from these values.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `User-Agent` header sent on every request.
    pub user_agent: String,
    /// Timeout for the token page fetch.
    pub token_timeout_secs: u64,
    /// Timeout for each per-day report submission. Report generation is slow.
    pub report_timeout_secs: u64,
    /// Courts fetched without certificate verification.
    pub relaxed_tls_courts: Vec<String>,
    /// Courts with no written opinions report; queries return nothing.
    pub unsupported_courts: Vec<String>,
    /// Behavior when a single day fails in transit.
    pub day_failure: DayFailurePolicy,
    /// Upper bound on days in flight at once. `1` means sequential.
    pub max_concurrent_days: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            token_timeout_secs: 60,
            report_timeout_secs: 300,
            relaxed_tls_courts: RELAXED_TLS_COURTS.iter().map(|c| c.to_string()).collect(),
            unsupported_courts: UNSUPPORTED_COURTS.iter().map(|c| c.to_string()).collect(),
            day_failure: DayFailurePolicy::Abort,
            max_concurrent_days: 1,
        }
    }
}

impl ClientConfig {
    /// Whether certificates should be verified when talking to `court_id`.
    pub fn verify_tls(&self, court_id: &str) -> bool {
        !self.relaxed_tls_courts.iter().any(|c| c == court_id)
    }

    /// Whether `court_id` has no report to query.
    pub fn is_unsupported(&self, court_id: &str) -> bool {
        self.unsupported_courts.iter().any(|c| c == court_id)
    }

    pub fn token_timeout(&self) -> Duration {
        Duration::from_secs(self.token_timeout_secs)
    }

    pub fn report_timeout(&self) -> Duration {
        Duration::from_secs(self.report_timeout_secs)
    }

    pub fn with_day_failure(mut self, policy: DayFailurePolicy) -> Self {
        self.day_failure = policy;
        self
    }

    /// Sets the number of days queried concurrently. Values below 1 are treated as 1.
    pub fn with_max_concurrent_days(mut self, n: usize) -> Self {
        self.max_concurrent_days = n.max(1);
        self
    }
}
