//! Settings file and environment overrides.
//!
//! ```toml
//! [client]
//! user_agent = "my-scraper"
//! report_timeout_secs = 300
//! day_failure = "tolerate"
//! max_concurrent_days = 2
//!
//! [retry]
//! max_retries = 3
//! ```

use std::path::Path;
use std::time::Duration;

use pacer_api::ClientConfig;
use rand::Rng;
use serde::Deserialize;

use crate::error::FreeDocumentsError;

/// Backoff for retrying a whole query on a fresh session.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 2000,
            max_delay_ms: 30000,
        }
    }
}

impl RetryConfig {
    /// A config that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Applies `PACER_RETRY_MAX`, `PACER_RETRY_BASE_MS` and `PACER_RETRY_MAX_MS`.
    pub fn with_env_overrides(self) -> Self {
        self.apply_env(|key| std::env::var(key).ok())
    }

    fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("PACER_RETRY_MAX").and_then(|v| v.parse().ok()) {
            self.max_retries = v;
        }
        if let Some(v) = lookup("PACER_RETRY_BASE_MS").and_then(|v| v.parse().ok()) {
            self.base_delay_ms = v;
        }
        if let Some(v) = lookup("PACER_RETRY_MAX_MS").and_then(|v| v.parse().ok()) {
            self.max_delay_ms = v;
        }
        self
    }

    /// Exponential delay for the given 1-based attempt, capped and jittered by +/-20%.
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let shift = (attempt.saturating_sub(1)).min(30) as u32;
        let exp = 1u64 << shift;
        let base = self
            .base_delay_ms
            .saturating_mul(exp)
            .min(self.max_delay_ms);
        let jitter = rand::thread_rng().gen_range(0.8..1.2);
        Duration::from_millis((base as f64 * jitter) as u64)
    }
}

/// Everything needed to build a [`crate::FreeDocumentsClient`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub client: ClientConfig,
    pub retry: RetryConfig,
}

impl Settings {
    pub fn from_toml_str(content: &str) -> Result<Self, FreeDocumentsError> {
        toml::from_str(content)
            .map_err(|e| FreeDocumentsError::Config(format!("invalid settings: {}", e)))
    }

    /// Reads settings from `path` when given, else uses defaults, then applies
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, FreeDocumentsError> {
        let mut settings = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    FreeDocumentsError::Config(format!(
                        "cannot read settings file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Self::from_toml_str(&content)?
            }
            None => Self::default(),
        };
        settings.retry = settings.retry.with_env_overrides();
        Ok(settings)
    }
}
