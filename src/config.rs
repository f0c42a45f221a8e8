//! Batch run configuration.
//!
//! All fields have independent defaults and can be overridden through the
//! builder setters or, for deployments, through environment variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `BATCHPLEX_BATCH_SIZE` | [`BatchConfig::batch_size`] |
//! | `BATCHPLEX_CONCURRENCY` | [`BatchConfig::concurrency`] |
//! | `BATCHPLEX_MAX_RETRIES` | [`BatchConfig::max_retries`] |
//! | `BATCHPLEX_RETRY_DELAY_MS` | [`BatchConfig::retry_delay`] |
//! | `BATCHPLEX_DISPATCH_INTERVAL_MS` | [`BatchConfig::dispatch_interval`] |

use crate::{Error, ErrorContext, Result};
use std::time::Duration;

pub const DEFAULT_BATCH_SIZE: usize = 20;
pub const DEFAULT_CONCURRENCY: usize = 2;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_DISPATCH_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Maximum number of requests per multiplexed call.
    pub batch_size: usize,
    /// Maximum number of groups in flight at once.
    pub concurrency: usize,
    /// Attempt ceiling per group, counting the first attempt.
    pub max_retries: u32,
    /// Backoff used when a rate-limited response carries no usable retry hint.
    pub retry_delay: Duration,
    /// Minimum spacing between two group admissions.
    pub dispatch_interval: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: DEFAULT_CONCURRENCY,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            dispatch_interval: DEFAULT_DISPATCH_INTERVAL,
        }
    }
}

impl BatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with any `BATCHPLEX_*` environment variables.
    ///
    /// Unparsable values are ignored; range checks happen in [`validate`](Self::validate).
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse_u64 = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        if let Some(v) = parse_u64("BATCHPLEX_BATCH_SIZE") {
            self.batch_size = v as usize;
        }
        if let Some(v) = parse_u64("BATCHPLEX_CONCURRENCY") {
            self.concurrency = v as usize;
        }
        if let Some(v) = parse_u64("BATCHPLEX_MAX_RETRIES") {
            self.max_retries = u32::try_from(v).unwrap_or(u32::MAX);
        }
        if let Some(ms) = parse_u64("BATCHPLEX_RETRY_DELAY_MS") {
            self.retry_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = parse_u64("BATCHPLEX_DISPATCH_INTERVAL_MS") {
            self.dispatch_interval = Duration::from_millis(ms);
        }
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n;
        self
    }

    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_dispatch_interval(mut self, interval: Duration) -> Self {
        self.dispatch_interval = interval;
        self
    }

    /// Reject settings that would make a run meaningless before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(invalid("batch_size", "batch size must be a positive integer"));
        }
        if self.concurrency == 0 {
            return Err(invalid("concurrency", "concurrency must be a positive integer"));
        }
        if self.max_retries == 0 {
            return Err(invalid(
                "max_retries",
                "max retries must allow at least one attempt",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, msg: &str) -> Error {
    Error::configuration_with_context(
        msg,
        ErrorContext::new()
            .with_field_path(field)
            .with_details("expected a value >= 1, got 0")
            .with_source("batch_config"),
    )
}
