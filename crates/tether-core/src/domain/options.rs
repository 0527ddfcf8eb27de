//! Per-job options.
//!
//! Durations are persisted as whole seconds in decimal text. Nothing in this
//! crate enforces them; expiry and execution limits belong to whoever
//! maintains the broker.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOptions {
    /// Explicit identifier. Generated when `None`.
    pub job_id: Option<String>,

    /// Human-readable description.
    pub description: String,

    /// Maximum execution time.
    pub job_timeout: Duration,

    /// Lifetime of the whole record. Zero leaves retention to the maintainer.
    pub ttl: Duration,

    /// How long a result is kept after success.
    pub result_ttl: Duration,

    /// How long an error is kept after failure.
    pub failure_ttl: Duration,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            job_id: None,
            description: String::new(),
            job_timeout: Duration::from_secs(180),
            ttl: Duration::ZERO,
            result_ttl: Duration::from_secs(500),
            failure_ttl: Duration::from_secs(365 * 24 * 60 * 60),
        }
    }
}

impl JobOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_job_timeout(mut self, timeout: Duration) -> Self {
        self.job_timeout = timeout;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_result_ttl(mut self, ttl: Duration) -> Self {
        self.result_ttl = ttl;
        self
    }

    pub fn with_failure_ttl(mut self, ttl: Duration) -> Self {
        self.failure_ttl = ttl;
        self
    }
}

/// Render a duration the way it is stored in the broker.
pub(crate) fn secs_to_field(d: Duration) -> String {
    d.as_secs().to_string()
}

/// Parse a stored duration. `None` when absent or not a non-negative integer.
pub(crate) fn secs_from_field(raw: Option<&String>) -> Option<Duration> {
    raw?.trim().parse::<u64>().ok().map(Duration::from_secs)
}
