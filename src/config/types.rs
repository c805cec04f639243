use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Main configuration structure for a crawl run
///
/// Loaded once at startup and read-only for the rest of the run.
#[derive(Debug, Clone, Deserialize)]
pub struct ScrapeConfig {
    /// User-agent strings to rotate through (must be non-empty)
    #[serde(rename = "user-agents")]
    pub user_agents: Vec<String>,

    /// Named proxy services (name -> address)
    #[serde(rename = "proxy-pool", default)]
    pub proxy_pool: BTreeMap<String, String>,

    /// Retry and backoff policy for failed fetches
    #[serde(rename = "retry-policy")]
    pub retry_policy: RetryPolicy,

    /// Extra fields to extract (field name -> CSS selector)
    #[serde(rename = "extraction-rules", default)]
    pub extraction_rules: BTreeMap<String, String>,

    /// Maximum number of links admitted to the frontier per page
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Politeness jitter bounds in seconds, `[min, max]`
    #[serde(rename = "throttle-delay", default = "default_throttle_delay")]
    pub throttle_delay: ThrottleDelay,

    /// Upper bound for a single HTTP request, in seconds
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Run the browser fallback without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,
}

/// Retry behaviour for a single URL
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts is `max_retries + 1`
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Backoff before the first retry, in seconds
    #[serde(rename = "base-delay")]
    pub base_delay: f64,

    /// Ceiling for any single backoff, in seconds
    #[serde(rename = "max-delay")]
    pub max_delay: f64,
}

impl RetryPolicy {
    /// Backoff to wait after the given (zero-based) failed attempt
    ///
    /// `min(base_delay * 2^attempt, max_delay)`, saturating for large attempts.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2f64.powi(attempt.min(1023) as i32);
        let secs = (self.base_delay * factor).min(self.max_delay);
        Duration::from_secs_f64(secs.max(0.0))
    }
}

/// Inclusive range of seconds to sleep before each request
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "(f64, f64)")]
pub struct ThrottleDelay {
    pub min: f64,
    pub max: f64,
}

impl From<(f64, f64)> for ThrottleDelay {
    fn from((min, max): (f64, f64)) -> Self {
        Self { min, max }
    }
}

fn default_concurrency() -> usize {
    5
}

fn default_throttle_delay() -> ThrottleDelay {
    ThrottleDelay { min: 0.5, max: 2.0 }
}

fn default_request_timeout() -> u64 {
    30
}

fn default_headless() -> bool {
    true
}
