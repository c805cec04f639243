use crate::config::types::{RetryPolicy, ScrapeConfig, ThrottleDelay};
use crate::ConfigError;
use std::collections::BTreeMap;
use url::Url;

/// Validates the entire configuration
///
/// Runs before any network activity so a bad config never starts a crawl.
pub fn validate(config: &ScrapeConfig) -> Result<(), ConfigError> {
    validate_user_agents(&config.user_agents)?;
    validate_retry_policy(&config.retry_policy)?;
    validate_throttle_delay(&config.throttle_delay)?;
    validate_proxy_pool(&config.proxy_pool)?;

    if config.concurrency < 1 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be >= 1, got {}",
            config.concurrency
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(
            "request-timeout must be at least 1 second".to_string(),
        ));
    }

    Ok(())
}

fn validate_user_agents(user_agents: &[String]) -> Result<(), ConfigError> {
    if user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user-agents cannot be empty".to_string(),
        ));
    }

    if let Some(position) = user_agents.iter().position(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "user-agents[{}] is blank",
            position
        )));
    }

    Ok(())
}

fn validate_retry_policy(policy: &RetryPolicy) -> Result<(), ConfigError> {
    validate_seconds("retry-policy.base-delay", policy.base_delay)?;
    validate_seconds("retry-policy.max-delay", policy.max_delay)?;
    Ok(())
}

fn validate_throttle_delay(delay: &ThrottleDelay) -> Result<(), ConfigError> {
    validate_seconds("throttle-delay min", delay.min)?;
    validate_seconds("throttle-delay max", delay.max)?;

    if delay.min > delay.max {
        return Err(ConfigError::Validation(format!(
            "throttle-delay min ({}) must not exceed max ({})",
            delay.min, delay.max
        )));
    }

    Ok(())
}

fn validate_proxy_pool(pool: &BTreeMap<String, String>) -> Result<(), ConfigError> {
    for (name, address) in pool {
        Url::parse(address).map_err(|e| {
            ConfigError::InvalidUrl(format!("proxy '{}' has invalid address '{}': {}", name, address, e))
        })?;
    }
    Ok(())
}

/// A duration in seconds must be finite and non-negative
fn validate_seconds(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{} must be a non-negative number of seconds, got {}",
            field, value
        )));
    }
    Ok(())
}
