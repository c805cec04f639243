//! Configuration module for the crawler
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use stalwart_crawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config/config.toml")).unwrap();
//! println!("Retries per URL: {}", config.retry_policy.max_retries);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{RetryPolicy, ScrapeConfig, ThrottleDelay};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
