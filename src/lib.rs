//! Stalwart: a resumable, challenge-aware web crawler
//!
//! This crate implements a single-worker crawler that walks a site breadth-first
//! from a seed URL, extracts contact identifiers and outbound links, falls back to
//! a headless browser when a page answers with an anti-bot challenge, and
//! checkpoints its visited set after every page so an interrupted crawl resumes
//! without re-fetching anything.

pub mod config;
pub mod crawler;
pub mod output;
pub mod rotation;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for crawl runs
///
/// Only setup and persistence problems surface here. Failures of a single URL
/// are recorded as [`ScrapeStatus::Failed`] results instead.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Checkpoint error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Export error: {0}")]
    Export(#[from] output::OutputError),

    #[error("Invalid seed URL '{url}': {source}")]
    InvalidSeed {
        url: String,
        source: ::url::ParseError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Failed to read proxy file {path}: {source}")]
    ProxyFile {
        path: String,
        source: std::io::Error,
    },
}

/// Network or protocol failure on the plain HTTP path
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("no identity available: {0}")]
    Identity(String),

    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },
}

/// Failure inside the browser rendering fallback
#[derive(Debug, Error)]
pub enum RenderingError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("tab creation failed: {0}")]
    Tab(String),

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("rendered content unavailable: {0}")]
    Content(String),

    #[error("rendering task aborted: {0}")]
    Task(String),
}

/// Failure of one fetch attempt, or of all of them
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Rendering(#[from] RenderingError),

    #[error("gave up after {attempts} attempts: {source}")]
    ExhaustedRetries {
        attempts: u32,
        source: Box<FetchError>,
    },
}

impl FetchError {
    /// Whether another attempt could succeed
    ///
    /// Client errors other than 429 are permanent; everything else is retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(TransportError::Status { status }) => {
                !(400..500).contains(status) || *status == 429
            }
            Self::ExhaustedRetries { .. } => false,
            _ => true,
        }
    }

    /// Returns the error that caused the last attempt to fail
    pub fn root_cause(&self) -> &FetchError {
        match self {
            Self::ExhaustedRetries { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::ScrapeConfig;
pub use crawler::{crawl, CrawlEngine};
pub use state::{FetchState, ScrapeResult, ScrapeStatus};
