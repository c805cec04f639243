//! Exporter trait and error types
//!
//! This module defines the trait interface for result exporters and
//! associated error types.

use crate::state::ScrapeResult;
use std::io::Write;
use thiserror::Error;

/// Errors that can occur during export
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for exporters that serialize a crawl's results
pub trait ResultExporter {
    /// File extension for this format, without the dot
    fn extension(&self) -> &'static str;

    /// Whether an empty result list should still produce a file
    fn writes_empty(&self) -> bool {
        true
    }

    /// Writes every result to `writer`
    fn write_results(&self, results: &[ScrapeResult], writer: &mut dyn Write) -> OutputResult<()>;
}
