//! Storage traits and error types
//!
//! This module defines the trait interface for checkpoint backends and
//! associated error types.

use crate::storage::CheckpointState;
use thiserror::Error;

/// Errors that can occur while reading or writing a checkpoint
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt checkpoint {path}: {message}")]
    Corrupt { path: String, message: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for checkpoint backend implementations
///
/// A crawl has exactly one writer; implementations do not need to guard
/// against concurrent runs sharing a location.
pub trait CheckpointStore {
    /// Loads the last saved checkpoint
    ///
    /// # Returns
    ///
    /// * `Ok(Some(state))` - A checkpoint exists
    /// * `Ok(None)` - Nothing saved yet
    /// * `Err(StorageError)` - The checkpoint exists but could not be read
    fn load(&self) -> StorageResult<Option<CheckpointState>>;

    /// Replaces the saved checkpoint
    ///
    /// After a crash the backend must hold either the previous or the new
    /// checkpoint, never a partial one.
    fn save(&mut self, state: &CheckpointState) -> StorageResult<()>;

    /// Deletes any saved checkpoint
    fn clear(&mut self) -> StorageResult<()>;

    /// Human-readable location, used in log lines
    fn location(&self) -> String;
}
