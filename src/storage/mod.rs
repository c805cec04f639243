//! Storage module for persisting crawl progress
//!
//! This module handles the durable checkpoint that makes a crawl resumable:
//! - The `CheckpointStore` trait every backend implements
//! - The JSON file backend with write-then-rename replacement

mod checkpoint;
mod traits;

pub use checkpoint::{CheckpointState, JsonCheckpointStore};
pub use traits::{CheckpointStore, StorageError, StorageResult};

use std::path::Path;

/// Opens the checkpoint store for the given file path
pub fn open_checkpoint(path: &Path) -> JsonCheckpointStore {
    JsonCheckpointStore::new(path)
}
