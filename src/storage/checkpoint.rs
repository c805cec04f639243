//! JSON checkpoint file
//!
//! ## Layout
//!
//! ```text
//! {
//!   "visited": ["https://example.com/", ...],   // sorted
//!   "pending": ["https://example.com/next"],    // queue order
//!   "config_hash": "…",
//!   "updated_at": "2024-01-01T00:00:00Z"
//! }
//! ```
//!
//! Only `visited` is required when reading, so a bare `{"visited": [...]}`
//! file from an older run still resumes.

use crate::storage::traits::{CheckpointStore, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Durable crawl progress
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckpointState {
    pub visited: Vec<String>,

    #[serde(default)]
    pub pending: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CheckpointState {
    /// Builds a checkpoint from the in-memory frontier
    pub fn capture<'a>(
        visited: &HashSet<String>,
        pending: impl IntoIterator<Item = &'a String>,
        config_hash: Option<&str>,
    ) -> Self {
        let mut visited: Vec<String> = visited.iter().cloned().collect();
        visited.sort();

        Self {
            visited,
            pending: pending.into_iter().cloned().collect(),
            config_hash: config_hash.map(str::to_string),
            updated_at: Some(Utc::now()),
        }
    }

    pub fn visited_set(&self) -> HashSet<String> {
        self.visited.iter().cloned().collect()
    }
}

/// Checkpoint stored as a single JSON file
#[derive(Debug, Clone)]
pub struct JsonCheckpointStore {
    path: PathBuf,
}

impl JsonCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl CheckpointStore for JsonCheckpointStore {
    fn load(&self) -> StorageResult<Option<CheckpointState>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let state = serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;

        Ok(Some(state))
    }

    fn save(&mut self, state: &CheckpointState) -> StorageResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let bytes = serde_json::to_vec(state)?;

        // Write to temp, then rename over the target
        let tmp = self.tmp_path();
        let mut file = File::create(&tmp).map_err(|e| self.io_error(e))?;
        file.write_all(&bytes).map_err(|e| self.io_error(e))?;
        file.sync_all().map_err(|e| self.io_error(e))?;
        drop(file);

        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }

    fn clear(&mut self) -> StorageResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
