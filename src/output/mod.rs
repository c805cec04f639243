//! Output module for exporting crawl results
//!
//! This module handles:
//! - Writing the result list as JSON or CSV
//! - Computing and printing end-of-run statistics

mod csv_export;
mod json_export;
pub mod stats;
mod traits;

pub use csv_export::CsvExporter;
pub use json_export::JsonExporter;
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{OutputError, OutputResult, ResultExporter};

use crate::state::ScrapeResult;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn exporter(self) -> Box<dyn ResultExporter> {
        match self {
            Self::Json => Box::new(JsonExporter),
            Self::Csv => Box::new(CsvExporter),
        }
    }

    pub fn extension(self) -> &'static str {
        self.exporter().extension()
    }

    /// Default export location, `data/exports/results.<ext>`
    pub fn default_path(self) -> PathBuf {
        Path::new("data")
            .join("exports")
            .join(format!("results.{}", self.extension()))
    }
}

/// Writes `results` to `path` in the given format
///
/// Parent directories are created as needed. Returns the path written, or
/// None when the format skips empty result lists.
pub fn export_results(
    results: &[ScrapeResult],
    format: ExportFormat,
    path: &Path,
) -> OutputResult<Option<PathBuf>> {
    let exporter = format.exporter();

    if results.is_empty() && !exporter.writes_empty() {
        tracing::info!("No results to export");
        return Ok(None);
    }

    let io_error = |source: std::io::Error| OutputError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    exporter.write_results(results, &mut writer)?;
    writer.flush().map_err(io_error)?;

    tracing::info!("Exported {} results to {}", results.len(), path.display());
    Ok(Some(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_paths() {
        assert_eq!(
            ExportFormat::Json.default_path(),
            PathBuf::from("data/exports/results.json")
        );
        assert_eq!(
            ExportFormat::Csv.default_path(),
            PathBuf::from("data/exports/results.csv")
        );
    }

    #[test]
    fn test_export_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.json");
        let results = vec![ScrapeResult::bypassed("https://a.com/", BTreeMap::new(), 1.0)];

        let written = export_results(&results, ExportFormat::Json, &path).unwrap();

        assert_eq!(written.as_deref(), Some(path.as_path()));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"status\": \"bypassed\""));
    }

    #[test]
    fn test_empty_csv_export_writes_no_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        let written = export_results(&[], ExportFormat::Csv, &path).unwrap();

        assert!(written.is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_duplicate_emails_exported_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let mut data = BTreeMap::new();
        data.insert("emails".to_string(), vec!["a@x.com".to_string()]);
        let results = vec![ScrapeResult::bypassed("https://a.com/", data, 1.0)];

        export_results(&results, ExportFormat::Csv, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("a@x.com").count(), 1);
    }
}
