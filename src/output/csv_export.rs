//! CSV export
//!
//! One row per result. The fixed columns `url`, `status`, `timestamp` come
//! first, followed by the sorted union of every extracted field name. List
//! values are joined with `", "`; a field missing from a row is left empty.

use crate::output::traits::{OutputResult, ResultExporter};
use crate::state::ScrapeResult;
use std::collections::BTreeSet;
use std::io::Write;

const FIXED_COLUMNS: [&str; 3] = ["url", "status", "timestamp"];
const VALUE_SEPARATOR: &str = ", ";

#[derive(Debug, Default, Clone, Copy)]
pub struct CsvExporter;

impl CsvExporter {
    /// Sorted union of the data fields across all results
    fn field_columns(results: &[ScrapeResult]) -> Vec<&str> {
        results
            .iter()
            .flat_map(|result| result.data.keys().map(String::as_str))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter(|field| !FIXED_COLUMNS.contains(field))
            .collect()
    }
}

impl ResultExporter for CsvExporter {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn writes_empty(&self) -> bool {
        false
    }

    fn write_results(&self, results: &[ScrapeResult], writer: &mut dyn Write) -> OutputResult<()> {
        if results.is_empty() {
            return Ok(());
        }

        let fields = Self::field_columns(results);
        let mut csv = csv::Writer::from_writer(writer);

        let header = FIXED_COLUMNS.iter().copied().chain(fields.iter().copied());
        csv.write_record(header)?;

        for result in results {
            let mut row = vec![
                result.url.clone(),
                result.status.to_string(),
                result.timestamp.to_string(),
            ];
            row.extend(fields.iter().map(|field| {
                result
                    .data
                    .get(*field)
                    .map(|values| values.join(VALUE_SEPARATOR))
                    .unwrap_or_default()
            }));
            csv.write_record(&row)?;
        }

        csv.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}
