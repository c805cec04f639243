//! JSON export: a pretty-printed array of full result records

use crate::output::traits::{OutputResult, ResultExporter};
use crate::state::ScrapeResult;
use std::io::Write;

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonExporter;

impl ResultExporter for JsonExporter {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn write_results(&self, results: &[ScrapeResult], writer: &mut dyn Write) -> OutputResult<()> {
        serde_json::to_writer_pretty(writer, results)?;
        Ok(())
    }
}
