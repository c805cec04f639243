use crate::state::ScrapeStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extracted fields: field name -> deduplicated values
pub type ExtractedData = BTreeMap<String, Vec<String>>;

/// Name of the field the frontier reads candidate URLs from
pub const LINKS_FIELD: &str = "links";

/// Record of one attempted URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResult {
    /// The URL that was attempted
    pub url: String,

    /// Extracted fields (empty on failure)
    pub data: ExtractedData,

    /// Response body, only kept on the plain HTTP success path
    pub raw_content: Option<String>,

    /// Seconds since the crawl clock's origin
    pub timestamp: f64,

    pub status: ScrapeStatus,
}

impl ScrapeResult {
    pub fn success(url: &str, data: ExtractedData, body: String, timestamp: f64) -> Self {
        Self {
            url: url.to_string(),
            data,
            raw_content: Some(body),
            timestamp,
            status: ScrapeStatus::Success,
        }
    }

    pub fn bypassed(url: &str, data: ExtractedData, timestamp: f64) -> Self {
        Self {
            url: url.to_string(),
            data,
            raw_content: None,
            timestamp,
            status: ScrapeStatus::Bypassed,
        }
    }

    pub fn failed(url: &str, reason: impl Into<String>, timestamp: f64) -> Self {
        Self {
            url: url.to_string(),
            data: ExtractedData::new(),
            raw_content: None,
            timestamp,
            status: ScrapeStatus::Failed(reason.into()),
        }
    }

    /// Links discovered on the page, in extraction order
    pub fn links(&self) -> &[String] {
        self.data
            .get(LINKS_FIELD)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_keeps_body() {
        let result = ScrapeResult::success("https://a.test", ExtractedData::new(), "<p/>".into(), 1.5);
        assert_eq!(result.raw_content.as_deref(), Some("<p/>"));
        assert_eq!(result.status, ScrapeStatus::Success);
    }

    #[test]
    fn test_failed_has_no_data() {
        let result = ScrapeResult::failed("https://a.test", "timeout", 0.0);
        assert!(result.data.is_empty());
        assert!(result.raw_content.is_none());
        assert_eq!(result.status.to_string(), "failed: timeout");
    }

    #[test]
    fn test_links_accessor() {
        let mut data = ExtractedData::new();
        data.insert(LINKS_FIELD.to_string(), vec!["https://a.test/x".to_string()]);
        let result = ScrapeResult::bypassed("https://a.test", data, 0.0);

        assert_eq!(result.links(), &["https://a.test/x".to_string()]);
        assert!(result.raw_content.is_none());
        assert!(ScrapeResult::failed("u", "e", 0.0).links().is_empty());
    }
}
