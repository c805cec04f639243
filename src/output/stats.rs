//! Statistics computed from a crawl's results
//!
//! This module provides functionality for summarizing and displaying the
//! outcome of a crawl run.

use crate::state::{ScrapeResult, ScrapeStatus};

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Total number of URLs attempted
    pub total_pages: usize,

    /// Pages fetched over plain HTTP
    pub successes: usize,

    /// Pages recovered through the browser fallback
    pub bypassed: usize,

    /// Pages that exhausted their retries
    pub failures: usize,

    /// Links discovered across all pages, before the branching cap
    pub links_discovered: usize,
}

impl CrawlStatistics {
    pub fn from_results(results: &[ScrapeResult]) -> Self {
        let mut stats = Self {
            total_pages: results.len(),
            ..Default::default()
        };

        for result in results {
            match result.status {
                ScrapeStatus::Success => stats.successes += 1,
                ScrapeStatus::Bypassed => stats.bypassed += 1,
                ScrapeStatus::Failed(_) => stats.failures += 1,
            }
            stats.links_discovered += result.links().len();
        }

        stats
    }

    /// Percentage of attempted pages that produced data
    pub fn success_rate(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        ((self.successes + self.bypassed) as f64 / self.total_pages as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages attempted: {}", stats.total_pages);
    println!("  Succeeded: {}", stats.successes);
    println!("  Bypassed: {}", stats.bypassed);
    println!("  Failed: {}", stats.failures);
    println!("  Links discovered: {}", stats.links_discovered);
    println!();

    println!(
        "Success Rate: {:.1}% ({} / {} pages produced data)",
        stats.success_rate(),
        stats.successes + stats.bypassed,
        stats.total_pages
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LINKS_FIELD;
    use std::collections::BTreeMap;

    #[test]
    fn test_statistics_from_results() {
        let mut data = BTreeMap::new();
        data.insert(
            LINKS_FIELD.to_string(),
            vec!["https://a.com/1".to_string(), "https://a.com/2".to_string()],
        );

        let results = vec![
            ScrapeResult::success("https://a.com/", data.clone(), String::new(), 1.0),
            ScrapeResult::bypassed("https://a.com/1", data, 2.0),
            ScrapeResult::failed("https://a.com/2", "timeout", 3.0),
            ScrapeResult::failed("https://a.com/3", "timeout", 4.0),
        ];

        let stats = CrawlStatistics::from_results(&results);
        assert_eq!(
            stats,
            CrawlStatistics {
                total_pages: 4,
                successes: 1,
                bypassed: 1,
                failures: 2,
                links_discovered: 4,
            }
        );
        assert!((stats.success_rate() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_success_rate_zero_pages() {
        let stats = CrawlStatistics::from_results(&[]);
        assert_eq!(stats.success_rate(), 0.0);
    }
}
