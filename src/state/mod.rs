//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `FetchState`: the states a single fetch walks through (sending, challenged, rendering, ...)
//! - `ScrapeStatus`: the final outcome recorded for an attempted URL
//! - `ScrapeResult`: the immutable record produced for every attempted URL

mod fetch_state;
mod scrape_result;
mod scrape_status;

// Re-export main types
pub use fetch_state::FetchState;
pub use scrape_result::{ExtractedData, ScrapeResult, LINKS_FIELD};
pub use scrape_status::ScrapeStatus;
