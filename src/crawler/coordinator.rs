//! Crawler coordinator - main crawl orchestration logic
//!
//! This module owns the crawl loop:
//! - Restoring the visited set and pending queue from the checkpoint
//! - Handing URLs to the fetcher one at a time, breadth-first
//! - Admitting at most `concurrency` discovered links per page
//! - Persisting the checkpoint after every processed URL
//! - Releasing the HTTP client and browser on every exit path

use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::Frontier;
use crate::state::ScrapeResult;
use crate::storage::{CheckpointState, CheckpointStore};
use crate::CrawlError;
use std::collections::HashSet;
use std::time::Instant;

/// Main crawler coordinator structure
pub struct Coordinator<S: CheckpointStore> {
    fetcher: Fetcher,
    store: S,
    /// Branching cap: links admitted per expanded page
    concurrency: usize,
    config_hash: Option<String>,
}

impl<S: CheckpointStore> Coordinator<S> {
    pub fn new(fetcher: Fetcher, store: S, concurrency: usize) -> Self {
        Self {
            fetcher,
            store,
            concurrency,
            config_hash: None,
        }
    }

    /// Records the config hash in every checkpoint written by this run
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Crawls breadth-first from `seed` until the frontier is empty
    ///
    /// Returns one result per URL attempted in this run, in processing order.
    /// URLs already in the checkpoint's visited set are never fetched again.
    /// The fetcher is closed whether the loop finishes or fails.
    pub async fn run(&mut self, seed: &str) -> Result<Vec<ScrapeResult>, CrawlError> {
        let outcome = self.crawl_frontier(seed).await;
        self.fetcher.close().await;
        outcome
    }

    async fn crawl_frontier(&mut self, seed: &str) -> Result<Vec<ScrapeResult>, CrawlError> {
        let (visited, pending) = self.restore()?;
        let mut frontier = Frontier::new(visited);
        frontier.push(seed);
        frontier.extend(pending);

        tracing::info!(
            "Starting crawl at {} ({} already visited, {} queued)",
            seed,
            frontier.visited().len(),
            frontier.queued()
        );

        let start_time = Instant::now();
        let mut results = Vec::new();

        while let Some(url) = frontier.next_unvisited() {
            tracing::debug!("Processing URL: {}", url);

            let result = self.fetcher.fetch(&url).await;

            if result.status.is_expandable() {
                let admitted: Vec<String> = result
                    .links()
                    .iter()
                    .take(self.concurrency)
                    .cloned()
                    .collect();
                tracing::debug!(
                    "{}: {} links found, {} admitted",
                    url,
                    result.links().len(),
                    admitted.len()
                );
                frontier.extend(admitted);
            }

            tracing::info!("{} -> {}", url, result.status);
            results.push(result);

            self.persist(&frontier)?;

            if results.len() % 10 == 0 {
                let elapsed = start_time.elapsed();
                let rate = results.len() as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
                tracing::info!(
                    "Progress: {} pages processed, {} in frontier, {:.2} pages/sec",
                    results.len(),
                    frontier.queued(),
                    rate
                );
            }
        }

        tracing::info!(
            "Crawl completed: {} pages processed in {:?}",
            results.len(),
            start_time.elapsed()
        );

        Ok(results)
    }

    /// Loads the visited set and pending queue from the checkpoint, if any
    fn restore(&self) -> Result<(HashSet<String>, Vec<String>), CrawlError> {
        let Some(checkpoint) = self.store.load()? else {
            tracing::info!("No checkpoint at {}, starting fresh", self.store.location());
            return Ok((HashSet::new(), Vec::new()));
        };

        if let (Some(saved), Some(current)) = (&checkpoint.config_hash, &self.config_hash) {
            if saved != current {
                tracing::warn!(
                    "Configuration changed since checkpoint {} was written; resuming anyway",
                    self.store.location()
                );
            }
        }

        tracing::info!(
            "Resuming from {}: {} visited, {} pending",
            self.store.location(),
            checkpoint.visited.len(),
            checkpoint.pending.len()
        );

        Ok((checkpoint.visited_set(), checkpoint.pending))
    }

    fn persist(&mut self, frontier: &Frontier) -> Result<(), CrawlError> {
        let state = CheckpointState::capture(
            frontier.visited(),
            frontier.pending(),
            self.config_hash.as_deref(),
        );
        self.store.save(&state)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RetryPolicy, ScrapeConfig, ThrottleDelay};
    use crate::crawler::clock::ManualClock;
    use crate::crawler::renderer::Renderer;
    use crate::crawler::transport::{HttpPage, Transport};
    use crate::state::ScrapeStatus;
    use crate::storage::{StorageError, StorageResult};
    use crate::{RenderingError, TransportError};
    use async_trait::async_trait;
    use std::collections::{BTreeMap, HashMap};
    use std::sync::{Arc, Mutex};

    /// Serves a fixed site map; unknown URLs answer 404
    struct SiteTransport {
        pages: HashMap<String, String>,
        requested: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Transport for SiteTransport {
        async fn get(&mut self, url: &str) -> Result<HttpPage, TransportError> {
            self.requested.lock().unwrap().push(url.to_string());
            Ok(match self.pages.get(url) {
                Some(body) => HttpPage {
                    status: 200,
                    body: body.clone(),
                },
                None => HttpPage {
                    status: 404,
                    body: String::new(),
                },
            })
        }

        async fn close(&mut self) {}
    }

    struct NoBrowser {
        closed: Arc<Mutex<bool>>,
    }

    #[async_trait]
    impl Renderer for NoBrowser {
        async fn render(&mut self, _url: &str) -> Result<String, RenderingError> {
            Err(RenderingError::Launch("no browser in tests".to_string()))
        }

        async fn close(&mut self) {
            *self.closed.lock().unwrap() = true;
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        saved: Option<CheckpointState>,
        saves: usize,
        fail_saves: bool,
    }

    impl CheckpointStore for MemoryStore {
        fn load(&self) -> StorageResult<Option<CheckpointState>> {
            Ok(self.saved.clone())
        }

        fn save(&mut self, state: &CheckpointState) -> StorageResult<()> {
            if self.fail_saves {
                return Err(StorageError::Io {
                    path: "memory".to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            self.saves += 1;
            self.saved = Some(state.clone());
            Ok(())
        }

        fn clear(&mut self) -> StorageResult<()> {
            self.saved = None;
            Ok(())
        }

        fn location(&self) -> String {
            "memory".to_string()
        }
    }

    fn create_test_config(concurrency: usize) -> ScrapeConfig {
        ScrapeConfig {
            user_agents: vec!["UA1".to_string()],
            proxy_pool: BTreeMap::new(),
            retry_policy: RetryPolicy {
                max_retries: 1,
                base_delay: 0.1,
                max_delay: 1.0,
            },
            extraction_rules: BTreeMap::new(),
            concurrency,
            throttle_delay: ThrottleDelay { min: 0.0, max: 0.0 },
            request_timeout: 30,
            headless: true,
        }
    }

    fn site() -> HashMap<String, String> {
        let mut pages = HashMap::new();
        pages.insert(
            "https://a.com/".to_string(),
            r#"<a href="/1">1</a><a href="/2">2</a><a href="/3">3</a>"#.to_string(),
        );
        pages.insert(
            "https://a.com/1".to_string(),
            r#"<a href="/">home</a><a href="/4">4</a>"#.to_string(),
        );
        pages.insert("https://a.com/2".to_string(), "leaf".to_string());
        pages.insert("https://a.com/3".to_string(), "leaf".to_string());
        pages.insert("https://a.com/4".to_string(), "leaf".to_string());
        pages
    }

    fn coordinator(
        concurrency: usize,
        store: MemoryStore,
    ) -> (Coordinator<MemoryStore>, Arc<Mutex<Vec<String>>>, Arc<Mutex<bool>>) {
        let config = create_test_config(concurrency);
        let requested = Arc::new(Mutex::new(Vec::new()));
        let closed = Arc::new(Mutex::new(false));
        let fetcher = Fetcher::new(
            &config,
            Box::new(SiteTransport {
                pages: site(),
                requested: requested.clone(),
            }),
            Box::new(NoBrowser {
                closed: closed.clone(),
            }),
            Arc::new(ManualClock::new()),
        );
        (
            Coordinator::new(fetcher, store, config.concurrency),
            requested,
            closed,
        )
    }

    fn urls(results: &[ScrapeResult]) -> Vec<&str> {
        results.iter().map(|r| r.url.as_str()).collect()
    }

    #[tokio::test]
    async fn test_breadth_first_order() {
        let (mut coordinator, _, closed) = coordinator(5, MemoryStore::default());

        let results = coordinator.run("https://a.com/").await.unwrap();

        assert_eq!(
            urls(&results),
            vec![
                "https://a.com/",
                "https://a.com/1",
                "https://a.com/2",
                "https://a.com/3",
                "https://a.com/4"
            ]
        );
        assert!(results.iter().all(|r| r.status == ScrapeStatus::Success));
        assert!(*closed.lock().unwrap());
    }

    #[tokio::test]
    async fn test_branching_cap_limits_admitted_links() {
        let (mut coordinator, _, _) = coordinator(1, MemoryStore::default());

        let results = coordinator.run("https://a.com/").await.unwrap();

        // Only the first link of each page is admitted
        assert_eq!(
            urls(&results),
            vec!["https://a.com/", "https://a.com/1"]
        );
    }

    #[tokio::test]
    async fn test_checkpoint_saved_after_every_url() {
        let (mut coordinator, _, _) = coordinator(5, MemoryStore::default());

        let results = coordinator.run("https://a.com/").await.unwrap();

        let store = coordinator.store();
        assert_eq!(store.saves, results.len());
        let saved = store.saved.as_ref().unwrap();
        assert_eq!(saved.visited.len(), 5);
        assert!(saved.pending.is_empty());
    }

    #[tokio::test]
    async fn test_resume_skips_visited_and_drains_pending() {
        let store = MemoryStore {
            saved: Some(CheckpointState {
                visited: vec!["https://a.com/".to_string(), "https://a.com/1".to_string()],
                pending: vec!["https://a.com/4".to_string()],
                config_hash: None,
                updated_at: None,
            }),
            ..Default::default()
        };
        let (mut coordinator, requested, _) = coordinator(5, store);

        let results = coordinator.run("https://a.com/").await.unwrap();

        assert_eq!(urls(&results), vec!["https://a.com/4"]);
        assert_eq!(*requested.lock().unwrap(), vec!["https://a.com/4"]);
    }

    #[tokio::test]
    async fn test_failed_pages_are_not_expanded() {
        let (mut coordinator, requested, _) = coordinator(5, MemoryStore::default());

        let results = coordinator.run("https://a.com/missing").await.unwrap();

        assert_eq!(results.len(), 1);
        assert!(results[0].status.is_failed());
        // A 404 is permanent, so it is requested once
        assert_eq!(requested.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_is_fatal_and_still_closes() {
        let store = MemoryStore {
            fail_saves: true,
            ..Default::default()
        };
        let (mut coordinator, requested, closed) = coordinator(5, store);

        let result = coordinator.run("https://a.com/").await;

        assert!(matches!(result, Err(CrawlError::Storage(_))));
        assert_eq!(requested.lock().unwrap().len(), 1);
        assert!(*closed.lock().unwrap());
    }
}
