//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Plain HTTP fetching with identity rotation and retry/backoff
//! - Anti-bot challenge detection and headless browser fallback
//! - HTML extraction of contacts, links and configured fields
//! - Breadth-first frontier management with durable checkpoints

pub mod clock;
mod coordinator;
pub mod detector;
mod fetcher;
mod frontier;
pub mod parser;
pub mod renderer;
pub mod transport;

pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::Coordinator;
pub use detector::is_challenge;
pub use fetcher::Fetcher;
pub use frontier::Frontier;
pub use parser::{extract, Extractor};
pub use renderer::{ChromeRenderer, Renderer};
pub use transport::{HttpPage, HttpTransport, Transport};

use crate::config::{validate, ScrapeConfig};
use crate::rotation::ProxyPool;
use crate::state::ScrapeResult;
use crate::storage::{open_checkpoint, CheckpointStore};
use crate::CrawlError;
use std::path::Path;
use std::sync::Arc;
use url::Url;

/// Wires configuration, identity pools, transport, renderer and checkpoint
/// together for one crawl
pub struct CrawlEngine {
    config: ScrapeConfig,
    proxies: ProxyPool,
    config_hash: Option<String>,
    clock: Arc<dyn Clock>,
}

impl CrawlEngine {
    /// Creates an engine for a validated configuration
    ///
    /// The proxy pool starts with the config's `proxy-pool` addresses.
    pub fn new(config: ScrapeConfig) -> Result<Self, CrawlError> {
        validate(&config)?;
        let proxies = ProxyPool::from_sources(&config.proxy_pool, Vec::new());

        Ok(Self {
            config,
            proxies,
            config_hash: None,
            clock: Arc::new(SystemClock::new()),
        })
    }

    /// Adds proxy addresses from a proxy file to the pool
    pub fn with_proxy_file_entries(mut self, entries: Vec<String>) -> Self {
        self.proxies = ProxyPool::from_sources(&self.config.proxy_pool, entries);
        self
    }

    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    pub fn proxies(&self) -> &ProxyPool {
        &self.proxies
    }

    /// Crawls from `seed` over real HTTP and Chrome, checkpointing to `checkpoint_path`
    pub async fn run(&self, seed: &str, checkpoint_path: &Path) -> Result<Vec<ScrapeResult>, CrawlError> {
        let transport = HttpTransport::new(&self.config, self.proxies.clone());
        let renderer = ChromeRenderer::new(&self.config, self.proxies.clone());
        self.run_with(
            seed,
            open_checkpoint(checkpoint_path),
            Box::new(transport),
            Box::new(renderer),
        )
        .await
    }

    /// Crawls from `seed` with caller-supplied transport, renderer and store
    pub async fn run_with<S: CheckpointStore>(
        &self,
        seed: &str,
        store: S,
        transport: Box<dyn Transport>,
        renderer: Box<dyn Renderer>,
    ) -> Result<Vec<ScrapeResult>, CrawlError> {
        // Validated only; the seed is fetched and recorded exactly as given
        Url::parse(seed).map_err(|source| CrawlError::InvalidSeed {
            url: seed.to_string(),
            source,
        })?;

        let fetcher = Fetcher::new(&self.config, transport, renderer, self.clock.clone());
        let mut coordinator = Coordinator::new(fetcher, store, self.config.concurrency);
        if let Some(hash) = &self.config_hash {
            coordinator = coordinator.with_config_hash(hash.clone());
        }

        coordinator.run(seed).await
    }
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration and seed URL
/// 2. Restore progress from the checkpoint, if one exists
/// 3. Fetch pages breadth-first, falling back to a browser on challenges
/// 4. Persist the checkpoint after every page
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - Absolute URL to start from
/// * `checkpoint_path` - Where progress is saved between runs
///
/// # Returns
///
/// * `Ok(results)` - One result per URL attempted in this run
/// * `Err(CrawlError)` - Invalid setup or checkpoint failure
pub async fn crawl(
    config: ScrapeConfig,
    seed: &str,
    checkpoint_path: &Path,
) -> Result<Vec<ScrapeResult>, CrawlError> {
    CrawlEngine::new(config)?.run(seed, checkpoint_path).await
}
