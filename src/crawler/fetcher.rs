//! Fetch orchestration
//!
//! This module fetches one URL end to end:
//! - politeness jitter before every request
//! - plain HTTP first, through the lazily built [`Transport`]
//! - anti-bot detection on the response body
//! - browser rendering through the [`Renderer`] when challenged
//! - capped exponential backoff between attempts
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | Transport failure / timeout | Retry after backoff |
//! | 5xx or 429 status, not a challenge | Retry after backoff |
//! | Other 4xx status, not a challenge | Fail immediately |
//! | Challenge page, render fails | Retry the whole attempt after backoff |
//! | Retries exhausted | `failed: <cause>` result |
//!
//! A fetch never returns an error: every outcome is a [`ScrapeResult`].

use crate::config::{RetryPolicy, ScrapeConfig, ThrottleDelay};
use crate::crawler::clock::Clock;
use crate::crawler::detector::is_challenge;
use crate::crawler::parser::Extractor;
use crate::crawler::renderer::Renderer;
use crate::crawler::transport::Transport;
use crate::state::{FetchState, ScrapeResult};
use crate::{FetchError, TransportError};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Walks one URL through the fetch state machine, logging each transition
struct FetchTrace<'a> {
    url: &'a str,
    state: FetchState,
}

impl<'a> FetchTrace<'a> {
    fn new(url: &'a str) -> Self {
        Self {
            url,
            state: FetchState::Idle,
        }
    }

    fn advance(&mut self, next: FetchState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal fetch transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!("{}: {} -> {}", self.url, self.state, next);
        self.state = next;
    }
}

/// Owns the HTTP transport and the browser session for a run
pub struct Fetcher {
    transport: Box<dyn Transport>,
    renderer: Box<dyn Renderer>,
    extractor: Extractor,
    clock: Arc<dyn Clock>,
    retry_policy: RetryPolicy,
    throttle_delay: ThrottleDelay,
    attempts: u64,
}

impl Fetcher {
    pub fn new(
        config: &ScrapeConfig,
        transport: Box<dyn Transport>,
        renderer: Box<dyn Renderer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transport,
            renderer,
            extractor: Extractor::new(&config.extraction_rules),
            clock,
            retry_policy: config.retry_policy,
            throttle_delay: config.throttle_delay,
            attempts: 0,
        }
    }

    /// Total attempts made over the fetcher's lifetime, retries included
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Fetches `url`, retrying per the retry policy
    ///
    /// Makes at most `max_retries + 1` attempts. Never fails: exhausted
    /// retries produce a `failed: <cause>` result carrying the last error.
    pub async fn fetch(&mut self, url: &str) -> ScrapeResult {
        let base_url = match Url::parse(url) {
            Ok(base_url) => base_url,
            Err(e) => {
                tracing::warn!("Skipping unparseable URL {}: {}", url, e);
                return ScrapeResult::failed(url, format!("invalid URL: {}", e), self.timestamp());
            }
        };

        let mut trace = FetchTrace::new(url);
        let mut attempt: u32 = 0;

        loop {
            self.attempts += 1;

            match self.attempt(url, &base_url, &mut trace).await {
                Ok(result) => {
                    trace.advance(FetchState::Succeeded);
                    return result;
                }
                Err(error) if !error.is_retryable() => {
                    trace.advance(FetchState::Failed);
                    tracing::error!("Failed {}: {}", url, error);
                    return ScrapeResult::failed(url, error.to_string(), self.timestamp());
                }
                Err(error) if attempt < self.retry_policy.max_retries => {
                    let backoff = self.retry_policy.backoff(attempt);
                    tracing::warn!(
                        "Attempt {} for {} failed: {}; retrying in {:?}",
                        attempt + 1,
                        url,
                        error,
                        backoff
                    );
                    self.clock.sleep(backoff).await;
                    attempt += 1;
                }
                Err(error) => {
                    trace.advance(FetchState::Failed);
                    let error = FetchError::ExhaustedRetries {
                        attempts: attempt + 1,
                        source: Box::new(error),
                    };
                    tracing::error!("Failed {} after {} retries: {}", url, attempt, error);
                    return ScrapeResult::failed(url, error.root_cause().to_string(), self.timestamp());
                }
            }
        }
    }

    /// One pass through Sending and, when challenged, RenderingFallback
    async fn attempt(
        &mut self,
        url: &str,
        base_url: &Url,
        trace: &mut FetchTrace<'_>,
    ) -> Result<ScrapeResult, FetchError> {
        self.clock.sleep(self.jitter()).await;

        trace.advance(FetchState::Sending);
        let page = match self.transport.get(url).await {
            Ok(page) => page,
            Err(e) => {
                trace.advance(FetchState::Errored);
                return Err(e.into());
            }
        };

        if is_challenge(&page.body) {
            trace.advance(FetchState::ChallengeDetected);
            tracing::warn!("Challenge page detected at {}, switching to browser", url);

            trace.advance(FetchState::RenderingFallback);
            let rendered = match self.renderer.render(url).await {
                Ok(rendered) => rendered,
                Err(e) => {
                    trace.advance(FetchState::Errored);
                    return Err(e.into());
                }
            };

            let data = self.extractor.extract(&rendered, base_url);
            return Ok(ScrapeResult::bypassed(url, data, self.timestamp()));
        }

        if !page.is_success() {
            trace.advance(FetchState::Errored);
            return Err(TransportError::Status {
                status: page.status,
            }
            .into());
        }

        let data = self.extractor.extract(&page.body, base_url);
        Ok(ScrapeResult::success(url, data, page.body, self.timestamp()))
    }

    /// Releases the HTTP client and the browser session
    pub async fn close(&mut self) {
        self.transport.close().await;
        self.renderer.close().await;
    }

    fn jitter(&self) -> Duration {
        let ThrottleDelay { min, max } = self.throttle_delay;
        if max <= min {
            return Duration::from_secs_f64(min.max(0.0));
        }
        Duration::from_secs_f64(rand::thread_rng().gen_range(min..=max))
    }

    fn timestamp(&self) -> f64 {
        self.clock.now().as_secs_f64()
    }
}
