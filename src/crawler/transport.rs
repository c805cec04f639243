//! Plain HTTP transport
//!
//! The cheap path of every fetch. The reqwest client is built on first use with
//! a rotated identity and kept for the rest of the run.

use crate::config::ScrapeConfig;
use crate::rotation::{select_identity, Identity, ProxyPool};
use crate::TransportError;
use async_trait::async_trait;
use reqwest::{Client, Proxy};
use std::time::Duration;

/// A fetched response, before any classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpPage {
    /// HTTP status code
    pub status: u16,
    /// Response body decoded as text
    pub body: String,
}

impl HttpPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can GET a URL over plain HTTP
#[async_trait]
pub trait Transport: Send {
    /// Sends one GET request
    ///
    /// Only transport-level failures are errors; any HTTP status is returned
    /// as a page so the caller can inspect challenge bodies on 403/503.
    async fn get(&mut self, url: &str) -> Result<HttpPage, TransportError>;

    /// Releases pooled connections
    async fn close(&mut self);
}

/// Builds an HTTP client with the given identity
///
/// The connection pool keeps up to `concurrency` idle connections per host.
pub fn build_http_client(
    identity: &Identity,
    concurrency: usize,
    timeout: Duration,
) -> Result<Client, TransportError> {
    let mut builder = Client::builder()
        .user_agent(identity.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(concurrency)
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = &identity.proxy {
        builder = builder.proxy(Proxy::all(proxy.as_str()).map_err(TransportError::Client)?);
    }

    builder.build().map_err(TransportError::Client)
}

/// reqwest-backed transport, built lazily
pub struct HttpTransport {
    user_agents: Vec<String>,
    proxies: ProxyPool,
    concurrency: usize,
    timeout: Duration,
    client: Option<Client>,
}

impl HttpTransport {
    pub fn new(config: &ScrapeConfig, proxies: ProxyPool) -> Self {
        Self {
            user_agents: config.user_agents.clone(),
            proxies,
            concurrency: config.concurrency,
            timeout: Duration::from_secs(config.request_timeout),
            client: None,
        }
    }

    /// Returns true once the client has been built
    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    fn client(&mut self) -> Result<&Client, TransportError> {
        let client = match self.client.take() {
            Some(client) => client,
            None => {
                let identity = select_identity(&self.user_agents, &self.proxies)
                    .map_err(|e| TransportError::Identity(e.to_string()))?;
                tracing::debug!(
                    "Building HTTP client (user agent: {}, proxy: {})",
                    identity.user_agent,
                    identity.proxy.as_deref().unwrap_or("none")
                );
                build_http_client(&identity, self.concurrency, self.timeout)?
            }
        };

        Ok(self.client.insert(client))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&mut self, url: &str) -> Result<HttpPage, TransportError> {
        let client = self.client()?;
        let response = client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpPage { status, body })
    }

    async fn close(&mut self) {
        if self.client.take().is_some() {
            tracing::debug!("HTTP client released");
        }
    }
}
