//! Browser rendering fallback
//!
//! Used only after a challenge page is detected. A headless Chrome instance is
//! launched on first use with its own identity draw, and every render opens a
//! fresh tab, waits for navigation, and returns the post-script DOM.
//!
//! `headless_chrome` is a blocking API, so all browser calls run on tokio's
//! blocking pool.

use crate::config::ScrapeConfig;
use crate::rotation::{select_identity, Identity, ProxyPool};
use crate::RenderingError;
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::ffi::OsStr;
use std::time::Duration;

/// Something that can load a URL in a real browser and return the rendered HTML
#[async_trait]
pub trait Renderer: Send {
    async fn render(&mut self, url: &str) -> Result<String, RenderingError>;

    /// Shuts the browser session down
    async fn close(&mut self);
}

/// Launch settings for the browser session
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub headless: bool,
    pub window_size: (u32, u32),
    /// Navigation timeout
    pub timeout: Duration,
}

impl RendererConfig {
    pub fn from_scrape_config(config: &ScrapeConfig) -> Self {
        Self {
            headless: config.headless,
            window_size: (1920, 1080),
            timeout: Duration::from_secs(config.request_timeout),
        }
    }
}

/// headless_chrome-backed renderer, launched lazily
pub struct ChromeRenderer {
    user_agents: Vec<String>,
    proxies: ProxyPool,
    config: RendererConfig,
    browser: Option<Browser>,
}

impl ChromeRenderer {
    pub fn new(config: &ScrapeConfig, proxies: ProxyPool) -> Self {
        Self {
            user_agents: config.user_agents.clone(),
            proxies,
            config: RendererConfig::from_scrape_config(config),
            browser: None,
        }
    }

    /// Returns true once a browser has been launched
    pub fn is_running(&self) -> bool {
        self.browser.is_some()
    }

    async fn browser(&mut self) -> Result<Browser, RenderingError> {
        if let Some(browser) = &self.browser {
            return Ok(browser.clone());
        }

        let identity = select_identity(&self.user_agents, &self.proxies)
            .map_err(|e| RenderingError::Launch(e.to_string()))?;
        tracing::info!(
            "Launching browser session (user agent: {}, proxy: {})",
            identity.user_agent,
            identity.proxy.as_deref().unwrap_or("none")
        );

        let config = self.config.clone();
        let browser = tokio::task::spawn_blocking(move || launch_browser(&identity, &config))
            .await
            .map_err(|e| RenderingError::Task(e.to_string()))??;

        Ok(self.browser.insert(browser).clone())
    }
}

/// Starts Chrome with stealth flags and the given identity
fn launch_browser(identity: &Identity, config: &RendererConfig) -> Result<Browser, RenderingError> {
    let user_agent_arg = format!("--user-agent={}", identity.user_agent);

    let args: Vec<&OsStr> = vec![
        OsStr::new("--disable-blink-features=AutomationControlled"),
        OsStr::new("--disable-dev-shm-usage"),
        OsStr::new("--no-sandbox"),
        OsStr::new(&user_agent_arg),
    ];

    let options = LaunchOptions::default_builder()
        .headless(config.headless)
        .window_size(Some(config.window_size))
        .proxy_server(identity.proxy.as_deref())
        .idle_browser_timeout(Duration::from_secs(300))
        .args(args)
        .build()
        .map_err(|e| RenderingError::Launch(e.to_string()))?;

    Browser::new(options).map_err(|e| RenderingError::Launch(e.to_string()))
}

/// Loads `url` in a new tab and returns the rendered document
fn render_in_tab(browser: &Browser, url: &str, timeout: Duration) -> Result<String, RenderingError> {
    let tab = browser
        .new_tab()
        .map_err(|e| RenderingError::Tab(e.to_string()))?;
    tab.set_default_timeout(timeout);

    let navigation = tab
        .navigate_to(url)
        .and_then(|tab| tab.wait_until_navigated())
        .map_err(|e| RenderingError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })
        .and_then(|tab| {
            tab.get_content()
                .map_err(|e| RenderingError::Content(e.to_string()))
        });

    if let Err(e) = tab.close(false) {
        tracing::debug!("Failed to close tab for {}: {}", url, e);
    }

    navigation
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render(&mut self, url: &str) -> Result<String, RenderingError> {
        let browser = self.browser().await?;
        let timeout = self.config.timeout;
        let target = url.to_string();

        tokio::task::spawn_blocking(move || render_in_tab(&browser, &target, timeout))
            .await
            .map_err(|e| RenderingError::Task(e.to_string()))?
    }

    async fn close(&mut self) {
        if let Some(browser) = self.browser.take() {
            // Dropping the last handle terminates the Chrome process
            release_blocking(browser).await;
        }
    }
}

/// Drops `session` on the blocking pool, logging a shutdown that panics
async fn release_blocking<T: Send + 'static>(session: T) {
    match tokio::task::spawn_blocking(move || drop(session)).await {
        Ok(()) => tracing::debug!("Browser session closed"),
        Err(e) => tracing::debug!("Failed to shut down browser session: {}", e),
    }
}
