//! Page sources
//!
//! This module defines the seam between the traversal engine and the network:
//! - `PageSource`, the trait the engine fetches markup through
//! - `WebSource`, the production source backed by `reqwest` for plain fetches
//!   and a headless browser for rendered ones
//! - HTTP client construction and error classification

use crate::config::CrawlConfig;
use crate::crawler::browser::BrowserRenderer;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// How a page should be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Raw response body from a plain HTTP GET
    Plain,

    /// DOM serialized by a headless browser after scripts ran
    Rendered,
}

/// Anything that can turn a URL into page markup
///
/// The engine holds its source as `Arc<dyn PageSource>` and calls it from many
/// tasks at once, so implementations must be thread safe.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetches the markup of `url`
    ///
    /// Non-success statuses and transport failures are errors; the engine
    /// records them and treats the page as content-less.
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<String, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent header to send
/// * `timeout` - Total request timeout
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use trawl::crawler::build_http_client;
///
/// let client = build_http_client("trawl/1.0", Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches `url` with a plain GET and returns the body
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | body text |
/// | any other status | `FetchError::Status` |
/// | client timeout | `FetchError::Timeout` |
/// | transport or body error | `FetchError::Http` |
pub async fn fetch_url(client: &Client, url: &str, timeout: Duration) -> Result<String, FetchError> {
    let classify = |source: reqwest::Error| {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                after: timeout,
            }
        } else {
            FetchError::Http {
                url: url.to_string(),
                source,
            }
        }
    };

    let response = client.get(url).send().await.map_err(classify)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(classify)
}

/// The production page source
///
/// Plain fetches go through a shared `reqwest` client. Rendered fetches go
/// through a headless browser that is only launched if one is requested.
pub struct WebSource {
    client: Client,
    renderer: BrowserRenderer,
    timeout: Duration,
}

impl WebSource {
    /// Creates a source using the user agent and timeout from `config`
    pub fn new(config: &CrawlConfig) -> Result<Self, reqwest::Error> {
        let timeout = config.fetch_timeout();
        let client = build_http_client(&config.user_agent, timeout)?;

        Ok(Self {
            client,
            renderer: BrowserRenderer::new(&config.user_agent, timeout),
            timeout,
        })
    }
}

#[async_trait]
impl PageSource for WebSource {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<String, FetchError> {
        match mode {
            FetchMode::Plain => fetch_url(&self.client, url, self.timeout).await,
            FetchMode::Rendered => self.renderer.render(url).await,
        }
    }
}
