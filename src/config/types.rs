use serde::Deserialize;
use std::time::Duration;

/// Default user agent sent by the plain HTTP page source
pub const DEFAULT_USER_AGENT: &str = concat!("trawl/", env!("CARGO_PKG_VERSION"));

/// Complete configuration for one traversal
///
/// The configuration is immutable for the duration of a crawl or collect call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlConfig {
    /// Maximum number of concurrently running page tasks
    pub threads: usize,

    /// Per-fetch timeout in seconds
    pub timeout: u64,

    /// Maximum depth to crawl; seeds are depth 1
    pub max_depth: u32,

    /// Maximum number of visited pages, 0 means unlimited
    pub max_links: usize,

    /// Pages at depth <= js_depth are fetched through the headless browser
    pub js_depth: u32,

    /// Suppress per-page warnings
    pub silent: bool,

    /// User agent for plain HTTP fetches
    pub user_agent: String,

    /// Literal terms to search every fetched page for
    pub search_any: Vec<String>,

    /// Seed URLs, usually given on the command line instead
    pub urls: Vec<String>,

    /// Scope, filtering and collection settings
    pub selectors: Selectors,
}

/// Scope, filter and collection selectors
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Selectors {
    /// Element ids that put a subtree in scope (OR-combined with classes)
    pub ids: Vec<String>,

    /// Element classes that put a subtree in scope (OR-combined with ids)
    pub classes: Vec<String>,

    /// Host suffixes that are allowed; empty allows every host
    pub domains: Vec<String>,

    /// Host suffixes that are never followed; checked before `domains`
    pub exclude_domains: Vec<String>,

    /// Substrings of the link URL that make it eligible
    pub url_patterns: Vec<String>,

    /// Substrings of the anchor text that make a link eligible
    pub link_text_patterns: Vec<String>,

    /// A page body must contain one of these to be kept
    pub content_patterns: Vec<String>,

    /// URLs that are never fetched and never reported
    pub excluded_urls: Vec<String>,

    /// Collection types for collect mode (presets or file extensions)
    pub collections: Vec<String>,
}

impl CrawlConfig {
    /// Per-fetch timeout as a `Duration`
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            timeout: 10,
            max_depth: 1,
            max_links: 0,
            js_depth: 0,
            silent: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            search_any: Vec::new(),
            urls: Vec::new(),
            selectors: Selectors::default(),
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            classes: Vec::new(),
            domains: Vec::new(),
            exclude_domains: Vec::new(),
            url_patterns: Vec::new(),
            link_text_patterns: Vec::new(),
            content_patterns: Vec::new(),
            excluded_urls: Vec::new(),
            collections: vec!["images".to_string()],
        }
    }
}
