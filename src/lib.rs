//! Trawl: a concurrent recursive link-graph crawler
//!
//! This crate walks the graph of linked web pages reachable from a set of seed
//! URLs, bounded by depth and page budgets, and either captures every page
//! ("crawl") or collects matching item URLs such as images or documents
//! ("collect").

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use std::time::Duration;
use thiserror::Error;

/// Main error type for Trawl operations
#[derive(Debug, Error)]
pub enum TrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Browser install failed: {0}")]
    Install(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// These are always fatal and are raised before any page is fetched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid pattern for collection type '{name}': {source}")]
    InvalidCollection { name: String, source: regex::Error },
}

/// A failure to obtain markup for a single page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error fetching {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout after {after:?} for {url}")]
    Timeout { url: String, after: Duration },

    #[error("Browser error for {url}: {message}")]
    Browser { url: String, message: String },
}

impl FetchError {
    /// The URL whose fetch failed
    pub fn url(&self) -> &str {
        match self {
            Self::Http { url, .. }
            | Self::Status { url, .. }
            | Self::Timeout { url, .. }
            | Self::Browser { url, .. } => url,
        }
    }
}

/// An entry in the traversal error log
///
/// Page errors never abort a traversal; they are recorded and the first one is
/// surfaced alongside the otherwise complete result.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Traversal task for {url} did not complete: {message}")]
    Task { url: String, message: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Trawl operations
pub type Result<T> = std::result::Result<T, TrawlError>;

// Re-export commonly used types
pub use config::{CrawlConfig, Selectors};
pub use crawler::{Crawler, FetchMode, PageSource, WebSource};
pub use output::Report;
pub use url::{normalize_url, FilterPolicy};
