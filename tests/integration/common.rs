//! Shared test fixtures

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use trawl::crawler::{FetchMode, PageSource};
use trawl::{CrawlConfig, FetchError};

/// In-memory page source that records every fetch
///
/// Unknown URLs answer with a 404 status error.
#[derive(Default)]
pub struct StaticSource {
    pages: HashMap<String, String>,
    fetches: Mutex<Vec<(String, FetchMode)>>,
}

impl StaticSource {
    pub fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, body)| (url.to_string(), body.to_string()))
                .collect(),
            fetches: Mutex::new(Vec::new()),
        }
    }

    /// Number of times `url` was fetched
    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .iter()
            .filter(|(fetched, _)| fetched == url)
            .count()
    }

    /// Total number of fetches across all URLs
    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }

    /// Mode of the first fetch of `url`
    pub fn mode_of(&self, url: &str) -> Option<FetchMode> {
        self.fetches
            .lock()
            .unwrap()
            .iter()
            .find(|(fetched, _)| fetched == url)
            .map(|(_, mode)| *mode)
    }
}

#[async_trait]
impl PageSource for StaticSource {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<String, FetchError> {
        self.fetches.lock().unwrap().push((url.to_string(), mode));
        tokio::task::yield_now().await;

        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

/// Default configuration with the given depth and thread count
pub fn config(max_depth: u32, threads: usize) -> CrawlConfig {
    CrawlConfig {
        max_depth,
        threads,
        ..CrawlConfig::default()
    }
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
