//! Scheduler for bounding traversal concurrency and depth
//!
//! This module handles:
//! - Global concurrency limiting via an owned-permit semaphore
//! - The depth bound for spawning page tasks
//! - Choosing between plain and rendered fetches by depth

use crate::config::CrawlConfig;
use crate::crawler::FetchMode;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Concurrency budget and depth rules for one traversal
///
/// A permit is taken before a page task is spawned and travels into the task,
/// so at most `threads` pages are being fetched and extracted at once.
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Global semaphore for limiting concurrent page tasks
    permits: Arc<Semaphore>,

    /// Deepest depth that is still visited; seeds are depth 1
    max_depth: u32,

    /// Deepest depth that is fetched through the browser
    js_depth: u32,
}

impl Scheduler {
    /// Creates a scheduler from the configured limits
    pub fn new(config: &CrawlConfig) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(config.threads.max(1))),
            max_depth: config.max_depth,
            js_depth: config.js_depth,
        }
    }

    /// Waits for a free permit
    ///
    /// Returns `None` only if the semaphore was closed, which a traversal never
    /// does while tasks are running.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.permits).acquire_owned().await.ok()
    }

    /// Number of permits currently free
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Returns true if a page at `depth` may be visited
    pub fn within_depth(&self, depth: u32) -> bool {
        depth <= self.max_depth
    }

    /// Picks the fetch mode for a page at `depth`
    pub fn fetch_mode(&self, depth: u32) -> FetchMode {
        if depth <= self.js_depth {
            FetchMode::Rendered
        } else {
            FetchMode::Plain
        }
    }
}
