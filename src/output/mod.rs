//! Output module for finalizing traversal results
//!
//! This module handles:
//! - Assembling the final result of a crawl or collect call from the traversal state
//! - The `Report` returned to callers
//! - Printing reports for the command line

mod assemble;
pub mod stats;

pub use assemble::{assemble_collect, assemble_crawl, finalize_items, finalize_pages};
pub use stats::{write_items, write_pages, write_search_hits};

use crate::crawler::SearchHit;
use crate::PageError;

/// Result of one crawl or collect call
///
/// `error` holds the first page error recorded during the traversal. It gives
/// partial visibility into failures; `result` is complete either way.
#[derive(Debug)]
pub struct Report<T> {
    /// Captured pages (crawl) or collected items (collect)
    pub result: T,

    /// First recorded page error, if any
    pub error: Option<PageError>,

    /// Number of page errors recorded
    pub error_count: usize,

    /// Visited registry size before excluded URLs were removed
    pub pages_visited: usize,

    /// Search term hits, in discovery order
    pub search_hits: Vec<SearchHit>,
}

impl<T> Report<T> {
    /// Returns true if no page error was recorded
    pub fn is_clean(&self) -> bool {
        self.error.is_none()
    }
}
