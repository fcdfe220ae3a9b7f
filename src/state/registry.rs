use crate::crawler::SearchHit;
use crate::PageError;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Outcome of trying to claim a URL for fetching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// The URL was inserted; the caller owns its fetch
    Claimed,

    /// The URL is already visited, in flight, or excluded
    AlreadyVisited,

    /// The visited-page budget is used up
    BudgetExhausted,
}

/// Mutable state of one traversal
///
/// The visited map doubles as the dedup set and the in-flight marker: a URL is
/// inserted with an empty payload before its fetch starts and the payload is
/// filled in once the page is processed.
#[derive(Debug, Default)]
pub struct TraversalState {
    visited: HashMap<String, String>,
    items: Vec<String>,
    errors: Vec<PageError>,
    search_hits: Vec<SearchHit>,
}

impl TraversalState {
    /// Creates a state with `excluded` already marked as visited
    pub fn with_excluded<I>(excluded: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let visited = excluded
            .into_iter()
            .map(|url| (url, String::new()))
            .collect();

        Self {
            visited,
            ..Self::default()
        }
    }

    /// Atomically claims `url` for fetching
    ///
    /// A `max_links` of 0 means unlimited. Excluded URLs count against the
    /// budget because they occupy the visited map.
    pub fn claim(&mut self, url: &str, max_links: usize) -> Claim {
        if self.visited.contains_key(url) {
            return Claim::AlreadyVisited;
        }

        if max_links > 0 && self.visited.len() >= max_links {
            return Claim::BudgetExhausted;
        }

        self.visited.insert(url.to_string(), String::new());
        Claim::Claimed
    }

    /// Returns true if `url` has been claimed or excluded
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains_key(url)
    }

    /// Number of claimed and excluded URLs
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Replaces the payload of an already claimed URL
    pub fn store_payload(&mut self, url: &str, payload: String) {
        if let Some(slot) = self.visited.get_mut(url) {
            *slot = payload;
        }
    }

    /// Appends collected items
    pub fn push_items<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.items.extend(items);
    }

    /// Appends a page error to the error log
    pub fn record_error(&mut self, error: PageError) {
        self.errors.push(error);
    }

    /// Appends search hits
    pub fn record_hits(&mut self, hits: Vec<SearchHit>) {
        self.search_hits.extend(hits);
    }

    /// Consumes the state, returning the visited map, items, errors and hits
    pub fn into_parts(
        self,
    ) -> (
        HashMap<String, String>,
        Vec<String>,
        Vec<PageError>,
        Vec<SearchHit>,
    ) {
        (self.visited, self.items, self.errors, self.search_hits)
    }
}

/// Traversal state shared between concurrent page tasks
///
/// The lock is only taken for short synchronous sections and never held across
/// an `.await`.
#[derive(Debug, Default)]
pub struct SharedState {
    inner: Mutex<TraversalState>,
}

impl SharedState {
    /// Wraps a traversal state
    pub fn new(state: TraversalState) -> Self {
        Self {
            inner: Mutex::new(state),
        }
    }

    /// Locks the state; a poisoned lock is recovered since every update is a
    /// single insert or append
    pub fn lock(&self) -> MutexGuard<'_, TraversalState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Moves the state out, leaving an empty one behind
    ///
    /// Called once every task of the traversal has been joined.
    pub fn take(&self) -> TraversalState {
        std::mem::take(&mut *self.lock())
    }
}
