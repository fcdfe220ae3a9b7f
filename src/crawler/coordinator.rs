//! Crawler coordinator - recursive traversal orchestration
//!
//! This module turns a set of seed URLs into a bounded, deduplicated and
//! concurrent exploration of the link graph:
//! - Claiming each URL exactly once in the visited registry
//! - Fetching pages through a `PageSource` under a per-fetch timeout
//! - Applying the content gate, item extraction and search terms
//! - Spawning one task per eligible link under the concurrency budget
//! - Joining the whole task tree and assembling the report
//!
//! Every visit runs the same steps:
//!
//! 1. Stop if the depth is past `max-depth`
//! 2. Claim the URL; stop if it was already claimed or the page budget is spent
//! 3. Fetch (rendered when `depth <= js-depth`); a failure is logged and recorded
//! 4. Stop if the body matches no content pattern
//! 5. Store the payload, collect items, record search hits
//! 6. Release the permit, then spawn a child task per eligible unseen link
//! 7. Wait for the children

use crate::config::{validate, CrawlConfig};
use crate::crawler::collections::CollectionSet;
use crate::crawler::parser::{extract_items, extract_links, Scope};
use crate::crawler::scheduler::Scheduler;
use crate::crawler::search::find_terms;
use crate::crawler::{FetchMode, PageSource, WebSource};
use crate::output::{assemble_collect, assemble_crawl, Report};
use crate::state::{Claim, SharedState, TraversalState};
use crate::url::{content_gate_pass, normalize_url, resolve_link, FilterPolicy};
use crate::{ConfigError, FetchError, PageError, TrawlError};
use futures::future::{BoxFuture, FutureExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::OwnedSemaphorePermit;
use tokio::task::JoinHandle;
use url::Url;

/// Entry point for crawl and collect calls
///
/// A `Crawler` holds an immutable configuration and a page source. Each call to
/// [`Crawler::crawl`] or [`Crawler::collect`] builds fresh traversal state, so
/// one crawler can serve any number of calls.
pub struct Crawler {
    config: Arc<CrawlConfig>,
    source: Arc<dyn PageSource>,
}

impl Crawler {
    /// Creates a crawler that fetches pages through `source`
    pub fn new(config: CrawlConfig, source: Arc<dyn PageSource>) -> Self {
        Self {
            config: Arc::new(config),
            source,
        }
    }

    /// Creates a crawler backed by the network
    pub fn with_web_source(config: CrawlConfig) -> Result<Self, TrawlError> {
        let source = WebSource::new(&config)?;
        Ok(Self::new(config, Arc::new(source)))
    }

    /// The configuration every call runs with
    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Captures every reachable page
    ///
    /// Returns a map from normalized URL to page markup. The markup is empty
    /// for pages that failed, missed the content gate, or when search terms
    /// are configured.
    ///
    /// # Errors
    ///
    /// Only configuration problems are errors, and they are raised before any
    /// fetch. Page failures are reported through [`Report::error`].
    pub async fn crawl(
        &self,
        seeds: &[String],
    ) -> Result<Report<BTreeMap<String, String>>, ConfigError> {
        let seeds = self.prepare(seeds)?;
        let excluded = excluded_keys(&self.config.selectors.excluded_urls);

        tracing::info!("Crawling {} seed(s) to depth {}", seeds.len(), self.config.max_depth);

        let state = self.traverse(Mode::Crawl, seeds, &excluded).await;
        Ok(assemble_crawl(state, &excluded))
    }

    /// Collects item URLs matching the configured collection types
    ///
    /// Returns the matches sorted and deduplicated.
    ///
    /// # Errors
    ///
    /// Invalid seeds, invalid configuration and collection patterns that fail
    /// to compile abort the call before any fetch.
    pub async fn collect(&self, seeds: &[String]) -> Result<Report<Vec<String>>, ConfigError> {
        let seeds = self.prepare(seeds)?;
        let collections = CollectionSet::compile(&self.config.selectors.collections)?;
        let excluded = excluded_keys(&self.config.selectors.excluded_urls);

        tracing::info!(
            "Collecting {:?} from {} seed(s)",
            self.config.selectors.collections,
            seeds.len()
        );

        let state = self
            .traverse(Mode::Collect(collections), seeds, &excluded)
            .await;
        Ok(assemble_collect(state))
    }

    /// Validates the configuration and normalizes the seeds
    fn prepare(&self, seeds: &[String]) -> Result<Vec<String>, ConfigError> {
        validate(&self.config)?;

        seeds
            .iter()
            .map(|seed| {
                normalize_url(seed)
                    .map(|url| url.to_string())
                    .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))
            })
            .collect()
    }

    async fn traverse(&self, mode: Mode, seeds: Vec<String>, excluded: &[String]) -> TraversalState {
        let traversal = Arc::new(Traversal {
            config: Arc::clone(&self.config),
            source: Arc::clone(&self.source),
            scheduler: Scheduler::new(&self.config),
            scope: Scope::new(&self.config.selectors.ids, &self.config.selectors.classes),
            policy: FilterPolicy::new(&self.config.selectors),
            mode,
            state: SharedState::new(TraversalState::with_excluded(excluded.iter().cloned())),
        });

        let mut seed_tasks = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let Some(permit) = traversal.scheduler.acquire().await else {
                break;
            };
            let task = tokio::spawn(Arc::clone(&traversal).visit(seed.clone(), 1, permit));
            seed_tasks.push((seed, task));
        }

        traversal.join(seed_tasks).await;
        traversal.state.take()
    }
}

/// Registry keys that block excluded URLs
///
/// URLs that normalize are stored in normalized form so they match discovered
/// links; anything else is kept as written.
fn excluded_keys(urls: &[String]) -> Vec<String> {
    let mut keys: Vec<String> = urls
        .iter()
        .map(|raw| match normalize_url(raw) {
            Ok(url) => url.to_string(),
            Err(_) => raw.clone(),
        })
        .collect();
    keys.sort();
    keys.dedup();
    keys
}

/// What a traversal produces
enum Mode {
    Crawl,
    Collect(CollectionSet),
}

/// Shared context of one traversal; every page task holds an `Arc` to it
struct Traversal {
    config: Arc<CrawlConfig>,
    source: Arc<dyn PageSource>,
    scheduler: Scheduler,
    scope: Scope,
    policy: FilterPolicy,
    mode: Mode,
    state: SharedState,
}

impl Traversal {
    /// Visits one page and then its children
    ///
    /// The permit covers this page's own fetch and extraction only. It is
    /// released before children are spawned, so a parent waiting for a free
    /// permit never holds one itself.
    fn visit(
        self: Arc<Self>,
        url: String,
        depth: u32,
        permit: OwnedSemaphorePermit,
    ) -> BoxFuture<'static, ()> {
        async move {
            let links = self.process(&url, depth).await;
            drop(permit);

            if let Some(links) = links {
                self.dispatch(depth, links).await;
            }
        }
        .boxed()
    }

    /// Claims, fetches and processes a page; returns the links to follow
    async fn process(&self, url: &str, depth: u32) -> Option<Vec<String>> {
        if !self.scheduler.within_depth(depth) {
            return None;
        }

        let claim = self.state.lock().claim(url, self.config.max_links);
        match claim {
            Claim::Claimed => {}
            Claim::AlreadyVisited => return None,
            Claim::BudgetExhausted => {
                tracing::debug!("Page budget of {} reached, skipping {}", self.config.max_links, url);
                return None;
            }
        }

        match self.mode {
            Mode::Crawl => tracing::info!("Fetching {}", url),
            Mode::Collect(_) => tracing::debug!("Fetching {}", url),
        }

        let body = match self.fetch(url, self.scheduler.fetch_mode(depth)).await {
            Ok(body) => body,
            Err(error) => {
                self.record_failure(error);
                return None;
            }
        };

        if !content_gate_pass(&body, &self.config.selectors.content_patterns) {
            tracing::debug!("{} matched no content pattern", url);
            return None;
        }

        let page_url = Url::parse(url).ok()?;

        let hits = find_terms(url, &body, &self.config.search_any);
        if !self.config.silent {
            for hit in &hits {
                tracing::info!(
                    "Found '{}' on {} ({} occurrence(s))",
                    hit.term,
                    hit.url,
                    hit.snippets.len()
                );
            }
        }

        let items = match &self.mode {
            Mode::Crawl => Vec::new(),
            Mode::Collect(collections) => {
                let mut items =
                    extract_items(&body, &page_url, &self.scope, collections, &self.policy);
                if collections.collects_pages() {
                    items.push(url.to_string());
                }
                items
            }
        };

        let links = self.eligible_links(&body, &page_url, depth);
        let payload = if self.stores_markup() { body } else { String::new() };

        {
            let mut state = self.state.lock();
            state.store_payload(url, payload);
            state.push_items(items);
            state.record_hits(hits);
        }

        tracing::trace!("{} yielded {} eligible link(s)", url, links.len());
        Some(links)
    }

    /// Spawns a child task for every link not yet visited, then waits for them
    async fn dispatch(self: Arc<Self>, depth: u32, links: Vec<String>) {
        let mut children = Vec::new();

        for link in links {
            let seen = self.state.lock().is_visited(&link);
            if seen {
                continue;
            }

            let Some(permit) = self.scheduler.acquire().await else {
                break;
            };
            let task = tokio::spawn(Arc::clone(&self).visit(link.clone(), depth + 1, permit));
            children.push((link, task));
        }

        self.join(children).await;
    }

    /// Waits for spawned tasks, logging the ones that panicked
    async fn join(&self, tasks: Vec<(String, JoinHandle<()>)>) {
        for (url, task) in tasks {
            if let Err(e) = task.await {
                tracing::error!("Task for {} did not complete: {}", url, e);
                self.state.lock().record_error(PageError::Task {
                    url,
                    message: e.to_string(),
                });
            }
        }
    }

    /// Fetches through the page source under the configured timeout
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<String, FetchError> {
        let after = self.config.fetch_timeout();

        match tokio::time::timeout(after, self.source.fetch(url, mode)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                after,
            }),
        }
    }

    /// Resolves in-scope links and keeps the ones that pass the filter policy
    ///
    /// Nothing is extracted when children would be past `max-depth`.
    fn eligible_links(&self, body: &str, page_url: &Url, depth: u32) -> Vec<String> {
        if !self.scheduler.within_depth(depth + 1) {
            return Vec::new();
        }

        let mut links: Vec<String> = extract_links(body, &self.scope)
            .into_iter()
            .filter(|(href, text)| self.policy.link_eligible(href, text))
            .filter_map(|(href, _)| resolve_link(page_url, &href))
            .map(|url| url.to_string())
            .filter(|url| self.policy.domain_eligible(url))
            .collect();

        links.sort();
        links.dedup();
        links
    }

    /// Crawl mode keeps markup unless the run is a term search
    fn stores_markup(&self) -> bool {
        matches!(self.mode, Mode::Crawl) && self.config.search_any.is_empty()
    }

    fn record_failure(&self, error: FetchError) {
        if !self.config.silent {
            tracing::warn!("Error crawling {}: {}", error.url(), error);
        }
        self.state.lock().record_error(PageError::from(error));
    }
}
