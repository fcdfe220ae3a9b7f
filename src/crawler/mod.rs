//! Crawler module for link-graph traversal
//!
//! This module contains the core crawling logic, including:
//! - Page sources for plain HTTP and headless-browser fetches
//! - Scoped link and item extraction
//! - Collection patterns and search terms
//! - Concurrency and depth scheduling
//! - Overall traversal coordination

mod browser;
mod collections;
mod coordinator;
mod fetcher;
mod parser;
mod scheduler;
mod search;

pub use browser::{cache_dir, install_browser, locate_browser, BrowserRenderer};
pub use collections::{CollectionSet, PAGE_COLLECTIONS};
pub use coordinator::Crawler;
pub use fetcher::{build_http_client, fetch_url, FetchMode, PageSource, WebSource};
pub use parser::{extract_items, extract_links, Scope};
pub use scheduler::Scheduler;
pub use search::{find_terms, SearchHit, SNIPPET_CONTEXT};
