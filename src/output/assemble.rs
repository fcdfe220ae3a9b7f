//! Post-processing of traversal state into reports

use crate::output::Report;
use crate::state::TraversalState;
use crate::PageError;
use std::collections::{BTreeMap, HashMap};

/// Removes excluded URLs from the visited map
///
/// Excluded URLs only sit in the registry to block fetching; they never appear
/// in output. The result is ordered by URL.
pub fn finalize_pages(
    visited: HashMap<String, String>,
    excluded: &[String],
) -> BTreeMap<String, String> {
    visited
        .into_iter()
        .filter(|(url, _)| !excluded.contains(url))
        .collect()
}

/// Sorts collected items lexicographically and removes duplicates
pub fn finalize_items(mut items: Vec<String>) -> Vec<String> {
    items.sort();
    items.dedup();
    items
}

/// Builds the crawl report
///
/// `excluded` holds every registry key that was pre-seeded for exclusion.
pub fn assemble_crawl(
    state: TraversalState,
    excluded: &[String],
) -> Report<BTreeMap<String, String>> {
    let (visited, _, errors, search_hits) = state.into_parts();
    let pages_visited = visited.len();
    let (error, error_count) = first_error(errors);

    Report {
        result: finalize_pages(visited, excluded),
        error,
        error_count,
        pages_visited,
        search_hits,
    }
}

/// Builds the collect report
pub fn assemble_collect(state: TraversalState) -> Report<Vec<String>> {
    let (visited, items, errors, search_hits) = state.into_parts();
    let (error, error_count) = first_error(errors);

    Report {
        result: finalize_items(items),
        error,
        error_count,
        pages_visited: visited.len(),
        search_hits,
    }
}

fn first_error(errors: Vec<PageError>) -> (Option<PageError>, usize) {
    let count = errors.len();
    (errors.into_iter().next(), count)
}
