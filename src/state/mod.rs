//! State module for tracking traversal progress
//!
//! This module holds the per-invocation state shared by all page tasks of one
//! crawl or collect call.
//!
//! # Components
//!
//! - `TraversalState`: the visited registry, collected items, error log and search hits
//! - `SharedState`: the lock-protected wrapper the engine's tasks share
//! - `Claim`: the outcome of atomically claiming a URL before its fetch

mod registry;

// Re-export main types
pub use registry::{Claim, SharedState, TraversalState};
