//! Configuration module for Trawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every field has a default, so a file only needs the settings it changes, and
//! command-line flags are layered on top by the binary.
//!
//! # Example
//!
//! ```no_run
//! use trawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("trawl.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CrawlConfig, Selectors, DEFAULT_USER_AGENT};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
