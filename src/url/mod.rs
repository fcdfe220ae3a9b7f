//! URL handling module for Trawl
//!
//! This module provides URL normalization and resolution, domain extraction,
//! suffix matching, and the filter policy that decides which discovered links
//! are eligible to be followed.
//!
//! Every predicate here is a pure function of its inputs, so the engine calls
//! them from concurrent tasks without taking the traversal lock.

mod domain;
mod matcher;
mod normalize;

use crate::config::Selectors;

// Re-export main functions
pub use domain::{extract_domain, web_domain};
pub use matcher::{contains_any, matches_suffix};
pub use normalize::{normalize_url, resolve_link};

/// Link and domain eligibility rules derived from the configured selectors
#[derive(Debug, Clone, Default)]
pub struct FilterPolicy {
    url_patterns: Vec<String>,
    link_text_patterns: Vec<String>,
    domains: Vec<String>,
    exclude_domains: Vec<String>,
}

impl FilterPolicy {
    /// Builds the policy from configured selectors
    ///
    /// Domain entries are lowercased to match the lowercased hosts they are
    /// compared with.
    pub fn new(selectors: &Selectors) -> Self {
        Self {
            url_patterns: selectors.url_patterns.clone(),
            link_text_patterns: selectors.link_text_patterns.clone(),
            domains: lowercased(&selectors.domains),
            exclude_domains: lowercased(&selectors.exclude_domains),
        }
    }

    /// Decides whether a link is worth following based on its URL and anchor text
    ///
    /// With no URL or link-text patterns configured every link is eligible.
    /// Otherwise the link is eligible if its URL contains any URL pattern OR its
    /// text contains any link-text pattern.
    pub fn link_eligible(&self, url: &str, link_text: &str) -> bool {
        if self.url_patterns.is_empty() && self.link_text_patterns.is_empty() {
            return true;
        }

        contains_any(url, &self.url_patterns) || contains_any(link_text, &self.link_text_patterns)
    }

    /// Decides whether an absolute URL lies on an allowed domain
    ///
    /// # Rules
    ///
    /// 1. The URL must be http(s) or protocol-relative and have a host
    /// 2. A host ending with any excluded domain is rejected (highest priority)
    /// 3. With no allowed domains configured the URL is accepted
    /// 4. Otherwise the host must end with some allowed domain
    ///
    /// # Examples
    ///
    /// ```
    /// use trawl::config::Selectors;
    /// use trawl::url::FilterPolicy;
    ///
    /// let selectors = Selectors {
    ///     domains: vec!["example.com".to_string()],
    ///     exclude_domains: vec!["ads.example.com".to_string()],
    ///     ..Selectors::default()
    /// };
    /// let policy = FilterPolicy::new(&selectors);
    ///
    /// assert!(policy.domain_eligible("https://blog.example.com/post"));
    /// assert!(!policy.domain_eligible("https://ads.example.com/x"));
    /// ```
    pub fn domain_eligible(&self, absolute_url: &str) -> bool {
        let Some(host) = web_domain(absolute_url) else {
            return false;
        };

        if self
            .exclude_domains
            .iter()
            .any(|d| matches_suffix(d, &host))
        {
            return false;
        }

        if self.domains.is_empty() {
            return true;
        }

        self.domains.iter().any(|d| matches_suffix(d, &host))
    }
}

fn lowercased(domains: &[String]) -> Vec<String> {
    domains.iter().map(|d| d.to_lowercase()).collect()
}

/// Checks a page body against content-gate patterns
///
/// Passes when no patterns are configured, or when the markup contains at least
/// one pattern as a literal substring.
pub fn content_gate_pass<S: AsRef<str>>(markup: &str, patterns: &[S]) -> bool {
    patterns.is_empty()
        || patterns
            .iter()
            .any(|pattern| markup.contains(pattern.as_ref()))
}
