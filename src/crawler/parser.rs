//! HTML extraction of links and collectable items
//!
//! Extraction is limited to the subtrees selected by a [`Scope`]: an element is
//! in scope when it, or one of its ancestors, carries a configured id or class.
//! The walk keeps an explicit stack of `(element, in_scope)` pairs, so scope
//! entered at one element applies to its descendants only and never leaks to
//! its siblings.

use crate::crawler::collections::CollectionSet;
use crate::url::{normalize_url, resolve_link, FilterPolicy};
use scraper::node::Element;
use scraper::{ElementRef, Html};
use std::collections::HashMap;
use url::Url;

/// Selector scope for extraction
///
/// Ids and classes are OR-combined. An empty scope selects the whole document.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    ids: Vec<String>,
    classes: Vec<String>,
}

impl Scope {
    /// Creates a scope from id and class lists; blank entries are ignored
    pub fn new(ids: &[String], classes: &[String]) -> Self {
        let keep = |values: &[String]| {
            values
                .iter()
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        };

        Self {
            ids: keep(ids),
            classes: keep(classes),
        }
    }

    /// Returns true if this scope selects the whole document
    pub fn is_everything(&self) -> bool {
        self.ids.is_empty() && self.classes.is_empty()
    }

    /// Returns true if the element itself opens a scoped subtree
    pub fn selects(&self, element: &Element) -> bool {
        if self.is_everything() {
            return true;
        }

        if let Some(id) = element.id() {
            if self.ids.iter().any(|target| target == id) {
                return true;
            }
        }

        element
            .classes()
            .any(|class| self.classes.iter().any(|target| target == class))
    }
}

/// Extracts in-scope anchors as a map of raw href to trimmed anchor text
///
/// Out-of-scope anchors are ignored, but their subtrees are still walked for
/// nested scoped regions. Hrefs are returned exactly as written; resolution
/// against the page URL happens later.
///
/// # Example
///
/// ```
/// use trawl::crawler::{extract_links, Scope};
///
/// let html = r#"<div class="tax"><a href="/a">A</a></div><div><a href="/b">B</a></div>"#;
/// let scope = Scope::new(&[], &["tax".to_string()]);
/// let links = extract_links(html, &scope);
///
/// assert_eq!(links.len(), 1);
/// assert_eq!(links.get("/a").map(String::as_str), Some("A"));
/// ```
pub fn extract_links(html: &str, scope: &Scope) -> HashMap<String, String> {
    let document = Html::parse_document(html);
    let mut links = HashMap::new();

    walk_scoped(&document, scope, |element| {
        if element.value().name() != "a" {
            return Visit::Descend;
        }

        if let Some(href) = element.value().attr("href") {
            let text = element.text().collect::<String>();
            links.insert(href.to_string(), text.trim().to_string());
        }

        Visit::Descend
    });

    links
}

/// Extracts item URLs matching the collection patterns from scoped subtrees
///
/// Each outermost in-scope element is serialized and searched with every
/// pattern. Matches are made absolute against `page_url` and kept only if they
/// pass the domain policy. Results keep document order and may repeat.
pub fn extract_items(
    html: &str,
    page_url: &Url,
    scope: &Scope,
    collections: &CollectionSet,
    policy: &FilterPolicy,
) -> Vec<String> {
    if !collections.has_patterns() {
        return Vec::new();
    }

    let document = Html::parse_document(html);
    let mut items = Vec::new();

    walk_scoped(&document, scope, |element| {
        let markup = element.html();
        for raw in collections.find_all(&markup) {
            if let Some(item) = absolutize_item(raw, page_url) {
                if policy.domain_eligible(&item) {
                    items.push(item);
                }
            }
        }

        // The serialized subtree already covers every descendant
        Visit::Skip
    });

    items
}

/// What the walker should do after visiting an in-scope element
enum Visit {
    Descend,
    Skip,
}

/// Walks the element tree depth-first in document order, calling `on_scoped`
/// for every element that is in scope
fn walk_scoped<F>(document: &Html, scope: &Scope, mut on_scoped: F)
where
    F: FnMut(ElementRef<'_>) -> Visit,
{
    let mut stack: Vec<(ElementRef<'_>, bool)> = vec![(document.root_element(), false)];

    while let Some((element, inherited)) = stack.pop() {
        let in_scope = inherited || scope.selects(element.value());

        if in_scope {
            if let Visit::Skip = on_scoped(element) {
                continue;
            }
        }

        // Push in reverse so children pop in document order
        let children: Vec<_> = element.children().filter_map(ElementRef::wrap).collect();
        for child in children.into_iter().rev() {
            stack.push((child, in_scope));
        }
    }
}

/// Turns a raw pattern match into an absolute URL string
///
/// Matches that embed an absolute URL are cut down to the last `http(s)://`
/// occurrence; anything else is resolved against the page URL.
fn absolutize_item(raw: &str, page_url: &Url) -> Option<String> {
    let start = raw.rfind("https://").or_else(|| raw.rfind("http://"));

    let url = match start {
        Some(index) => normalize_url(&raw[index..]).ok()?,
        None => resolve_link(page_url, raw)?,
    };

    Some(url.to_string())
}
