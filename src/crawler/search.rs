//! Literal term search over fetched pages

/// Characters of context kept on each side of a search hit
pub const SNIPPET_CONTEXT: usize = 30;

/// A search term found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Page the term was found on
    pub url: String,

    /// The term that matched
    pub term: String,

    /// Every occurrence of the term with surrounding context
    pub snippets: Vec<String>,
}

/// Scans `body` for each term and returns one hit per term that occurs
///
/// Matching is literal and case-sensitive. Blank terms are ignored.
pub fn find_terms<S: AsRef<str>>(url: &str, body: &str, terms: &[S]) -> Vec<SearchHit> {
    terms
        .iter()
        .map(AsRef::as_ref)
        .filter(|term| !term.is_empty())
        .filter_map(|term| {
            let snippets: Vec<String> = body
                .match_indices(term)
                .map(|(start, matched)| snippet(body, start, start + matched.len()))
                .collect();

            if snippets.is_empty() {
                None
            } else {
                Some(SearchHit {
                    url: url.to_string(),
                    term: term.to_string(),
                    snippets,
                })
            }
        })
        .collect()
}

/// Cuts the occurrence at `start..end` out of `body` with up to
/// `SNIPPET_CONTEXT` characters on each side
fn snippet(body: &str, start: usize, end: usize) -> String {
    let from = body[..start]
        .char_indices()
        .rev()
        .nth(SNIPPET_CONTEXT - 1)
        .map(|(index, _)| index)
        .unwrap_or(0);

    let to = body[end..]
        .char_indices()
        .nth(SNIPPET_CONTEXT)
        .map(|(index, _)| end + index)
        .unwrap_or(body.len());

    body[from..to]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
