/// Checks if a host ends with a configured domain suffix
///
/// Matching is a plain "ends with": `sub.example.com` matches `example.com`.
/// Empty patterns never match.
///
/// # Examples
///
/// ```
/// use trawl::url::matches_suffix;
///
/// assert!(matches_suffix("example.com", "example.com"));
/// assert!(matches_suffix("example.com", "ads.example.com"));
/// assert!(!matches_suffix("example.com", "example.org"));
/// ```
pub fn matches_suffix(pattern: &str, host: &str) -> bool {
    !pattern.is_empty() && host.ends_with(pattern)
}

/// Returns true if `haystack` contains any of the `needles`
///
/// An empty needle is contained in every haystack.
pub fn contains_any<S: AsRef<str>>(haystack: &str, needles: &[S]) -> bool {
    needles
        .iter()
        .map(AsRef::as_ref)
        .any(|needle| haystack.contains(needle))
}
