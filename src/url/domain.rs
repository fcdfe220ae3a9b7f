use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// The port is not part of the domain.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use trawl::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM:8080/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Extracts the domain of an absolute or protocol-relative http(s) URL string
///
/// Returns `None` if the string has another scheme, is relative, or has no host.
pub fn web_domain(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let parsed = if raw.starts_with("//") {
        Url::parse(&format!("https:{}", raw))
    } else {
        Url::parse(raw)
    }
    .ok()?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }

    extract_domain(&parsed)
}
