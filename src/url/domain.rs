use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use defcon_archiver::url::extract_domain;
///
/// let url = Url::parse("https://MEDIA.defcon.org/DEF%20CON%2030/").unwrap();
/// assert_eq!(extract_domain(&url), Some("media.defcon.org".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks a host against one allowed-domain pattern
///
/// `media.defcon.org` matches only that host; `*.defcon.org` matches
/// `defcon.org` and any subdomain of it.
pub fn matches_domain(pattern: &str, host: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => host == base || host.ends_with(&format!(".{}", base)),
        None => host == pattern,
    }
}

/// Returns true if the URL's host is covered by any allowed pattern
pub fn is_allowed_domain(url: &Url, allowed: &[String]) -> bool {
    match extract_domain(url) {
        Some(host) => allowed
            .iter()
            .any(|pattern| matches_domain(&pattern.to_lowercase(), &host)),
        None => false,
    }
}
