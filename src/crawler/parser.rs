//! HTML listing parser
//!
//! Extracts every `<a href>` from a listing page. Each link keeps the
//! percent-decoded href (what the path predicates look at) next to the
//! resolved absolute URL (what gets fetched).

use crate::url::decode_segment;
use scraper::{Html, Selector};
use url::Url;

/// A link found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    /// Href as written in the page, percent-decoded
    pub href: String,

    /// Absolute URL the href resolves to
    pub url: Url,

    /// The page the link was found on
    pub source: Url,
}

/// Parses a listing page and returns its links in document order
///
/// # Excluded
///
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - Fragment-only links
/// - Hrefs that do not resolve to an HTTP(S) URL
///
/// # Example
///
/// ```
/// use defcon_archiver::crawler::parse_listing;
/// use url::Url;
///
/// let base = Url::parse("https://media.defcon.org/").unwrap();
/// let html = r#"<a href="DEF%20CON%2030/">DEF CON 30/</a>"#;
/// let links = parse_listing(html, &base);
/// assert_eq!(links[0].href, "DEF CON 30/");
/// assert_eq!(links[0].url.as_str(), "https://media.defcon.org/DEF%20CON%2030/");
/// ```
pub fn parse_listing(html: &str, base_url: &Url) -> Vec<DiscoveredLink> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return links,
    };

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(url) = resolve_link(href, base_url) {
                links.push(DiscoveredLink {
                    href: decode_segment(href.trim()),
                    url,
                    source: base_url.clone(),
                });
            }
        }
    }

    links
}

/// Resolves an href against the page URL
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }
    absolute.set_fragment(None);
    Some(absolute)
}
