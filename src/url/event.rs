use url::Url;

/// Prefix of the path segment that names an event
pub const EVENT_PREFIX: &str = "DEF CON ";

/// Derives the event name from a page URL
///
/// Returns the first path segment (percent-decoded) that starts with
/// `"DEF CON "`. Pages without such a segment have no event. The name is
/// passed through [`sanitize_segment`] since it becomes a directory name.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use defcon_archiver::url::event_name;
///
/// let url = Url::parse("https://media.defcon.org/DEF%20CON%2030/slides/").unwrap();
/// assert_eq!(event_name(&url), Some("DEF CON 30".to_string()));
///
/// let url = Url::parse("https://media.defcon.org/Conference%20Programs/").unwrap();
/// assert_eq!(event_name(&url), None);
/// ```
pub fn event_name(url: &Url) -> Option<String> {
    url.path_segments()?
        .map(decode_segment)
        .find(|segment| segment.starts_with(EVENT_PREFIX))
        .map(|segment| sanitize_segment(&segment))
}

/// Returns the decoded last path segment, used as the on-disk file name
pub fn file_name(url: &Url) -> Option<String> {
    url.path_segments()?
        .last()
        .map(decode_segment)
        .filter(|name| !name.is_empty() && name != "." && name != "..")
}

/// Percent-decodes a URL fragment, keeping the raw text if it is not UTF-8
pub fn decode_segment(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

/// Makes a decoded segment safe to use as a single path component
///
/// Separators (`/` and `\`) become `_`, and `.` or `..` on their own are
/// replaced so the result never walks out of its parent directory.
pub fn sanitize_segment(segment: &str) -> String {
    let cleaned = segment.replace(['/', '\\'], "_");
    if cleaned == "." || cleaned == ".." {
        "_".repeat(cleaned.len())
    } else {
        cleaned
    }
}
