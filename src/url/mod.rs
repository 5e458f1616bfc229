//! URL handling for the archive crawl
//!
//! This module provides the path predicates that drive the traversal,
//! event-name derivation from listing URLs, and allowed-domain checks.

mod domain;
mod event;
mod filter;

pub use domain::{extract_domain, is_allowed_domain, matches_domain};
pub use event::{decode_segment, event_name, file_name, sanitize_segment, EVENT_PREFIX};
pub use filter::{is_allowed_file, is_allowed_path, is_subdirectory};

/// What a link found on an event listing leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// A file to download
    File,
    /// A nested listing to crawl
    Directory,
    /// Anything else
    Ignored,
}

impl LinkKind {
    /// Returns true if following this link schedules a request
    pub fn is_followed(&self) -> bool {
        matches!(self, Self::File | Self::Directory)
    }
}

/// Classifies a link found on an event listing
///
/// Files take priority over directories, so `talk.pdf/` would never be
/// treated as a file, while `talk.pdf` is a download.
///
/// # Examples
///
/// ```
/// use defcon_archiver::url::{classify_listing_link, LinkKind};
///
/// assert_eq!(classify_listing_link("slides.pdf"), LinkKind::File);
/// assert_eq!(classify_listing_link("DEF CON 30 video/"), LinkKind::Directory);
/// assert_eq!(classify_listing_link("index.html"), LinkKind::Ignored);
/// ```
pub fn classify_listing_link(href: &str) -> LinkKind {
    if is_allowed_file(href) {
        LinkKind::File
    } else if is_subdirectory(href) {
        LinkKind::Directory
    } else {
        LinkKind::Ignored
    }
}
