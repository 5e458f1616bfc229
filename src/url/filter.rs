//! Path predicates deciding what the crawler follows and what it downloads
//!
//! All three predicates work on raw strings: no URL parsing, no
//! normalization. They are pure and safe to call from anywhere.

/// Path fragments that mark a top-level listing worth crawling
const ALLOWED_PATHS: &[&str] = &[
    "DEF CON ",
    "Conference Programs",
    "DEF CON Music",
    "DEF CON China",
    "DEF CON NYE 2020",
];

/// File extensions that are downloaded (compared lowercase)
const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".flac", ".opus", ".txt"];

/// Returns true if the path contains one of the allowed listing fragments
///
/// Matching is case-sensitive substring containment.
///
/// # Examples
///
/// ```
/// use defcon_archiver::url::is_allowed_path;
///
/// assert!(is_allowed_path("DEF CON 30/"));
/// assert!(is_allowed_path("/archive/Conference Programs/"));
/// assert!(!is_allowed_path("def con 30/"));
/// ```
pub fn is_allowed_path(path: &str) -> bool {
    ALLOWED_PATHS.iter().any(|allowed| path.contains(allowed))
}

/// Returns true if the filename ends with a downloadable extension
///
/// The extension check ignores case.
///
/// # Examples
///
/// ```
/// use defcon_archiver::url::is_allowed_file;
///
/// assert!(is_allowed_file("talk.pdf"));
/// assert!(is_allowed_file("TRACK01.FLAC"));
/// assert!(!is_allowed_file("index.html"));
/// ```
pub fn is_allowed_file(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    ALLOWED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Returns true if the path names a directory (ends with a separator)
pub fn is_subdirectory(path: &str) -> bool {
    path.ends_with('/')
}
