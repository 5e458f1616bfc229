//! Storage module for the archive tree
//!
//! Everything the crawler persists lives under one output root:
//!
//! ```text
//! <root>/<event>/<file>          downloaded files
//! <root>/<event>_metadata.txt    per-event ledger, one file name per line
//! <root>/master_index.txt        event -> files listing, rebuilt per run
//! <root>/manifest.json           mirror runs only
//! ```

mod content_store;
mod ledger;
mod manifest;

pub use content_store::{content_hash, Admission, ContentStore, DownloadedFile};
pub use ledger::{build_master_index, format_master_index, MetadataLedger};
pub use manifest::{CrawlOptions, FilterRule, MirrorManifest, PostProcessing};

/// Suffix of per-event ledger files
pub const LEDGER_SUFFIX: &str = "_metadata.txt";

/// Name of the master index file
pub const MASTER_INDEX_FILE: &str = "master_index.txt";

/// Name of the mirror manifest file
pub const MANIFEST_FILE: &str = "manifest.json";
