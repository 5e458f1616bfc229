//! Crawler module for the archive traversal
//!
//! This module contains the crawling logic, including:
//! - HTTP fetching of listings and files
//! - Listing parsing and link extraction
//! - The FIFO frontier with its visited set and depth bound
//! - Overall crawl coordination
//! - The single-listing PDF mirror

mod coordinator;
mod fetcher;
mod frontier;
mod mirror;
mod parser;

pub use coordinator::{run_crawl, Coordinator, CrawlTarget};
pub use fetcher::{build_http_client, fetch_file, fetch_listing, FetchResult};
pub use frontier::{Frontier, QueuedRequest, Rejected, RequestKind};
pub use mirror::{run_mirror, MirrorOptions, MirrorOutcome, MirrorReport};
pub use parser::{parse_listing, DiscoveredLink};

use crate::config::Config;
use crate::output::CrawlStatistics;
use crate::ArchiveError;

/// Runs a complete archive crawl
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client and the content store
/// 2. Walk the root listing and every event listing below it
/// 3. Download, deduplicate and ledger every matching file
/// 4. Rebuild the master index
pub async fn crawl(config: &Config) -> Result<CrawlStatistics, ArchiveError> {
    run_crawl(config).await
}
