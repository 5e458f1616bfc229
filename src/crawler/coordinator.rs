//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that drives the two-level traversal:
//! - The root listing schedules every event listing it links to
//! - Event listings schedule downloads and nested listings
//! - Downloads go through the content store and the event ledger
//! - The master index is rebuilt once the frontier drains

use crate::config::Config;
use crate::crawler::frontier::{Frontier, QueuedRequest, Rejected, RequestKind};
use crate::crawler::parser::{parse_listing, DiscoveredLink};
use crate::crawler::{build_http_client, fetch_file, fetch_listing, FetchResult};
use crate::output::{log_statistics, CrawlStatistics};
use crate::robots::RobotsCache;
use crate::state::{EventRecord, TraversalState};
use crate::storage::{build_master_index, Admission, ContentStore, MetadataLedger};
use crate::url::{classify_listing_link, event_name, is_allowed_domain, is_allowed_path, LinkKind};
use crate::{ArchiveError, ConfigError, ConfigResult};
use reqwest::Client;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// What a crawl run targets, fixed for the whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// Root listing
    pub url: Url,

    /// Domains links may point to
    pub allowed_domains: Vec<String>,

    /// Root of the archive tree
    pub output_root: PathBuf,

    /// Size limit checked against Content-Length
    pub max_file_size: u64,
}

impl CrawlTarget {
    /// Builds the target from a validated configuration
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        let url = Url::parse(&config.crawler.start_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.crawler.start_url, e)))?;

        Ok(Self {
            url,
            allowed_domains: config.crawler.allowed_domains.clone(),
            output_root: PathBuf::from(&config.output.root),
            max_file_size: config.crawler.max_file_size,
        })
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    target: CrawlTarget,
    client: Client,
    robots: RobotsCache,
    store: ContentStore,
    ledger: MetadataLedger,
    frontier: Frontier,
    events: HashMap<String, EventRecord>,
    stats: CrawlStatistics,
    save_delay: Duration,
    debug: bool,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Builds the HTTP client and, when `dedup-existing` is set, seeds the
    /// duplicate filter from files already under the output root.
    pub fn new(config: &Config) -> Result<Self, ArchiveError> {
        let target = CrawlTarget::from_config(config)?;
        let client = build_http_client(&config.user_agent)?;

        let mut store = ContentStore::new(&target.output_root, target.max_file_size);
        if config.crawler.dedup_existing {
            store.seed_from_disk()?;
        }

        Ok(Self {
            frontier: Frontier::new(target.url.clone(), config.crawler.max_depth),
            ledger: MetadataLedger::new(&target.output_root),
            robots: RobotsCache::new(config.crawler.obey_robots, &config.user_agent.crawler_name),
            store,
            client,
            target,
            events: HashMap::new(),
            stats: CrawlStatistics::new(),
            save_delay: Duration::from_millis(config.crawler.save_delay_ms),
            debug: config.debug,
        })
    }

    /// Events that received files during this run
    pub fn events(&self) -> &HashMap<String, EventRecord> {
        &self.events
    }

    /// Statistics collected so far
    pub fn statistics(&self) -> &CrawlStatistics {
        &self.stats
    }

    /// Runs the crawl loop until the frontier is empty
    ///
    /// Per-request failures are logged and counted; only a failure to write
    /// the master index ends the run with an error.
    pub async fn run(&mut self) -> Result<CrawlStatistics, ArchiveError> {
        tracing::info!(
            "Starting crawl of {} into {}",
            self.target.url,
            self.target.output_root.display()
        );

        let mut processed: u64 = 0;
        while let Some(request) = self.frontier.pop() {
            self.process_request(request).await;
            processed += 1;

            if processed % 50 == 0 {
                tracing::info!(
                    "Progress: {} requests processed, {} in frontier, {} files saved",
                    processed,
                    self.frontier.len(),
                    self.stats.files_saved
                );
            }
        }

        tracing::info!(
            "Frontier is empty, crawl complete ({} requests, {} distinct URLs)",
            processed,
            self.frontier.visited_count()
        );

        let index_path = build_master_index(&self.target.output_root)?;
        tracing::info!("Master index written to {}", index_path.display());

        self.stats.events = self.events.len() as u64;
        self.stats.finish();
        log_statistics(&self.stats);

        Ok(self.stats.clone())
    }

    async fn process_request(&mut self, request: QueuedRequest) {
        if !self.robots.is_allowed(&self.client, &request.url).await {
            tracing::info!("URL {} disallowed by robots.txt", request.url);
            self.stats.robots_denied += 1;
            return;
        }

        match request.kind {
            RequestKind::Listing { state, depth } => {
                self.process_listing(&request.url, state, depth).await
            }
            RequestKind::Download { event } => self.process_download(&request.url, &event).await,
        }
    }

    async fn process_listing(&mut self, url: &Url, state: TraversalState, depth: u32) {
        tracing::debug!("Fetching {} listing {} (depth {})", state, url, depth);

        let (final_url, body) = match fetch_listing(&self.client, url).await {
            FetchResult::Listing { final_url, body } => (final_url, body),
            FetchResult::HttpError { status_code } => {
                tracing::warn!("Listing {} returned HTTP {}", url, status_code);
                self.stats.fetch_failures += 1;
                return;
            }
            FetchResult::NetworkError { error } => {
                tracing::warn!("Failed to fetch listing {}: {}", url, error);
                self.stats.fetch_failures += 1;
                return;
            }
            FetchResult::File { .. } => return,
        };
        self.stats.listings_fetched += 1;

        let links = parse_listing(&body, &final_url);
        match state {
            TraversalState::AtRoot => self.handle_root_links(&links),
            TraversalState::AtEventListing => match event_name(&final_url) {
                Some(event) => self.handle_event_links(&links, &event, depth),
                None => {
                    tracing::debug!("No event name in {}, dropping page", final_url);
                    self.stats.pages_without_event += 1;
                }
            },
        }
    }

    /// Schedules every in-scope event listing linked from the root
    fn handle_root_links(&mut self, links: &[DiscoveredLink]) {
        for link in links {
            if !is_allowed_path(&link.href) {
                self.trace_link(link, "out of scope");
                continue;
            }
            if !self.is_onsite(link) {
                continue;
            }

            self.schedule_listing(link, TraversalState::AtRoot, 1);
        }
    }

    /// Schedules downloads and nested listings from an event listing
    fn handle_event_links(&mut self, links: &[DiscoveredLink], event: &str, depth: u32) {
        for link in links {
            let kind = classify_listing_link(&link.href);
            if !kind.is_followed() {
                self.trace_link(link, "ignored");
                continue;
            }
            if !self.is_onsite(link) {
                continue;
            }

            match kind {
                LinkKind::File => {
                    let request = QueuedRequest {
                        url: link.url.clone(),
                        kind: RequestKind::Download {
                            event: event.to_string(),
                        },
                    };
                    if self.frontier.push(request).is_ok() {
                        self.trace_link(link, "download");
                    }
                }
                LinkKind::Directory => {
                    self.schedule_listing(link, TraversalState::AtEventListing, depth + 1)
                }
                LinkKind::Ignored => {}
            }
        }
    }

    fn schedule_listing(&mut self, link: &DiscoveredLink, from: TraversalState, depth: u32) {
        let next = TraversalState::AtEventListing;
        if !from.can_transition_to(next) {
            return;
        }

        let request = QueuedRequest {
            url: link.url.clone(),
            kind: RequestKind::Listing { state: next, depth },
        };
        match self.frontier.push(request) {
            Ok(()) => self.trace_link(link, "listing"),
            Err(Rejected::AlreadyVisited) => {}
            Err(Rejected::DepthExceeded) => {
                tracing::info!("Not following {}: depth {} exceeds limit", link.url, depth)
            }
        }
    }

    async fn process_download(&mut self, url: &Url, event: &str) {
        let (content_length, body) =
            match fetch_file(&self.client, url, self.target.max_file_size).await {
                FetchResult::File {
                    content_length,
                    body,
                    ..
                } => (content_length, body),
                FetchResult::HttpError { status_code } => {
                    tracing::warn!("Download {} returned HTTP {}", url, status_code);
                    self.stats.fetch_failures += 1;
                    return;
                }
                FetchResult::NetworkError { error } => {
                    tracing::warn!("Failed to download {}: {}", url, error);
                    self.stats.fetch_failures += 1;
                    return;
                }
                FetchResult::Listing { .. } => return,
            };

        let admission = match self.store.admit(url, &body, content_length, event) {
            Ok(admission) => admission,
            Err(e) => {
                tracing::warn!("Failed to store {}: {}", url, e);
                self.stats.write_failures += 1;
                return;
            }
        };

        match admission {
            Admission::Saved { file, .. } => {
                if let Err(e) = self.ledger.append(event, &file.filename) {
                    tracing::warn!("Failed to record {} in ledger: {}", file.filename, e);
                    self.stats.write_failures += 1;
                }

                let output_root = &self.target.output_root;
                self.events
                    .entry(event.to_string())
                    .or_insert_with(|| EventRecord::new(event, output_root))
                    .push(&file.filename);
                self.stats.record_saved(file.size);

                if !self.save_delay.is_zero() {
                    tokio::time::sleep(self.save_delay).await;
                }
            }
            Admission::Duplicate { .. } => self.stats.duplicates += 1,
            Admission::Oversized { .. } => self.stats.oversized += 1,
        }
    }

    fn is_onsite(&mut self, link: &DiscoveredLink) -> bool {
        if is_allowed_domain(&link.url, &self.target.allowed_domains) {
            return true;
        }
        self.stats.offsite_skipped += 1;
        self.trace_link(link, "offsite");
        false
    }

    fn trace_link(&self, link: &DiscoveredLink, decision: &str) {
        if self.debug {
            tracing::info!("[{}] {} -> {}", decision, link.source, link.url);
        } else {
            tracing::debug!("[{}] {} -> {}", decision, link.source, link.url);
        }
    }
}

/// Runs a complete crawl with the given configuration
///
/// # Example
///
/// ```no_run
/// use defcon_archiver::config::Config;
/// use defcon_archiver::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let stats = run_crawl(&Config::default()).await?;
/// println!("{} files saved", stats.files_saved);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> Result<CrawlStatistics, ArchiveError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
