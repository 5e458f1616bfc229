//! Run statistics for a crawl
//!
//! Counters are bumped by the coordinator as it goes and reported once at
//! the end, both to the log and to stdout.

use chrono::{DateTime, Utc};

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished, if it has
    pub finished_at: Option<DateTime<Utc>>,

    /// Listing pages fetched and parsed
    pub listings_fetched: u64,

    /// Event listings dropped because no event name could be derived
    pub pages_without_event: u64,

    /// Files written to the archive
    pub files_saved: u64,

    /// Total bytes written
    pub bytes_saved: u64,

    /// Files rejected as duplicate content
    pub duplicates: u64,

    /// Files rejected by the size limit
    pub oversized: u64,

    /// Files that could not be written (or ledgered)
    pub write_failures: u64,

    /// Listings or files that failed to fetch
    pub fetch_failures: u64,

    /// Requests skipped because robots.txt disallows them
    pub robots_denied: u64,

    /// Links pointing outside the allowed domains
    pub offsite_skipped: u64,

    /// Events that received at least one file
    pub events: u64,
}

impl Default for CrawlStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            listings_fetched: 0,
            pages_without_event: 0,
            files_saved: 0,
            bytes_saved: 0,
            duplicates: 0,
            oversized: 0,
            write_failures: 0,
            fetch_failures: 0,
            robots_denied: 0,
            offsite_skipped: 0,
            events: 0,
        }
    }

    /// Records a saved file of `size` bytes
    pub fn record_saved(&mut self, size: u64) {
        self.files_saved += 1;
        self.bytes_saved += size;
    }

    /// Marks the run as finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Run duration in whole seconds, once finished
    pub fn duration_seconds(&self) -> Option<u64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds().max(0) as u64)
    }

    /// Files rejected by admission (duplicate or oversized)
    pub fn rejected(&self) -> u64 {
        self.duplicates + self.oversized
    }
}

/// Logs a one-line summary at info level
pub fn log_statistics(stats: &CrawlStatistics) {
    tracing::info!(
        "Crawl finished: {} files saved ({} bytes) across {} events, {} duplicates, {} oversized, {} listings fetched",
        stats.files_saved,
        stats.bytes_saved,
        stats.events,
        stats.duplicates,
        stats.oversized,
        stats.listings_fetched
    );

    let failures = stats.write_failures + stats.fetch_failures;
    if failures > 0 {
        tracing::warn!(
            "{} fetch failures and {} write failures during the crawl",
            stats.fetch_failures,
            stats.write_failures
        );
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = stats.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    println!();

    println!("Traversal:");
    println!("  Listings fetched: {}", stats.listings_fetched);
    println!("  Pages without event: {}", stats.pages_without_event);
    println!("  Offsite links skipped: {}", stats.offsite_skipped);
    println!("  Disallowed by robots.txt: {}", stats.robots_denied);
    println!();

    println!("Files:");
    println!("  Events: {}", stats.events);
    println!("  Saved: {} ({})", stats.files_saved, format_bytes(stats.bytes_saved));
    println!("  Duplicates: {}", stats.duplicates);
    println!("  Oversized: {}", stats.oversized);
    println!();

    if stats.fetch_failures > 0 || stats.write_failures > 0 {
        println!("Errors:");
        println!("  Fetch failures: {}", stats.fetch_failures);
        println!("  Write failures: {}", stats.write_failures);
        println!();
    }

    let attempted = stats.files_saved + stats.rejected() + stats.write_failures;
    let save_rate = if attempted > 0 {
        (stats.files_saved as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };
    println!("Save rate: {:.1}%", save_rate);
}

/// Formats a byte count with a binary unit
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
