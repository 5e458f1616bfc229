//! Output module for reports and post-processed renditions
//!
//! This module handles:
//! - Crawl statistics, logged and printed at the end of a run
//! - Text and Markdown conversion of mirrored PDFs

mod convert;
pub mod stats;

pub use convert::{convert_directory, to_markdown, to_text, ConversionReport};
pub use stats::{format_bytes, log_statistics, print_statistics, CrawlStatistics};
