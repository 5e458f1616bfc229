//! Configuration module for the archiver
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. All values have defaults, so running without a file is the common
//! case; command-line flags are applied on top before validation.
//!
//! # Example
//!
//! ```no_run
//! use defcon_archiver::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("archiver.toml")).unwrap();
//! println!("Crawl starts at: {}", config.crawler.start_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, EndpointConfig, MirrorConfig, OutputConfig, SummarizerConfig,
    UserAgentConfig,
};

// Re-export parser and validation functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, load_or_default};
pub use validation::validate;
