//! defcon-archiver: mirror the DEF CON media archive and summarize its talks
//!
//! This crate crawls a conference media listing, downloads files that match
//! simple path rules into per-event directories (deduplicated by content
//! hash), keeps an append-only ledger per event, and turns downloaded PDFs
//! into structured summaries through a pluggable set of LLM providers.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod storage;
pub mod summarize;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for archiver operations
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
///
/// Everything in here is fatal: the command aborts and reports the message.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),

    #[error("Missing API key for {provider}: environment variable {var} is not set")]
    MissingApiKey { provider: &'static str, var: String },

    #[error("Unknown summary provider '{0}' (expected cohere, ollama, openai or claude)")]
    UnknownProvider(String),

    #[error("Endpoint {url} is unreachable: {reason}")]
    EndpointUnreachable { url: String, reason: String },

    #[error("Prompt template not found: {}", .0.display())]
    MissingTemplate(PathBuf),

    #[error("Input directory not found: {}", .0.display())]
    MissingInputDir(PathBuf),
}

/// Errors raised while persisting downloaded content
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot derive a file name from {0}")]
    NoFileName(String),
}

/// Result type alias for archiver operations
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// Re-export commonly used types
pub use config::Config;
pub use state::{EventRecord, TraversalState};
pub use summarize::{ProviderKind, Summary, TalkContent};
pub use url::{is_allowed_file, is_allowed_path, is_subdirectory};
