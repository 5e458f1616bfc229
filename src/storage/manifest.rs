//! Mirror manifest (`manifest.json`)
//!
//! Records how a mirror was produced: source listing, filter rules, crawl
//! options and requested post-processing.

use crate::storage::MANIFEST_FILE;
use crate::ArchiveError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A named content filter applied by the mirror
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    pub name: String,
    pub description: String,
}

impl FilterRule {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// Request-level options used while mirroring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlOptions {
    pub user_agent: String,
    pub download_delay_secs: f64,
    pub obey_robots: bool,
}

/// Conversions run after the mirror completes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostProcessing {
    pub to_markdown: bool,
    pub to_text: bool,
}

impl PostProcessing {
    pub fn any(&self) -> bool {
        self.to_markdown || self.to_text
    }
}

/// Serialized description of a mirror run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorManifest {
    pub source: String,
    pub output_directory: String,
    pub filter_rules: Vec<FilterRule>,
    pub mirror_date: DateTime<Utc>,
    pub force_download: bool,
    pub crawl_options: CrawlOptions,
    pub post_processing: PostProcessing,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub config_hash: Option<String>,
}

impl MirrorManifest {
    /// The filter rules every mirror applies
    pub fn default_filter_rules() -> Vec<FilterRule> {
        vec![
            FilterRule::new("pdf_only", "Only mirror PDF files"),
            FilterRule::new("exclude_index", "Exclude index.html files"),
            FilterRule::new("respect_robots", "Respect robots.txt rules"),
        ]
    }

    /// Writes the manifest as pretty JSON into `dir`
    pub fn write(&self, dir: &Path) -> Result<PathBuf, ArchiveError> {
        let path = dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)?;
        tracing::info!("Manifest file generated at {}", path.display());
        Ok(path)
    }

    /// Reads a manifest back from `dir`
    pub fn read(dir: &Path) -> Result<Self, ArchiveError> {
        let content = fs::read_to_string(dir.join(MANIFEST_FILE))?;
        Ok(serde_json::from_str(&content)?)
    }
}
