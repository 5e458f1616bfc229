//! Per-event metadata ledgers and the master index
//!
//! Each event gets `<root>/<event>_metadata.txt`, one file name per line.
//! Every append opens, writes and closes the file, so an interrupted run
//! leaves a consistent partial ledger.

use crate::storage::{LEDGER_SUFFIX, MASTER_INDEX_FILE};
use crate::url::sanitize_segment;
use crate::{StoreError, StoreResult};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only file lists, one per event
#[derive(Debug, Clone)]
pub struct MetadataLedger {
    root: PathBuf,
}

impl MetadataLedger {
    /// Creates a ledger writer for the archive rooted at `root`
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Path of the ledger file for an event, always directly under the root
    pub fn ledger_path(&self, event_name: &str) -> PathBuf {
        self.root
            .join(format!("{}{}", sanitize_segment(event_name), LEDGER_SUFFIX))
    }

    /// Appends one file name to the event's ledger
    pub fn append(&self, event_name: &str, filename: &str) -> StoreResult<()> {
        let path = self.ledger_path(event_name);
        let write_err = |source| StoreError::Write {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.root).map_err(write_err)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(write_err)?;
        writeln!(file, "{}", filename).map_err(write_err)?;

        tracing::debug!("Recorded {} in {}", filename, path.display());
        Ok(())
    }

    /// Reads an event's ledger back; a missing ledger is empty
    pub fn entries(&self, event_name: &str) -> StoreResult<Vec<String>> {
        let path = self.ledger_path(event_name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;
        Ok(content.lines().map(str::to_string).collect())
    }
}

/// Builds `<root>/master_index.txt` from the directory tree
///
/// Every subdirectory of the root is listed as an event, followed by its
/// files. This reads the filesystem, not in-memory state, so files left by
/// earlier runs are included. Entries are sorted by name.
///
/// # Format
///
/// ```text
/// DEF CON 30:
///   a.pdf
///   b.flac
///
/// DEF CON 31:
///   c.txt
///
/// ```
pub fn build_master_index(output_root: &Path) -> StoreResult<PathBuf> {
    let read_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| StoreError::Read { path, source }
    };

    let mut events = Vec::new();
    if output_root.is_dir() {
        for entry in fs::read_dir(output_root).map_err(read_err(output_root))? {
            let path = entry.map_err(read_err(output_root))?.path();
            if !path.is_dir() {
                continue;
            }

            let mut files = Vec::new();
            for inner in fs::read_dir(&path).map_err(read_err(&path))? {
                let inner = inner.map_err(read_err(&path))?;
                files.push(inner.file_name().to_string_lossy().into_owned());
            }
            files.sort();

            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            events.push((name, files));
        }
    }
    events.sort_by(|a, b| a.0.cmp(&b.0));

    let index_path = output_root.join(MASTER_INDEX_FILE);
    fs::create_dir_all(output_root).map_err(|source| StoreError::Write {
        path: output_root.to_path_buf(),
        source,
    })?;
    fs::write(&index_path, format_master_index(&events)).map_err(|source| {
        StoreError::Write {
            path: index_path.clone(),
            source,
        }
    })?;

    tracing::info!(
        "Master index with {} events written to {}",
        events.len(),
        index_path.display()
    );
    Ok(index_path)
}

/// Renders the nested event → files listing
pub fn format_master_index(events: &[(String, Vec<String>)]) -> String {
    let mut out = String::new();
    for (event, files) in events {
        out.push_str(&format!("{}:\n", event));
        for file in files {
            out.push_str(&format!("  {}\n", file));
        }
        out.push('\n');
    }
    out
}
