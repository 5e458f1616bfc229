use crate::url::sanitize_segment;
use std::path::{Path, PathBuf};

/// Files downloaded for one event during the current run
///
/// Created lazily on the first saved file of the event. The on-disk ledger
/// is written per file; this record mirrors it in memory for statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Event name, e.g. "DEF CON 30"
    pub name: String,

    /// Directory the event's files are stored in
    pub directory: PathBuf,

    /// File names in the order they were saved
    pub files: Vec<String>,
}

impl EventRecord {
    /// Creates an empty record for an event under the output root
    pub fn new(name: &str, output_root: &Path) -> Self {
        Self {
            name: name.to_string(),
            directory: output_root.join(sanitize_segment(name)),
            files: Vec::new(),
        }
    }

    /// Records a saved file
    pub fn push(&mut self, filename: &str) {
        self.files.push(filename.to_string());
    }

    /// Number of files saved for the event
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if nothing was saved yet
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
