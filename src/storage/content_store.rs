//! Admission and persistence of downloaded files
//!
//! The store decides whether a fetched body is kept (size limit, duplicate
//! content) and writes accepted files into the event directory.

use crate::storage::{LEDGER_SUFFIX, MANIFEST_FILE, MASTER_INDEX_FILE};
use crate::url::{file_name, sanitize_segment};
use crate::{StoreError, StoreResult};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// A file that passed admission and was written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Name on disk (decoded last URL segment)
    pub filename: String,

    /// Hex MD5 digest of the raw bytes
    pub hash: String,

    /// Size in bytes
    pub size: u64,
}

/// Outcome of an admission decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Written to `path`
    Saved { path: PathBuf, file: DownloadedFile },

    /// The announced Content-Length exceeds the limit
    Oversized { content_length: u64 },

    /// Identical bytes were already stored during this run
    Duplicate { hash: String },
}

impl Admission {
    /// Returns true if the file was written
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved { .. })
    }
}

/// Computes the 128-bit content hash used as the dedup key
pub fn content_hash(body: &[u8]) -> String {
    format!("{:x}", md5::compute(body))
}

/// Run-wide content store with a duplicate filter
///
/// The seen-hash set lives as long as the store. It is only seeded from disk
/// when `seed_from_disk` is called, so by default every run starts empty.
pub struct ContentStore {
    root: PathBuf,
    max_file_size: u64,
    seen: HashSet<String>,
}

impl ContentStore {
    /// Creates a store rooted at `root`
    pub fn new(root: &Path, max_file_size: u64) -> Self {
        Self {
            root: root.to_path_buf(),
            max_file_size,
            seen: HashSet::new(),
        }
    }

    /// Number of distinct hashes admitted (or seeded) so far
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Adds the hashes of files already in the archive to the duplicate filter
    ///
    /// Reads files directly under the root and one directory level below it,
    /// skipping ledgers, the master index and the manifest. Returns the
    /// number of files hashed.
    pub fn seed_from_disk(&mut self) -> StoreResult<usize> {
        if !self.root.is_dir() {
            return Ok(0);
        }

        let mut hashed = 0;
        for path in list_dir(&self.root)? {
            if path.is_dir() {
                for inner in list_dir(&path)? {
                    if inner.is_file() {
                        self.seed_file(&inner)?;
                        hashed += 1;
                    }
                }
            } else if path.is_file() && !is_bookkeeping_file(&path) {
                self.seed_file(&path)?;
                hashed += 1;
            }
        }

        tracing::info!(
            "Seeded duplicate filter with {} existing files under {}",
            hashed,
            self.root.display()
        );
        Ok(hashed)
    }

    fn seed_file(&mut self, path: &Path) -> StoreResult<()> {
        let bytes = fs::read(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.seen.insert(content_hash(&bytes));
        Ok(())
    }

    /// Admits a downloaded file into `<root>/<event_name>/`
    ///
    /// # Admission rules
    ///
    /// 1. A Content-Length header above the limit rejects the file
    /// 2. A body whose hash was already admitted is a duplicate
    /// 3. Otherwise the event directory is created if needed, the file is
    ///    written and its hash recorded
    ///
    /// Rejections are logged at info level and are not errors. Only I/O
    /// failures return `Err`, and they leave the seen set untouched.
    pub fn admit(
        &mut self,
        url: &Url,
        body: &[u8],
        content_length: Option<u64>,
        event_name: &str,
    ) -> StoreResult<Admission> {
        let dir = self.root.join(sanitize_segment(event_name));
        self.admit_into(dir, url, body, content_length)
    }

    /// Admits a downloaded file directly into the root (flat mirror layout)
    pub fn admit_flat(
        &mut self,
        url: &Url,
        body: &[u8],
        content_length: Option<u64>,
    ) -> StoreResult<Admission> {
        let dir = self.root.clone();
        self.admit_into(dir, url, body, content_length)
    }

    fn admit_into(
        &mut self,
        dir: PathBuf,
        url: &Url,
        body: &[u8],
        content_length: Option<u64>,
    ) -> StoreResult<Admission> {
        if let Some(length) = content_length {
            if length > self.max_file_size {
                tracing::info!("Skipping large file: {} ({} bytes)", url, length);
                return Ok(Admission::Oversized {
                    content_length: length,
                });
            }
        }

        let hash = content_hash(body);
        if self.seen.contains(&hash) {
            tracing::info!("Skipping duplicate file: {}", url);
            return Ok(Admission::Duplicate { hash });
        }

        let filename = file_name(url)
            .map(|name| sanitize_segment(&name))
            .ok_or_else(|| StoreError::NoFileName(url.to_string()))?;

        fs::create_dir_all(&dir).map_err(|source| StoreError::Write {
            path: dir.clone(),
            source,
        })?;

        let path = dir.join(&filename);
        fs::write(&path, body).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;

        self.seen.insert(hash.clone());
        tracing::info!("Saved file {} to {}", filename, dir.display());

        Ok(Admission::Saved {
            path,
            file: DownloadedFile {
                filename,
                hash,
                size: body.len() as u64,
            },
        })
    }
}

fn is_bookkeeping_file(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.ends_with(LEDGER_SUFFIX) || name == MASTER_INDEX_FILE || name == MANIFEST_FILE
}

fn list_dir(dir: &Path) -> StoreResult<Vec<PathBuf>> {
    let read_err = |source| StoreError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        paths.push(entry.map_err(read_err)?.path());
    }
    paths.sort();
    Ok(paths)
}
