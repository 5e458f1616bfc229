//! PDF text extraction
//!
//! Metadata and page count come from `lopdf`; the text itself from
//! `pdf-extract`, which is isolated behind `catch_unwind` because it panics
//! on some malformed inputs.

use crate::summarize::TalkContent;
use lopdf::{Dictionary, Document, Object};
use std::collections::BTreeMap;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a document could not be extracted
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid PDF: {0}")]
    Pdf(String),

    #[error("PDF text extraction panicked")]
    Panicked,
}

/// Produces text and metadata from a document on disk
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<TalkContent, ExtractError>;
}

/// Extractor for PDF files
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts text and metadata from PDF bytes
    pub fn extract_bytes(&self, bytes: &[u8]) -> Result<TalkContent, ExtractError> {
        let document = Document::load_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;
        let metadata = document_metadata(&document);

        let text = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(bytes)
        }))
        .map_err(|_| ExtractError::Panicked)?
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;

        Ok(TalkContent { text, metadata })
    }
}

impl DocumentExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<TalkContent, ExtractError> {
        let bytes = fs::read(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.extract_bytes(&bytes)
    }
}

/// Collects the Info dictionary plus page count and PDF version
fn document_metadata(document: &Document) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    metadata.insert("pages".to_string(), document.get_pages().len().to_string());
    metadata.insert("version".to_string(), document.version.to_string());

    if let Some(info) = info_dictionary(document) {
        for (key, value) in info.iter() {
            if let Object::String(bytes, _) = value {
                let key = String::from_utf8_lossy(key).into_owned();
                metadata.insert(key, decode_pdf_string(bytes));
            }
        }
    }

    metadata
}

fn info_dictionary(document: &Document) -> Option<&Dictionary> {
    match document.trailer.get(b"Info").ok()? {
        Object::Reference(id) => document.get_dictionary(*id).ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Decodes a PDF text string (UTF-16BE with BOM, otherwise byte text)
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    String::from_utf8_lossy(bytes).into_owned()
}
