//! PDF post-processing: plain text and Markdown renditions
//!
//! Writes `<stem>.txt` and/or `<stem>.md` next to every PDF in a directory.

use crate::storage::PostProcessing;
use crate::summarize::{DocumentExtractor, TalkContent};
use crate::ArchiveError;
use std::fs;
use std::path::{Path, PathBuf};

/// Counters for one conversion pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub text_files: usize,
    pub markdown_files: usize,
    pub skipped: usize,
}

/// Renders extracted content as Markdown
///
/// The heading is the PDF `Title` metadata when present, otherwise
/// `fallback_title`. Paragraphs are separated by blank lines; lines inside
/// a paragraph are joined with single spaces.
pub fn to_markdown(content: &TalkContent, fallback_title: &str) -> String {
    let title = content
        .metadata
        .get("Title")
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .unwrap_or(fallback_title);

    let mut markdown = format!("# {}\n\n", title);
    for paragraph in paragraphs(&content.text) {
        markdown.push_str(&paragraph);
        markdown.push_str("\n\n");
    }
    markdown
}

/// Renders extracted content as plain text
pub fn to_text(content: &TalkContent) -> String {
    let mut text = content.text.trim().to_string();
    text.push('\n');
    text
}

fn paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join(" "));
    }

    paragraphs
}

/// Converts every PDF directly inside `dir`
///
/// PDFs that fail extraction or have no text are skipped with a warning.
pub fn convert_directory(
    dir: &Path,
    options: PostProcessing,
    extractor: &dyn DocumentExtractor,
) -> Result<ConversionReport, ArchiveError> {
    let mut report = ConversionReport::default();
    if !options.any() {
        return Ok(report);
    }

    let mut pdfs: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        {
            pdfs.push(path);
        }
    }
    pdfs.sort();

    for pdf in pdfs {
        let content = match extractor.extract(&pdf) {
            Ok(content) if !content.is_blank() => content,
            Ok(_) => {
                tracing::warn!("No text extracted from {}, skipping", pdf.display());
                report.skipped += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!("Failed to convert {}: {}", pdf.display(), e);
                report.skipped += 1;
                continue;
            }
        };

        let stem = pdf
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        if options.to_text {
            fs::write(pdf.with_extension("txt"), to_text(&content))?;
            report.text_files += 1;
        }
        if options.to_markdown {
            fs::write(pdf.with_extension("md"), to_markdown(&content, &stem))?;
            report.markdown_files += 1;
        }
        tracing::info!("Converted {}", pdf.display());
    }

    Ok(report)
}
