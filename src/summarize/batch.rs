//! Directory-wide summarization
//!
//! Iterates the PDFs of one directory in name order, extracts each, asks
//! the provider for a summary and writes `<stem>_summary.json` next to the
//! other summaries. Per-file problems are logged and skipped; configuration
//! errors stop the batch.

use crate::summarize::{read_template, DocumentExtractor, Summary, SummaryProvider};
use crate::{ConfigError, ConfigResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix of the per-talk summary files
pub const SUMMARY_SUFFIX: &str = "_summary.json";

/// Counters for one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// PDFs with text that were summarized (or extracted, in dry runs)
    pub processed: usize,

    /// PDFs skipped because extraction failed or produced no text
    pub skipped: usize,

    /// Summaries that could not be written
    pub failed_writes: usize,

    /// Sentinel summaries returned by the provider
    pub errors: usize,
}

/// A summarization run over one directory
#[derive(Debug, Clone)]
pub struct SummarizationBatch {
    input_dir: PathBuf,
    output_dir: PathBuf,
    template_path: PathBuf,
}

impl SummarizationBatch {
    pub fn new(input_dir: &Path, output_dir: &Path, template_path: &Path) -> Self {
        Self {
            input_dir: input_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            template_path: template_path.to_path_buf(),
        }
    }

    /// Path the summary for `pdf` is written to
    pub fn summary_path(&self, pdf: &Path) -> PathBuf {
        let stem = pdf
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.output_dir.join(format!("{}{}", stem, SUMMARY_SUFFIX))
    }

    /// PDFs in the input directory, sorted by file name
    pub fn pdf_files(&self) -> ConfigResult<Vec<PathBuf>> {
        if !self.input_dir.is_dir() {
            return Err(ConfigError::MissingInputDir(self.input_dir.clone()));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&self.input_dir)? {
            let path = entry?.path();
            let is_pdf = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false);
            if is_pdf && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Runs the batch
    ///
    /// With `provider` set to `None` the batch only extracts: no provider
    /// is called and nothing is written.
    pub async fn run(
        &self,
        extractor: &dyn DocumentExtractor,
        provider: Option<&dyn SummaryProvider>,
    ) -> ConfigResult<BatchReport> {
        let files = self.pdf_files()?;
        let template = read_template(&self.template_path)?;

        if provider.is_some() {
            fs::create_dir_all(&self.output_dir)?;
        }

        tracing::info!(
            "Found {} PDFs in {}",
            files.len(),
            self.input_dir.display()
        );

        let mut report = BatchReport::default();
        for pdf in &files {
            let name = pdf.display();

            let content = match extractor.extract(pdf) {
                Ok(content) if !content.is_blank() => content,
                Ok(_) => {
                    tracing::warn!("Skipped processing {}: no extractable text", name);
                    report.skipped += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Skipped processing {}: {}", name, e);
                    report.skipped += 1;
                    continue;
                }
            };

            let Some(provider) = provider else {
                tracing::info!(
                    "Extracted {} characters from {} (no summary requested)",
                    content.text.len(),
                    name
                );
                report.processed += 1;
                continue;
            };

            let summary = provider.summarize(&content, &template).await?;
            if summary.is_error() {
                report.errors += 1;
            }

            let output_path = self.summary_path(pdf);
            match write_summary(&output_path, &summary) {
                Ok(()) => {
                    tracing::info!("Processed and saved summary for: {}", name);
                    report.processed += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to write {}: {}", output_path.display(), e);
                    report.failed_writes += 1;
                }
            }
        }

        tracing::info!(
            "Batch finished: {} processed, {} skipped, {} failed writes, {} error summaries",
            report.processed,
            report.skipped,
            report.failed_writes,
            report.errors
        );
        Ok(report)
    }
}

fn write_summary(path: &Path, summary: &Summary) -> Result<(), crate::ArchiveError> {
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json)?;
    Ok(())
}
