//! Single-listing PDF mirror
//!
//! Downloads every PDF linked from one listing into a flat directory,
//! records a `manifest.json` describing the run and optionally converts the
//! PDFs to text or Markdown.

use crate::config::Config;
use crate::crawler::parser::parse_listing;
use crate::crawler::{build_http_client, fetch_file, fetch_listing, FetchResult};
use crate::output::{convert_directory, ConversionReport};
use crate::robots::RobotsCache;
use crate::storage::{Admission, ContentStore, CrawlOptions, MirrorManifest, PostProcessing};
use crate::summarize::DocumentExtractor;
use crate::url::is_allowed_domain;
use crate::{ArchiveError, ConfigError};
use chrono::Utc;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Options for one mirror run
#[derive(Debug, Clone)]
pub struct MirrorOptions {
    /// Listing whose PDFs are mirrored
    pub source: Url,

    /// Target directory
    pub directory: PathBuf,

    /// Mirror even if the directory already exists
    pub force: bool,

    /// Conversions to run afterwards
    pub post_processing: PostProcessing,
}

impl MirrorOptions {
    /// Builds options from the `[mirror]` section
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let source = Url::parse(&config.mirror.source)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", config.mirror.source, e)))?;
        Ok(Self {
            source,
            directory: PathBuf::from(&config.mirror.directory),
            force: false,
            post_processing: PostProcessing::default(),
        })
    }
}

/// Counters for a completed mirror
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorReport {
    pub saved: usize,
    pub duplicates: usize,
    pub oversized: usize,
    pub failures: usize,
    pub manifest_path: PathBuf,
    pub conversion: ConversionReport,
}

/// What a mirror run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorOutcome {
    /// The directory existed and `force` was not set; nothing was fetched
    AlreadyExists(PathBuf),

    /// The mirror ran
    Completed(MirrorReport),
}

/// Mirrors the PDFs of one listing
///
/// The source listing must be fetchable; individual PDF failures are
/// logged and counted.
pub async fn run_mirror(
    config: &Config,
    options: &MirrorOptions,
    config_hash: Option<String>,
    extractor: &dyn DocumentExtractor,
) -> Result<MirrorOutcome, ArchiveError> {
    if options.directory.exists() && !options.force {
        tracing::info!(
            "Content already exists in {}; use --force to re-download",
            options.directory.display()
        );
        return Ok(MirrorOutcome::AlreadyExists(options.directory.clone()));
    }

    tracing::info!(
        "Mirroring {} to {}",
        options.source,
        options.directory.display()
    );
    if options.force {
        tracing::info!("Force flag is set. Existing content will be overwritten.");
    }
    std::fs::create_dir_all(&options.directory)?;

    let client = build_http_client(&config.user_agent)?;
    let mut robots = RobotsCache::new(config.crawler.obey_robots, &config.user_agent.crawler_name);
    let mut store = ContentStore::new(&options.directory, config.crawler.max_file_size);
    let save_delay = Duration::from_millis(config.crawler.save_delay_ms);
    let mut report = MirrorReport::default();

    if !robots.is_allowed(&client, &options.source).await {
        return Err(ArchiveError::Fetch {
            url: options.source.to_string(),
            reason: "disallowed by robots.txt".to_string(),
        });
    }

    let (final_url, body) = match fetch_listing(&client, &options.source).await {
        FetchResult::Listing { final_url, body } => (final_url, body),
        FetchResult::HttpError { status_code } => {
            return Err(ArchiveError::Fetch {
                url: options.source.to_string(),
                reason: format!("HTTP {}", status_code),
            })
        }
        FetchResult::NetworkError { error } => {
            return Err(ArchiveError::Fetch {
                url: options.source.to_string(),
                reason: error,
            })
        }
        FetchResult::File { .. } => {
            return Err(ArchiveError::Fetch {
                url: options.source.to_string(),
                reason: "expected a listing".to_string(),
            })
        }
    };

    let pdf_links: Vec<Url> = parse_listing(&body, &final_url)
        .into_iter()
        .filter(|link| link.href.to_ascii_lowercase().ends_with(".pdf"))
        .filter(|link| is_allowed_domain(&link.url, &config.crawler.allowed_domains))
        .map(|link| link.url)
        .collect();
    tracing::info!("Found {} PDFs on {}", pdf_links.len(), final_url);

    for url in &pdf_links {
        if !robots.is_allowed(&client, url).await {
            tracing::info!("URL {} disallowed by robots.txt", url);
            continue;
        }

        let (content_length, body) =
            match fetch_file(&client, url, config.crawler.max_file_size).await {
                FetchResult::File {
                    content_length,
                    body,
                    ..
                } => (content_length, body),
                other => {
                    tracing::warn!("Failed to download {}: {:?}", url, other);
                    report.failures += 1;
                    continue;
                }
            };

        match store.admit_flat(url, &body, content_length) {
            Ok(Admission::Saved { .. }) => {
                report.saved += 1;
                if !save_delay.is_zero() {
                    tokio::time::sleep(save_delay).await;
                }
            }
            Ok(Admission::Duplicate { .. }) => report.duplicates += 1,
            Ok(Admission::Oversized { .. }) => report.oversized += 1,
            Err(e) => {
                tracing::warn!("Failed to store {}: {}", url, e);
                report.failures += 1;
            }
        }
    }

    let manifest = MirrorManifest {
        source: options.source.to_string(),
        output_directory: options.directory.to_string_lossy().into_owned(),
        filter_rules: MirrorManifest::default_filter_rules(),
        mirror_date: Utc::now(),
        force_download: options.force,
        crawl_options: CrawlOptions {
            user_agent: config.user_agent.header_value(),
            download_delay_secs: save_delay.as_secs_f64(),
            obey_robots: config.crawler.obey_robots,
        },
        post_processing: options.post_processing,
        config_hash,
    };
    report.manifest_path = manifest.write(&options.directory)?;

    if options.post_processing.any() {
        tracing::info!("Performing post-processing...");
        report.conversion =
            convert_directory(&options.directory, options.post_processing, extractor)?;
    }

    tracing::info!(
        "Mirror finished: {} saved, {} duplicates, {} oversized, {} failures",
        report.saved,
        report.duplicates,
        report.oversized,
        report.failures
    );
    Ok(MirrorOutcome::Completed(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MANIFEST_FILE;
    use crate::summarize::PdfExtractor;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> Config {
        let mut config = Config::default();
        config.crawler.allowed_domains = vec!["127.0.0.1".to_string()];
        config.crawler.save_delay_ms = 0;
        config.crawler.obey_robots = false;
        config
    }

    fn options(source: &str, directory: PathBuf) -> MirrorOptions {
        MirrorOptions {
            source: Url::parse(source).unwrap(),
            directory,
            force: false,
            post_processing: PostProcessing::default(),
        }
    }

    #[tokio::test]
    async fn test_existing_directory_without_force() {
        let tmp = TempDir::new().unwrap();
        let opts = options("http://127.0.0.1:1/", tmp.path().to_path_buf());
        let outcome = run_mirror(&test_config(), &opts, None, &PdfExtractor::new())
            .await
            .unwrap();
        assert_eq!(outcome, MirrorOutcome::AlreadyExists(tmp.path().to_path_buf()));
        assert!(!tmp.path().join(MANIFEST_FILE).exists());
    }

    #[tokio::test]
    async fn test_mirrors_pdfs_and_writes_manifest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/talks/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a href="../">../</a>
                   <a href="one.pdf">one.pdf</a>
                   <a href="two.pdf">two.pdf</a>
                   <a href="copy.pdf">copy.pdf</a>
                   <a href="index.html">index.html</a>
                   <a href="notes.txt">notes.txt</a>"#,
            ))
            .mount(&server)
            .await;
        for (name, body) in [("one.pdf", "first"), ("two.pdf", "second"), ("copy.pdf", "first")] {
            Mock::given(method("GET"))
                .and(path(format!("/talks/{}", name)))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(body.as_bytes().to_vec()))
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/talks/notes.txt"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("mirror");
        let opts = options(&format!("{}/talks/", server.uri()), dir.clone());

        let outcome = run_mirror(&test_config(), &opts, Some("abc".to_string()), &PdfExtractor::new())
            .await
            .unwrap();

        let report = match outcome {
            MirrorOutcome::Completed(report) => report,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(report.saved, 2);
        assert_eq!(report.duplicates, 1);
        assert!(dir.join("one.pdf").exists());
        assert!(dir.join("two.pdf").exists());
        assert!(!dir.join("copy.pdf").exists());

        let manifest = MirrorManifest::read(&dir).unwrap();
        assert_eq!(manifest.source, format!("{}/talks/", server.uri()));
        assert_eq!(manifest.config_hash.as_deref(), Some("abc"));
        assert!(!manifest.force_download);
    }

    #[tokio::test]
    async fn test_pause_follows_saves_only() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/talks/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a href="one.pdf">one.pdf</a>
                   <a href="copy1.pdf">copy1.pdf</a>
                   <a href="copy2.pdf">copy2.pdf</a>
                   <a href="copy3.pdf">copy3.pdf</a>
                   <a href="big.pdf">big.pdf</a>"#,
            ))
            .mount(&server)
            .await;
        for name in ["one.pdf", "copy1.pdf", "copy2.pdf", "copy3.pdf"] {
            Mock::given(method("GET"))
                .and(path(format!("/talks/{}", name)))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(b"same".to_vec()))
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/talks/big.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64]))
            .mount(&server)
            .await;

        let mut config = test_config();
        config.crawler.save_delay_ms = 300;
        config.crawler.max_file_size = 32;

        let tmp = TempDir::new().unwrap();
        let opts = options(&format!("{}/talks/", server.uri()), tmp.path().join("mirror"));

        let started = std::time::Instant::now();
        let outcome = run_mirror(&config, &opts, None, &PdfExtractor::new())
            .await
            .unwrap();
        let elapsed = started.elapsed();

        let report = match outcome {
            MirrorOutcome::Completed(report) => report,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(report.saved, 1);
        assert_eq!(report.duplicates, 3);
        assert_eq!(report.oversized, 1);

        // one pause for the save; four more would push this past 1.5s
        assert!(elapsed >= Duration::from_millis(300), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(1200), "{:?}", elapsed);
    }

    #[tokio::test]
    async fn test_unreachable_source_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let opts = options("http://127.0.0.1:1/talks/", tmp.path().join("mirror"));
        let result = run_mirror(&test_config(), &opts, None, &PdfExtractor::new()).await;
        assert!(matches!(result, Err(ArchiveError::Fetch { .. })));
    }

    #[test]
    fn test_options_from_config() {
        let opts = MirrorOptions::from_config(&Config::default()).unwrap();
        assert_eq!(opts.directory, PathBuf::from("defcon32-media"));
        assert_eq!(
            opts.source.path(),
            "/DEF%20CON%2032/DEF%20CON%2032%20presentations/"
        );
    }
}
