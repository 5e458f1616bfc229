//! Integration tests for the archive crawl
//!
//! These tests use wiremock to serve an Apache-style listing tree and run
//! the full crawl cycle end-to-end into a temporary archive root.

use defcon_archiver::config::Config;
use defcon_archiver::crawler::Coordinator;
use defcon_archiver::storage::MetadataLedger;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PDF_A: &[u8] = b"%PDF-1.4 talk a";

fn listing(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!("<a href=\"{}\">{}</a>\n", href, href))
        .collect();
    format!(
        "<html><head><title>Index</title></head><body><pre>\n{}</pre></body></html>",
        anchors
    )
}

async fn mount_page(server: &MockServer, at: &str, links: &[&str]) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(links)))
        .mount(server)
        .await;
}

async fn mount_file(server: &MockServer, at: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

/// Serves a small archive:
///
/// ```text
/// /                      DEF CON 30/, DEF CON 31/, Conference Programs/, other/, offsite link
/// /DEF CON 30/           a.pdf, b.flac, dup.pdf (same bytes as a.pdf), slides/, ../, readme.html
/// /DEF CON 30/slides/    c.txt, ../
/// /DEF CON 31/           big.pdf (over the limit), d.opus
/// /Conference Programs/  prog.pdf (never fetched: no event name)
/// ```
async fn mount_archive(server: &MockServer) {
    mount_page(
        server,
        "/",
        &[
            "?C=N;O=D",
            "DEF%20CON%2030/",
            "DEF%20CON%2031/",
            "Conference%20Programs/",
            "other/",
            "https://mirror.example.com/DEF%20CON%2099/",
        ],
    )
    .await;

    mount_page(
        server,
        "/DEF%20CON%2030/",
        &["../", "a.pdf", "b.flac", "dup.pdf", "slides/", "readme.html", "?C=M;O=A"],
    )
    .await;
    mount_file(server, "/DEF%20CON%2030/a.pdf", PDF_A).await;
    mount_file(server, "/DEF%20CON%2030/b.flac", b"fLaC audio").await;
    mount_file(server, "/DEF%20CON%2030/dup.pdf", PDF_A).await;

    mount_page(server, "/DEF%20CON%2030/slides/", &["../", "c.txt"]).await;
    mount_file(server, "/DEF%20CON%2030/slides/c.txt", b"notes").await;

    mount_page(server, "/DEF%20CON%2031/", &["big.pdf", "d.opus"]).await;
    mount_file(server, "/DEF%20CON%2031/big.pdf", &[7u8; 64]).await;
    mount_file(server, "/DEF%20CON%2031/d.opus", b"OggS opus").await;

    mount_page(server, "/Conference%20Programs/", &["prog.pdf"]).await;
    Mock::given(method("GET"))
        .and(path("/Conference%20Programs/prog.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"program".to_vec()))
        .expect(0)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/other/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

fn test_config(server: &MockServer, root: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.start_url = format!("{}/", server.uri());
    config.crawler.allowed_domains = vec!["127.0.0.1".to_string()];
    config.crawler.max_file_size = 32;
    config.crawler.save_delay_ms = 0;
    config.crawler.obey_robots = false;
    config.output.root = root.to_string_lossy().into_owned();
    config
}

#[tokio::test]
async fn test_full_archive_crawl() {
    let server = MockServer::start().await;
    mount_archive(&server).await;

    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("archive");
    let config = test_config(&server, &root);

    let mut coordinator = Coordinator::new(&config).expect("Failed to create coordinator");
    let stats = coordinator.run().await.expect("Crawl failed");

    // Files land in their event directories, duplicates and oversized files do not
    let dc30 = root.join("DEF CON 30");
    let dc31 = root.join("DEF CON 31");
    assert_eq!(fs::read(dc30.join("a.pdf")).unwrap(), PDF_A);
    assert!(dc30.join("b.flac").exists());
    assert!(dc30.join("c.txt").exists());
    assert!(!dc30.join("dup.pdf").exists());
    assert!(!dc30.join("readme.html").exists());
    assert!(dc31.join("d.opus").exists());
    assert!(!dc31.join("big.pdf").exists());
    assert!(!root.join("Conference Programs").exists());

    // Ledgers list saved files in save order
    let ledger = MetadataLedger::new(&root);
    assert_eq!(
        ledger.entries("DEF CON 30").unwrap(),
        vec!["a.pdf", "b.flac", "c.txt"]
    );
    assert_eq!(ledger.entries("DEF CON 31").unwrap(), vec!["d.opus"]);

    // Master index mirrors the tree
    let index = fs::read_to_string(root.join("master_index.txt")).unwrap();
    assert_eq!(
        index,
        "DEF CON 30:\n  a.pdf\n  b.flac\n  c.txt\n\nDEF CON 31:\n  d.opus\n\n"
    );

    // In-memory records and statistics agree
    let events = coordinator.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events["DEF CON 30"].files, vec!["a.pdf", "b.flac", "c.txt"]);

    assert_eq!(stats.files_saved, 4);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(stats.oversized, 1);
    assert_eq!(stats.pages_without_event, 1);
    assert_eq!(stats.offsite_skipped, 1);
    assert_eq!(stats.listings_fetched, 5);
    assert_eq!(stats.events, 2);
    assert_eq!(stats.fetch_failures, 0);
    assert!(stats.finished_at.is_some());
}

#[tokio::test]
async fn test_depth_limit_stops_nested_listings() {
    let server = MockServer::start().await;
    mount_archive(&server).await;

    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("archive");
    let mut config = test_config(&server, &root);
    config.crawler.max_depth = 1;

    let stats = Coordinator::new(&config).unwrap().run().await.unwrap();

    assert!(root.join("DEF CON 30").join("a.pdf").exists());
    assert!(!root.join("DEF CON 30").join("c.txt").exists());
    assert_eq!(stats.files_saved, 3);
}

#[tokio::test]
async fn test_dedup_existing_skips_files_from_previous_run() {
    let server = MockServer::start().await;
    mount_archive(&server).await;

    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("archive");
    let old = root.join("DEF CON 29");
    fs::create_dir_all(&old).unwrap();
    fs::write(old.join("old.pdf"), PDF_A).unwrap();

    let mut config = test_config(&server, &root);
    config.crawler.dedup_existing = true;

    let stats = Coordinator::new(&config).unwrap().run().await.unwrap();

    assert!(!root.join("DEF CON 30").join("a.pdf").exists());
    assert_eq!(stats.duplicates, 2);

    // the index includes what the earlier run left behind
    let index = fs::read_to_string(root.join("master_index.txt")).unwrap();
    assert!(index.starts_with("DEF CON 29:\n  old.pdf\n\n"));
}

#[tokio::test]
async fn test_second_run_without_dedup_rewrites_files() {
    let server = MockServer::start().await;
    mount_archive(&server).await;

    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("archive");
    let config = test_config(&server, &root);

    Coordinator::new(&config).unwrap().run().await.unwrap();
    let second = Coordinator::new(&config).unwrap().run().await.unwrap();

    // the seen set starts empty each run, so files are saved again
    assert_eq!(second.files_saved, 4);
    let ledger = MetadataLedger::new(&root);
    assert_eq!(ledger.entries("DEF CON 31").unwrap(), vec!["d.opus", "d.opus"]);
}

#[tokio::test]
async fn test_save_delay_applies_to_saved_files_only() {
    let server = MockServer::start().await;
    mount_archive(&server).await;

    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("archive");
    let mut config = test_config(&server, &root);
    config.crawler.save_delay_ms = 400;

    let started = Instant::now();
    let stats = Coordinator::new(&config).unwrap().run().await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(stats.files_saved, 4);
    assert_eq!(stats.duplicates + stats.oversized, 2);

    // four pauses; pausing after the two rejections too would take 2.4s
    assert!(elapsed >= Duration::from_millis(1600), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(2300), "{:?}", elapsed);
}

#[tokio::test]
async fn test_robots_disallow_everything() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&["DEF%20CON%2030/"])))
        .expect(0)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("archive");
    let mut config = test_config(&server, &root);
    config.crawler.obey_robots = true;

    let stats = Coordinator::new(&config).unwrap().run().await.unwrap();

    assert_eq!(stats.robots_denied, 1);
    assert_eq!(stats.listings_fetched, 0);
    assert_eq!(
        fs::read_to_string(root.join("master_index.txt")).unwrap(),
        ""
    );
}

#[tokio::test]
async fn test_unreachable_root_still_writes_index() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("archive");

    let mut config = Config::default();
    config.crawler.start_url = "http://127.0.0.1:1/".to_string();
    config.crawler.allowed_domains = vec!["127.0.0.1".to_string()];
    config.crawler.obey_robots = false;
    config.output.root = root.to_string_lossy().into_owned();

    let stats = Coordinator::new(&config).unwrap().run().await.unwrap();
    assert_eq!(stats.fetch_failures, 1);
    assert!(root.join("master_index.txt").exists());
}

#[tokio::test]
async fn test_encoded_separators_in_event_listing_stay_under_root() {
    let server = MockServer::start().await;
    mount_page(&server, "/", &["DEF%20CON%20%2F..%2F..%2Fescaped/"]).await;
    mount_page(&server, "/DEF%20CON%20%2F..%2F..%2Fescaped/", &["a.pdf"]).await;
    mount_file(&server, "/DEF%20CON%20%2F..%2F..%2Fescaped/a.pdf", PDF_A).await;

    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("archive");
    let config = test_config(&server, &root);

    let stats = Coordinator::new(&config).unwrap().run().await.unwrap();
    assert_eq!(stats.files_saved, 1);

    let event = "DEF CON _.._.._escaped";
    assert_eq!(fs::read(root.join(event).join("a.pdf")).unwrap(), PDF_A);
    assert_eq!(
        MetadataLedger::new(&root).entries(event).unwrap(),
        vec!["a.pdf"]
    );

    // nothing was written next to the archive root
    let siblings: Vec<_> = fs::read_dir(tmp.path()).unwrap().collect();
    assert_eq!(siblings.len(), 1);
}
