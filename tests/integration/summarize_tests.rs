//! Integration tests for talk summarization
//!
//! Real PDFs are generated with lopdf, extracted with the PDF extractor and
//! summarized through a wiremock stand-in for a local Ollama server.

use defcon_archiver::config::{EndpointConfig, SummarizerConfig};
use defcon_archiver::summarize::{
    PdfExtractor, Provider, ProviderKind, SummarizationBatch, Summary, SummaryProvider,
};
use defcon_archiver::ConfigError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a one-page PDF showing `text` in Courier
fn make_pdf(text: &str, title: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources = dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    };

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![72.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
    });
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn summarizer_config(ollama_url: &str) -> SummarizerConfig {
    SummarizerConfig {
        provider: "ollama".to_string(),
        ollama: EndpointConfig::new(ollama_url, "llama2", ""),
        ..SummarizerConfig::default()
    }
}

async fn mount_ollama(server: &MockServer, summary: &Summary) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Ollama is running"))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "llama2",
            "response": serde_json::to_string(summary).unwrap(),
            "done": true
        })))
        .mount(server)
        .await;
}

fn write_template(dir: &Path) -> std::path::PathBuf {
    let template = dir.join("prompt_defcon_talk_summary_pqrst.tmpl");
    fs::write(&template, "Summarize this DEF CON talk as JSON:\n{{CONTENT}}\n").unwrap();
    template
}

#[test]
fn test_pdf_extraction() {
    let content = PdfExtractor::new()
        .extract_bytes(&make_pdf("Hello talk", "Greeting"))
        .unwrap();

    assert!(content.text.contains("Hello talk"));
    assert_eq!(content.metadata.get("Title").map(String::as_str), Some("Greeting"));
    assert_eq!(content.metadata.get("pages").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn test_batch_one_good_one_corrupt_pdf() {
    let server = MockServer::start().await;
    let expected = Summary {
        title: "Hello talk".to_string(),
        main_points: vec!["greets the audience".to_string()],
        technical_details: vec![],
        implications: vec!["implication: none".to_string()],
    };
    mount_ollama(&server, &expected).await;

    let tmp = TempDir::new().unwrap();
    let pdf_dir = tmp.path().join("pdfs");
    fs::create_dir_all(&pdf_dir).unwrap();
    fs::write(pdf_dir.join("hello.pdf"), make_pdf("Hello talk", "Hello")).unwrap();
    fs::write(pdf_dir.join("corrupt.pdf"), b"%PDF-1.4 truncated garbage").unwrap();
    let template = write_template(tmp.path());
    let output_dir = tmp.path().join("summaries");

    let provider = Provider::from_config(&summarizer_config(&server.uri())).unwrap();
    assert_eq!(provider.kind(), ProviderKind::Ollama);

    let report = SummarizationBatch::new(&pdf_dir, &output_dir, &template)
        .run(&PdfExtractor::new(), Some(&provider))
        .await
        .unwrap();

    assert_eq!(report.processed, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors, 0);

    let written: Vec<String> = fs::read_dir(&output_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(written, vec!["hello_summary.json"]);

    let summary: Summary =
        serde_json::from_str(&fs::read_to_string(output_dir.join("hello_summary.json")).unwrap())
            .unwrap();
    assert_eq!(summary, expected);
}

#[tokio::test]
async fn test_batch_aborts_when_ollama_is_down() {
    let tmp = TempDir::new().unwrap();
    let pdf_dir = tmp.path().join("pdfs");
    fs::create_dir_all(&pdf_dir).unwrap();
    fs::write(pdf_dir.join("hello.pdf"), make_pdf("Hello talk", "Hello")).unwrap();
    let template = write_template(tmp.path());
    let output_dir = tmp.path().join("summaries");

    let provider = Provider::from_config(&summarizer_config("http://127.0.0.1:1")).unwrap();
    let result = SummarizationBatch::new(&pdf_dir, &output_dir, &template)
        .run(&PdfExtractor::new(), Some(&provider))
        .await;

    assert!(matches!(result, Err(ConfigError::EndpointUnreachable { .. })));
    assert!(!output_dir.join("hello_summary.json").exists());
}

#[tokio::test]
async fn test_batch_dry_run() {
    let tmp = TempDir::new().unwrap();
    let pdf_dir = tmp.path().join("pdfs");
    fs::create_dir_all(&pdf_dir).unwrap();
    fs::write(pdf_dir.join("hello.pdf"), make_pdf("Hello talk", "Hello")).unwrap();
    let template = write_template(tmp.path());
    let output_dir = tmp.path().join("summaries");

    let report = SummarizationBatch::new(&pdf_dir, &output_dir, &template)
        .run(&PdfExtractor::new(), None)
        .await
        .unwrap();

    assert_eq!(report.processed, 1);
    assert!(!output_dir.exists());
}
