//! defcon-archiver main entry point
//!
//! This is the command-line interface for crawling the DEF CON media
//! archive, mirroring a single listing and summarizing downloaded talks.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use defcon_archiver::config::{load_or_default, validate, Config};
use defcon_archiver::crawler::{crawl, run_mirror, MirrorOptions, MirrorOutcome};
use defcon_archiver::output::print_statistics;
use defcon_archiver::storage::{build_master_index, PostProcessing};
use defcon_archiver::summarize::{PdfExtractor, Provider, SummarizationBatch, SummaryProvider};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// defcon-archiver: mirror the DEF CON media archive and summarize its talks
///
/// Crawls the archive listing, downloads conference material into
/// per-event directories (deduplicated by content), and turns talk PDFs
/// into structured summaries through a configurable LLM provider.
#[derive(Parser, Debug)]
#[command(name = "defcon-archiver")]
#[command(version)]
#[command(about = "Archive DEF CON media and summarize talks", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose diagnostics for every link decision
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the archive into per-event directories
    Crawl(CrawlArgs),

    /// Summarize a directory of talk PDFs
    Summarize(SummarizeArgs),

    /// Mirror the PDFs of a single listing into a flat directory
    Mirror(MirrorArgs),

    /// Rebuild master_index.txt from the archive tree
    Index {
        /// Archive root (overrides output.root)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Validate the configuration and print the effective settings
    CheckConfig,
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Archive root (overrides output.root)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Largest Content-Length accepted, in bytes
    #[arg(long)]
    max_file_size: Option<u64>,

    /// Listing to start from
    #[arg(long)]
    start_url: Option<String>,

    /// Treat files already in the archive as seen
    #[arg(long)]
    dedup_existing: bool,

    /// Do not fetch or obey robots.txt
    #[arg(long)]
    no_robots: bool,
}

#[derive(Args, Debug)]
struct SummarizeArgs {
    /// Directory containing the talk PDFs
    #[arg(long)]
    pdf_dir: PathBuf,

    /// Prompt template with a {{CONTENT}} placeholder
    #[arg(long)]
    template_path: Option<PathBuf>,

    /// Where summaries are written
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// cohere, ollama, openai or claude
    #[arg(long)]
    provider: Option<String>,

    /// Extract text only; call no provider and write nothing
    #[arg(long)]
    no_summary: bool,
}

#[derive(Args, Debug)]
struct MirrorArgs {
    /// Directory to store mirrored content
    #[arg(long)]
    mirror_dir: Option<PathBuf>,

    /// Listing to mirror
    #[arg(long)]
    source: Option<String>,

    /// Re-download even if the directory exists
    #[arg(long)]
    force: bool,

    /// Convert PDFs to plain text
    #[arg(long)]
    to_text: bool,

    /// Convert PDFs to Markdown
    #[arg(long)]
    to_markdown: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet, cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let (mut config, config_hash) =
        load_or_default(cli.config.as_deref()).context("Failed to load configuration")?;
    match (&cli.config, &config_hash) {
        (Some(path), Some(hash)) => tracing::info!(
            "Configuration loaded from {} (hash: {})",
            path.display(),
            hash
        ),
        _ => tracing::info!("No configuration file given, using defaults"),
    }
    config.debug |= cli.debug;

    match cli.command {
        Command::Crawl(args) => {
            apply_crawl_args(&mut config, &args);
            validate(&config)?;
            handle_crawl(&config).await
        }
        Command::Summarize(args) => {
            apply_summarize_args(&mut config, &args);
            validate(&config)?;
            handle_summarize(&config, &args.pdf_dir, args.no_summary).await
        }
        Command::Mirror(args) => {
            if let Some(source) = &args.source {
                config.mirror.source = source.clone();
            }
            if let Some(dir) = &args.mirror_dir {
                config.mirror.directory = dir.to_string_lossy().into_owned();
            }
            validate(&config)?;
            handle_mirror(&config, &args, config_hash).await
        }
        Command::Index { output_dir } => {
            if let Some(dir) = output_dir {
                config.output.root = dir.to_string_lossy().into_owned();
            }
            validate(&config)?;
            let path = build_master_index(Path::new(&config.output.root))?;
            println!("Master index written to {}", path.display());
            Ok(())
        }
        Command::CheckConfig => {
            validate(&config)?;
            handle_check_config(&config);
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG`, when set, takes precedence over the flags.
fn setup_logging(verbose: u8, quiet: bool, debug: bool) {
    let default_filter = if quiet {
        "error"
    } else {
        match (verbose, debug) {
            (0, false) => "defcon_archiver=info,warn",
            (0, true) | (1, _) => "defcon_archiver=debug,info",
            _ => "defcon_archiver=trace,debug",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn apply_crawl_args(config: &mut Config, args: &CrawlArgs) {
    if let Some(dir) = &args.output_dir {
        config.output.root = dir.to_string_lossy().into_owned();
    }
    if let Some(size) = args.max_file_size {
        config.crawler.max_file_size = size;
    }
    if let Some(url) = &args.start_url {
        config.crawler.start_url = url.clone();
    }
    if args.dedup_existing {
        config.crawler.dedup_existing = true;
    }
    if args.no_robots {
        config.crawler.obey_robots = false;
    }
}

fn apply_summarize_args(config: &mut Config, args: &SummarizeArgs) {
    if let Some(path) = &args.template_path {
        config.summarizer.template_path = path.to_string_lossy().into_owned();
    }
    if let Some(dir) = &args.output_dir {
        config.summarizer.output_dir = dir.to_string_lossy().into_owned();
    }
    if let Some(provider) = &args.provider {
        config.summarizer.provider = provider.clone();
    }
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} into {} (max file size {} bytes)",
        config.crawler.start_url,
        config.output.root,
        config.crawler.max_file_size
    );

    let stats = crawl(config).await.context("Crawl failed")?;
    print_statistics(&stats);
    Ok(())
}

async fn handle_summarize(config: &Config, pdf_dir: &Path, no_summary: bool) -> anyhow::Result<()> {
    let batch = SummarizationBatch::new(
        pdf_dir,
        Path::new(&config.summarizer.output_dir),
        Path::new(&config.summarizer.template_path),
    );
    let extractor = PdfExtractor::new();

    let report = if no_summary {
        tracing::info!("Extraction only, no summaries will be generated");
        batch.run(&extractor, None).await?
    } else {
        let provider = Provider::from_config(&config.summarizer)?;
        tracing::info!("Summarizing with {}", provider.kind());
        batch.run(&extractor, Some(&provider)).await?
    };

    println!(
        "Processed {} PDFs ({} skipped, {} failed writes, {} error summaries)",
        report.processed, report.skipped, report.failed_writes, report.errors
    );
    if !no_summary {
        println!("All summaries have been saved to: {}", config.summarizer.output_dir);
    }
    Ok(())
}

async fn handle_mirror(
    config: &Config,
    args: &MirrorArgs,
    config_hash: Option<String>,
) -> anyhow::Result<()> {
    let mut options = MirrorOptions::from_config(config)?;
    options.force = args.force;
    options.post_processing = PostProcessing {
        to_markdown: args.to_markdown,
        to_text: args.to_text,
    };

    match run_mirror(config, &options, config_hash, &PdfExtractor::new()).await? {
        MirrorOutcome::AlreadyExists(dir) => {
            println!("Content already exists in {}", dir.display());
            println!("Use --force to re-download existing content");
        }
        MirrorOutcome::Completed(report) => {
            println!(
                "Mirrored {} PDFs ({} duplicates, {} oversized, {} failures)",
                report.saved, report.duplicates, report.oversized, report.failures
            );
            println!("Manifest file generated at {}", report.manifest_path.display());
            if options.post_processing.any() {
                println!(
                    "Generated {} text and {} Markdown files ({} skipped)",
                    report.conversion.text_files,
                    report.conversion.markdown_files,
                    report.conversion.skipped
                );
            }
        }
    }
    Ok(())
}

/// Prints the effective configuration without touching the network
fn handle_check_config(config: &Config) {
    println!("=== defcon-archiver configuration ===\n");

    println!("Crawler:");
    println!("  Start URL: {}", config.crawler.start_url);
    println!("  Allowed domains: {}", config.crawler.allowed_domains.join(", "));
    println!("  Max file size: {} bytes", config.crawler.max_file_size);
    println!("  Save delay: {}ms", config.crawler.save_delay_ms);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Obey robots.txt: {}", config.crawler.obey_robots);
    println!("  Dedup existing files: {}", config.crawler.dedup_existing);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Archive root: {}", config.output.root);

    println!("\nMirror:");
    println!("  Source: {}", config.mirror.source);
    println!("  Directory: {}", config.mirror.directory);

    println!("\nSummarizer:");
    println!("  Provider: {}", config.summarizer.provider);
    println!("  Template: {}", config.summarizer.template_path);
    println!("  Output dir: {}", config.summarizer.output_dir);
    println!("  Timeout: {}s", config.summarizer.timeout_secs);

    println!("\nDebug: {}", config.debug);
    println!("\n✓ Configuration is valid");
}
