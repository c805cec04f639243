//! Stalwart main entry point
//!
//! This is the command-line interface for the Stalwart crawler.

use anyhow::Context;
use clap::Parser;
use stalwart_crawl::config::load_config_with_hash;
use stalwart_crawl::output::{export_results, print_statistics, CrawlStatistics, ExportFormat};
use stalwart_crawl::rotation::load_proxy_file;
use stalwart_crawl::storage::{open_checkpoint, CheckpointStore};
use stalwart_crawl::CrawlEngine;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Stalwart: a resumable, challenge-aware web crawler
///
/// Stalwart walks a site breadth-first from a seed URL, extracting emails,
/// phone numbers and links. Pages guarded by anti-bot challenges are
/// re-fetched in a headless browser. Progress is checkpointed after every
/// page, so an interrupted crawl picks up where it stopped.
#[derive(Parser, Debug)]
#[command(name = "stalwart-crawl")]
#[command(version = "1.0.0")]
#[command(about = "A resumable, challenge-aware web crawler", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(long, default_value = "config/config.toml")]
    config: PathBuf,

    /// File with one proxy address per line
    #[arg(long, value_name = "PATH")]
    proxy_file: Option<PathBuf>,

    /// Checkpoint file used to resume interrupted crawls
    #[arg(long, default_value = "data/checkpoints/default.json")]
    checkpoint: PathBuf,

    /// Export format for the results
    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    format: ExportFormat,

    /// Export path (defaults to data/exports/results.<format>)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Delete any existing checkpoint and start over
    #[arg(long)]
    fresh: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let proxy_entries = match &cli.proxy_file {
        Some(path) => load_proxy_file(path)?,
        None => Vec::new(),
    };

    let engine = CrawlEngine::new(config)?
        .with_proxy_file_entries(proxy_entries)
        .with_config_hash(config_hash);
    tracing::info!(
        "{} user agents, {} proxies available",
        engine.config().user_agents.len(),
        engine.proxies().len()
    );

    if cli.fresh {
        tracing::info!("Starting fresh crawl (ignoring previous checkpoint)");
        open_checkpoint(&cli.checkpoint)
            .clear()
            .context("failed to clear checkpoint")?;
    }

    let results = engine
        .run(&cli.url, &cli.checkpoint)
        .await
        .context("crawl aborted")?;

    let output = cli.output.unwrap_or_else(|| cli.format.default_path());
    export_results(&results, cli.format, &output)
        .with_context(|| format!("failed to export results to {}", output.display()))?;

    println!("Scraping completed successfully");
    print_statistics(&CrawlStatistics::from_results(&results));

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("stalwart_crawl=info,warn"),
            1 => EnvFilter::new("stalwart_crawl=debug,info"),
            2 => EnvFilter::new("stalwart_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
