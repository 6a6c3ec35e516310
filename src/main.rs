//! Layered-Crawler main entry point
//!
//! This is the command-line interface for the layered crawler.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use layered_crawler::config::{load_config_with_hash, validate, Config, CrawlStrategy};
use layered_crawler::output::{
    generate_markdown_summary, print_report, print_statistics, CrawlSummary,
};
use layered_crawler::WebCrawler;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Layered-Crawler: a concurrent, depth-bounded web crawler
///
/// Crawls breadth-first from URL, fetching each page at most once, and prints
/// every downloaded URL followed by the URLs that failed.
#[derive(Parser, Debug)]
#[command(name = "layered-crawler")]
#[command(version)]
#[command(about = "A concurrent, depth-bounded web crawler", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// Number of BFS layers to explore, including the seed
    #[arg(value_name = "DEPTH")]
    depth: Option<u32>,

    /// Maximum number of simultaneous downloads
    #[arg(value_name = "DOWNLOADS")]
    downloads: Option<usize>,

    /// Maximum number of simultaneous link extractions
    #[arg(value_name = "EXTRACTORS")]
    extractors: Option<usize>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Crawl strategy: layered or counter
    #[arg(long)]
    strategy: Option<CrawlStrategy>,

    /// Write a markdown summary to this path
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

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

    let (config, config_hash) = load_configuration(&cli)?;
    handle_crawl(&cli, config, config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("layered_crawler=info,warn"),
            1 => EnvFilter::new("layered_crawler=debug,info"),
            2 => EnvFilter::new("layered_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the config file if given, then applies command-line overrides
fn load_configuration(cli: &Cli) -> anyhow::Result<(Config, Option<String>)> {
    let (mut config, hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    if let Some(depth) = cli.depth {
        config.crawler.depth = depth;
    }
    if let Some(downloads) = cli.downloads {
        config.crawler.downloaders = downloads;
    }
    if let Some(extractors) = cli.extractors {
        config.crawler.extractors = extractors;
    }
    if let Some(strategy) = cli.strategy {
        config.crawler.strategy = strategy;
    }
    if let Some(summary) = &cli.summary {
        config.output.summary_path = Some(summary.display().to_string());
    }

    validate(&config).context("invalid configuration")?;
    Ok((config, hash))
}

/// Handles the main crawl operation
async fn handle_crawl(cli: &Cli, config: Config, config_hash: Option<String>) -> anyhow::Result<()> {
    let crawler = Arc::new(WebCrawler::from_config(&config).context("failed to start crawler")?);

    // Ctrl-C stops the crawl and keeps whatever finished so far
    let interrupt = {
        let crawler = Arc::clone(&crawler);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, stopping crawl");
                crawler.close();
            }
        })
    };

    let started = Utc::now();
    let result = crawler.crawl(&cli.url, config.crawler.depth).await?;
    let finished = Utc::now();
    let interrupted = crawler.is_closed();

    interrupt.abort();
    crawler.close();

    print_report(&result);

    let mut summary =
        CrawlSummary::from_result(&cli.url, config.crawler.depth, &result, started, finished);
    summary.strategy = config.crawler.strategy.to_string();
    summary.config_hash = config_hash;
    summary.completed = !interrupted;

    if !cli.quiet {
        print_statistics(&summary);
    }

    if let Some(path) = &config.output.summary_path {
        generate_markdown_summary(&summary, Path::new(path))
            .with_context(|| format!("failed to write summary to {}", path))?;
        tracing::info!("Summary written to: {}", path);
    }

    Ok(())
}
