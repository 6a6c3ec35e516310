//! Crawler module for concurrent, depth-bounded crawling
//!
//! This module contains the core crawling logic, including:
//! - Fixed-size worker pools for downloads and link extraction
//! - The shared frontier of claimed URLs and per-URL errors
//! - Outstanding-work counting and per-depth layer barriers
//! - Overall crawl orchestration

mod barrier;
mod counter;
mod frontier;
mod orchestrator;
mod pool;

pub use barrier::LayerBarrier;
pub use counter::WorkCounter;
pub use frontier::{CrawlResult, Frontier};
pub use orchestrator::WebCrawler;
pub use pool::{Job, WorkerPool};

pub use crate::config::CrawlStrategy;

use crate::config::Config;
use crate::CrawlError;

/// Runs a single crawl over HTTP using `config`
///
/// Builds an [`HttpDownloader`](crate::HttpDownloader)-backed crawler, crawls
/// `seed` to the configured depth and closes the crawler afterwards.
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - The URL to start from
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Crawl completed
/// * `Err(CrawlError)` - The crawler could not be built
pub async fn crawl(config: &Config, seed: &str) -> Result<CrawlResult, CrawlError> {
    let crawler = WebCrawler::from_config(config)?;
    let result = crawler.crawl(seed, config.crawler.depth).await;
    crawler.close();
    result
}
