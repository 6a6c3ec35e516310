//! Crawl orchestration
//!
//! [`WebCrawler`] owns the two worker pools and the downloader. Each call to
//! [`WebCrawler::crawl`] builds a fresh `Session` holding the per-crawl
//! frontier, outstanding-work counter and layer barrier, then expands the
//! link graph breadth-first:
//!
//! 1. `visit` claims a URL and queues its download
//! 2. the download job fetches the page (or records a fetch error)
//! 3. under the layered strategy the page waits for the parent layer to drain
//! 4. leaves finish immediately; other pages queue an extraction job
//! 5. the extraction job visits every discovered link with one less depth
//!
//! Every claimed URL holds one unit of outstanding work until it reaches a
//! terminal path. `crawl` returns once the count drops to zero or the crawler
//! is closed.

use crate::config::{Config, CrawlStrategy, CrawlerConfig};
use crate::crawler::barrier::LayerBarrier;
use crate::crawler::counter::WorkCounter;
use crate::crawler::frontier::{CrawlResult, Frontier};
use crate::crawler::pool::WorkerPool;
use crate::download::{Document, Downloader, HttpDownloader};
use crate::state::PageState;
use crate::{CrawlError, DownloadError};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

#[derive(Debug)]
struct Pools {
    downloads: WorkerPool,
    extractors: WorkerPool,
}

/// Concurrent, depth-bounded web crawler
///
/// # Example
///
/// ```
/// use layered_crawler::config::CrawlerConfig;
/// use layered_crawler::{StaticDownloader, WebCrawler};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> layered_crawler::Result<()> {
/// let downloader = Arc::new(
///     StaticDownloader::new()
///         .page("https://a.test/", ["https://b.test/"])
///         .page("https://b.test/", ["https://a.test/"]),
/// );
/// let crawler = WebCrawler::new(downloader, &CrawlerConfig::default())?;
///
/// let result = crawler.crawl("https://a.test/", 2).await?;
/// assert_eq!(result.downloaded, vec!["https://a.test/", "https://b.test/"]);
///
/// crawler.close();
/// # Ok(())
/// # }
/// ```
pub struct WebCrawler {
    downloader: Arc<dyn Downloader>,
    pools: Arc<Pools>,
    strategy: CrawlStrategy,
    shutdown: watch::Sender<bool>,
}

impl WebCrawler {
    /// Creates a crawler and starts both worker pools
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Returns
    ///
    /// * `Ok(WebCrawler)` - Pools are running
    /// * `Err(CrawlError)` - A pool size is zero or no runtime is available
    pub fn new(
        downloader: Arc<dyn Downloader>,
        config: &CrawlerConfig,
    ) -> Result<Self, CrawlError> {
        let pools = Pools {
            downloads: WorkerPool::new("download", config.downloaders)?,
            extractors: WorkerPool::new("extract", config.extractors)?,
        };
        let (shutdown, _) = watch::channel(false);

        tracing::info!(
            "Crawler ready: {} downloaders, {} extractors, {} strategy",
            pools.downloads.size(),
            pools.extractors.size(),
            config.strategy
        );

        Ok(Self {
            downloader,
            pools: Arc::new(pools),
            strategy: config.strategy,
            shutdown,
        })
    }

    /// Creates a crawler backed by [`HttpDownloader`]
    pub fn from_config(config: &Config) -> Result<Self, CrawlError> {
        let downloader = HttpDownloader::new(config)?;
        Self::new(Arc::new(downloader), &config.crawler)
    }

    pub fn strategy(&self) -> CrawlStrategy {
        self.strategy
    }

    pub fn is_closed(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Crawls from `seed`, exploring `depth` BFS layers including the seed
    ///
    /// Per-URL failures end up in [`CrawlResult::errors`]; they never fail the
    /// crawl as a whole. If [`close`](Self::close) is called while this is
    /// running, the partial result gathered so far is returned.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - Downloaded URLs and per-URL errors
    /// * `Err(CrawlError::Closed)` - The crawler was closed before the call
    pub async fn crawl(&self, seed: &str, depth: u32) -> Result<CrawlResult, CrawlError> {
        if self.is_closed() {
            return Err(CrawlError::Closed);
        }
        if depth == 0 {
            return Ok(CrawlResult::default());
        }

        let started = Instant::now();
        tracing::info!("Starting crawl of {} with depth {}", seed, depth);

        let session = Arc::new(Session::new(self, depth));
        session.visit(seed.to_string(), depth);
        // Release the root unit held since the session was created
        session.work.arrive();

        let finished = tokio::select! {
            _ = session.work.wait_idle() => true,
            _ = wait_closed(self.shutdown.subscribe()) => false,
        };

        let result = session.frontier.snapshot();
        if finished {
            tracing::info!(
                "Crawl of {} completed: {} claimed, {} downloaded, {} errors in {:?}",
                seed,
                session.frontier.claimed(),
                result.downloaded.len(),
                result.errors.len(),
                started.elapsed()
            );
        } else {
            tracing::warn!(
                "Crawler closed during crawl of {}; returning partial result ({} URLs still in flight)",
                seed,
                session.work.pending()
            );
        }

        Ok(result)
    }

    /// Stops both pools and wakes any in-flight crawl
    ///
    /// Queued work is abandoned. Calling this more than once is a no-op.
    pub fn close(&self) {
        if self.shutdown.send_replace(true) {
            return;
        }
        self.pools.downloads.shutdown();
        self.pools.extractors.shutdown();
        tracing::info!("Crawler closed");
    }
}

impl Drop for WebCrawler {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for WebCrawler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebCrawler")
            .field("pools", &self.pools)
            .field("strategy", &self.strategy)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Resolves once the crawler is closed or dropped
async fn wait_closed(mut shutdown: watch::Receiver<bool>) {
    loop {
        let closed = *shutdown.borrow_and_update();
        if closed || shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// State of one `crawl` call
struct Session {
    frontier: Frontier,
    work: WorkCounter,
    /// Present only under the layered strategy
    barrier: Option<LayerBarrier>,
    downloader: Arc<dyn Downloader>,
    pools: Arc<Pools>,
    shutdown: watch::Receiver<bool>,
}

impl Session {
    fn new(crawler: &WebCrawler, depth: u32) -> Self {
        Self {
            frontier: Frontier::new(),
            // One unit for the root, held by `crawl` until the seed is visited
            work: WorkCounter::new(1),
            barrier: match crawler.strategy {
                CrawlStrategy::Layered => Some(LayerBarrier::new(depth)),
                CrawlStrategy::Counter => None,
            },
            downloader: Arc::clone(&crawler.downloader),
            pools: Arc::clone(&crawler.pools),
            shutdown: crawler.shutdown.subscribe(),
        }
    }

    /// Claims `url` and queues its download
    fn visit(self: &Arc<Self>, url: String, depth: u32) {
        if depth == 0 || !self.frontier.try_claim(&url) {
            return;
        }

        self.work.register();
        if let Some(barrier) = &self.barrier {
            barrier.enter(depth);
        }
        tracing::debug!("Claimed {} at depth {}", url, depth);

        let job = Arc::clone(self).download(url.clone(), depth);
        if let Err(e) = self.pools.downloads.submit(Box::pin(job)) {
            tracing::debug!("Not downloading {}: {}", url, e);
            self.release(depth);
        }
    }

    async fn download(self: Arc<Self>, url: String, depth: u32) {
        let fetched = AssertUnwindSafe(self.downloader.fetch(&url))
            .catch_unwind()
            .await;

        let document = match fetched {
            Ok(Ok(document)) => document,
            Ok(Err(error)) => return self.fail(&url, depth, error),
            Err(_) => {
                let error = DownloadError::fetch(&url, "downloader panicked");
                return self.fail(&url, depth, error);
            }
        };
        tracing::debug!("Downloaded {}", url);
        self.transition(&url, PageState::Fetched);

        if self.barrier.is_some() {
            // Wait outside the pool so download workers stay free for the parent layer
            tokio::spawn(self.await_parent_layer(url, depth, document));
        } else {
            self.proceed(url, depth, document);
        }
    }

    async fn await_parent_layer(
        self: Arc<Self>,
        url: String,
        depth: u32,
        document: Box<dyn Document>,
    ) {
        let drained = match &self.barrier {
            Some(barrier) => tokio::select! {
                _ = barrier.wait_parent_drained(depth) => true,
                _ = wait_closed(self.shutdown.clone()) => false,
            },
            None => true,
        };

        if drained {
            self.proceed(url, depth, document);
        }
    }

    /// Finishes a leaf or queues extraction for a fetched page
    fn proceed(self: Arc<Self>, url: String, depth: u32, document: Box<dyn Document>) {
        if depth <= 1 {
            self.finish(&url, depth);
            return;
        }

        self.transition(&url, PageState::Extracting);
        let job = Arc::clone(&self).extract(url.clone(), depth, document);
        if let Err(e) = self.pools.extractors.submit(Box::pin(job)) {
            tracing::debug!("Not extracting {}: {}", url, e);
            self.release(depth);
        }
    }

    async fn extract(self: Arc<Self>, url: String, depth: u32, document: Box<dyn Document>) {
        let extracted = tokio::task::spawn_blocking(move || document.extract_links()).await;

        match extracted {
            Ok(Ok(links)) => {
                tracing::debug!("Extracted {} links from {}", links.len(), url);
                for link in links {
                    self.visit(link, depth - 1);
                }
                self.finish(&url, depth);
            }
            Ok(Err(error)) => self.fail(&url, depth, error),
            Err(join_error) => {
                let error =
                    DownloadError::extract(&url, format!("extraction task failed: {}", join_error));
                self.fail(&url, depth, error);
            }
        }
    }

    fn finish(&self, url: &str, depth: u32) {
        self.transition(url, PageState::Done);
        debug_assert!(self.frontier.state(url).is_terminal(), "{} not terminal", url);
        self.release(depth);
    }

    fn fail(&self, url: &str, depth: u32, error: DownloadError) {
        tracing::warn!("{}", error);
        self.frontier.record_error(url, error);
        self.finish(url, depth);
    }

    fn transition(&self, url: &str, next: PageState) {
        if let Err(e) = self.frontier.advance(url, next) {
            tracing::error!("{}", e);
        }
    }

    fn release(&self, depth: u32) {
        if let Some(barrier) = &self.barrier {
            barrier.leave(depth);
        }
        self.work.arrive();
    }
}
