//! Shared record of claimed URLs and per-URL errors

use crate::state::PageState;
use crate::{CrawlError, DownloadError};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Outcome of a single crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlResult {
    /// Distinct URLs that were fetched without error, sorted
    pub downloaded: Vec<String>,

    /// Per-URL failures; keys never appear in `downloaded`
    pub errors: HashMap<String, DownloadError>,
}

impl CrawlResult {
    pub fn is_empty(&self) -> bool {
        self.downloaded.is_empty() && self.errors.is_empty()
    }

    /// Error entries sorted by URL
    pub fn sorted_errors(&self) -> Vec<(&String, &DownloadError)> {
        let mut errors: Vec<_> = self.errors.iter().collect();
        errors.sort_by(|a, b| a.0.cmp(b.0));
        errors
    }
}

/// Concurrently shared crawl frontier
///
/// `pages` doubles as the seen-set: a URL present in it has been claimed.
/// Each map has its own lock and no method holds both at once.
#[derive(Debug, Default)]
pub struct Frontier {
    pages: Mutex<HashMap<String, PageState>>,
    errors: Mutex<HashMap<String, DownloadError>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `url` for processing
    ///
    /// Returns true iff this is the first claim; the URL moves to `Downloading`.
    pub fn try_claim(&self, url: &str) -> bool {
        let mut pages = lock(&self.pages);
        if pages.contains_key(url) {
            return false;
        }
        pages.insert(url.to_string(), PageState::Downloading);
        true
    }

    /// Moves a claimed URL to `next`
    pub fn advance(&self, url: &str, next: PageState) -> Result<(), CrawlError> {
        let mut pages = lock(&self.pages);
        let current = pages.get(url).copied().unwrap_or(PageState::Unclaimed);
        if !current.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                url: url.to_string(),
                from: current,
                to: next,
            });
        }
        pages.insert(url.to_string(), next);
        Ok(())
    }

    /// Records the first error for `url` and marks it `Errored`
    ///
    /// Returns false (and keeps the earlier cause) if an error was already recorded.
    pub fn record_error(&self, url: &str, cause: DownloadError) -> bool {
        {
            let mut errors = lock(&self.errors);
            if errors.contains_key(url) {
                return false;
            }
            errors.insert(url.to_string(), cause);
        }

        if let Err(e) = self.advance(url, PageState::Errored) {
            tracing::debug!("{}", e);
        }
        true
    }

    pub fn state(&self, url: &str) -> PageState {
        lock(&self.pages)
            .get(url)
            .copied()
            .unwrap_or(PageState::Unclaimed)
    }

    /// Number of claimed URLs
    pub fn claimed(&self) -> usize {
        lock(&self.pages).len()
    }

    /// Fetched URLs minus errored ones, plus a copy of the error map
    ///
    /// Safe to call while the crawl is still running; the result then only
    /// reflects work finished so far.
    pub fn snapshot(&self) -> CrawlResult {
        let errors = lock(&self.errors).clone();
        let mut downloaded: Vec<String> = lock(&self.pages)
            .iter()
            .filter(|(url, state)| state.is_fetched() && !errors.contains_key(*url))
            .map(|(url, _)| url.clone())
            .collect();
        downloaded.sort();

        CrawlResult { downloaded, errors }
    }
}
