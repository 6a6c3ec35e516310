//! Crawl summary types
//!
//! A [`CrawlSummary`] condenses a [`CrawlResult`] plus run metadata into the
//! numbers shown in reports.

use crate::crawler::CrawlResult;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// A failed URL with its error kind and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPage {
    pub url: String,
    pub kind: &'static str,
    pub message: String,
}

/// Summary statistics for a crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    // Run metadata
    pub seed: String,
    pub depth: u32,
    pub strategy: String,
    pub config_hash: Option<String>,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<f64>,

    /// False when the crawler was closed before all work finished
    pub completed: bool,

    // Overall statistics
    pub pages_downloaded: u64,
    pub total_errors: u64,

    // Error summary (kind -> count)
    pub error_summary: BTreeMap<&'static str, u64>,

    // Failed pages sorted by URL
    pub failed_pages: Vec<FailedPage>,
}

impl CrawlSummary {
    /// Creates a new empty crawl summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a summary for a finished crawl of `seed`
    pub fn from_result(
        seed: &str,
        depth: u32,
        result: &CrawlResult,
        started: DateTime<Utc>,
        finished: DateTime<Utc>,
    ) -> Self {
        let mut error_summary = BTreeMap::new();
        let failed_pages: Vec<FailedPage> = result
            .sorted_errors()
            .into_iter()
            .map(|(url, error)| {
                *error_summary.entry(error.kind()).or_insert(0) += 1;
                FailedPage {
                    url: url.clone(),
                    kind: error.kind(),
                    message: error.message().to_string(),
                }
            })
            .collect();

        let elapsed = finished - started;

        Self {
            seed: seed.to_string(),
            depth,
            started_at: started.to_rfc3339(),
            finished_at: Some(finished.to_rfc3339()),
            duration_seconds: Some(elapsed.num_milliseconds() as f64 / 1000.0),
            completed: true,
            pages_downloaded: result.downloaded.len() as u64,
            total_errors: failed_pages.len() as u64,
            error_summary,
            failed_pages,
            ..Self::default()
        }
    }

    /// Returns the total number of URLs that reached a terminal outcome
    pub fn total_pages(&self) -> u64 {
        self.pages_downloaded + self.total_errors
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let total = self.total_pages();
        if total == 0 {
            return 0.0;
        }
        (self.pages_downloaded as f64 / total as f64) * 100.0
    }

    /// Returns the error rate as a percentage
    pub fn error_rate(&self) -> f64 {
        let total = self.total_pages();
        if total == 0 {
            return 0.0;
        }
        (self.total_errors as f64 / total as f64) * 100.0
    }
}
