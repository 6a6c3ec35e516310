//! Layered-Crawler: a concurrent, depth-bounded web crawler
//!
//! This crate explores a link graph breadth-first from a seed URL, fetching each
//! page at most once. Downloads and link extraction run on two independently
//! sized worker pools, and per-URL failures are recorded without disturbing
//! sibling work.

pub mod config;
pub mod crawler;
pub mod download;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for crawler construction and orchestration
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Worker pool '{pool}' needs at least one worker, got {size}")]
    InvalidPoolSize { pool: &'static str, size: usize },

    #[error("Worker pool '{0}' must be created inside a Tokio runtime")]
    NoRuntime(&'static str),

    #[error("Worker pool '{0}' is shut down")]
    PoolClosed(&'static str),

    #[error("Crawler is closed")]
    Closed,

    #[error("Invalid state transition for {url}: {from} -> {to}")]
    InvalidTransition {
        url: String,
        from: state::PageState,
        to: state::PageState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Failure scoped to a single URL
///
/// These are recorded in the crawl result against the URL that failed and are
/// never propagated to sibling or ancestor pages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    /// Network, IO or HTTP status failure while fetching the page
    #[error("fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    /// The fetched page could not be turned into a list of links
    #[error("link extraction failed for {url}: {message}")]
    Extract { url: String, message: String },
}

impl DownloadError {
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn extract(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extract {
            url: url.into(),
            message: message.into(),
        }
    }

    /// The URL this error was recorded against
    pub fn url(&self) -> &str {
        match self {
            Self::Fetch { url, .. } | Self::Extract { url, .. } => url,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Fetch { message, .. } | Self::Extract { message, .. } => message,
        }
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }

    pub fn is_extract(&self) -> bool {
        matches!(self, Self::Extract { .. })
    }

    /// Short label used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::Extract { .. } => "extract",
        }
    }
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlResult, CrawlStrategy, WebCrawler};
pub use download::{Document, Downloader, HtmlPage, HttpDownloader, StaticDownloader};
pub use state::PageState;
