//! Downloader boundary and the page sources shipped with the crate
//!
//! The crawler core only sees two traits:
//! - [`Downloader`] turns a URL into a fetched [`Document`] (network bound)
//! - [`Document::extract_links`] turns a fetched page into outbound links
//!   (CPU bound, run on the blocking thread pool)
//!
//! Two implementations are provided: [`HttpDownloader`] for real sites and
//! [`StaticDownloader`] for a fixed in-memory link graph.

mod html;
mod http;
mod memory;

pub use html::{parse_html, HtmlPage, ParsedPage};
pub use http::{build_http_client, HttpDownloader};
pub use memory::StaticDownloader;

use crate::DownloadError;
use async_trait::async_trait;

/// A fetched page whose links can be extracted
pub trait Document: Send + Sync + 'static {
    /// The URL this document was requested as
    fn url(&self) -> &str;

    /// Extracts outbound links
    ///
    /// May block; the crawler calls it from the blocking thread pool.
    fn extract_links(&self) -> Result<Vec<String>, DownloadError>;
}

/// Fetches pages for the crawler
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Box<dyn Document>, DownloadError>;
}
