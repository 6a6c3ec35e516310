//! Output module for crawl reports and summaries
//!
//! This module handles:
//! - Printing the plain-text list of downloaded URLs and errors
//! - Condensing a crawl result into summary statistics
//! - Writing markdown summaries

mod markdown;
mod report;
mod summary;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use report::{format_text_report, print_report, print_statistics};
pub use summary::{CrawlSummary, FailedPage, OutputError, OutputResult};
