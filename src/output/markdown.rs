//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of crawl results,
//! including run metadata, statistics and an error report.

use crate::output::summary::{CrawlSummary, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Most failed URLs listed individually
const MAX_LISTED_FAILURES: usize = 50;

/// Generates a markdown summary from crawl statistics
///
/// # Arguments
///
/// * `summary` - The crawl summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Layered Crawler Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", summary.seed));
    md.push_str(&format!("- **Depth**: {}\n", summary.depth));
    if !summary.strategy.is_empty() {
        md.push_str(&format!("- **Strategy**: {}\n", summary.strategy));
    }
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = summary.duration_seconds {
        md.push_str(&format!("- **Duration**: {:.2} seconds\n", duration));
    }
    let status = if summary.completed {
        "completed"
    } else {
        "closed early"
    };
    md.push_str(&format!("- **Status**: {}\n", status));
    if let Some(hash) = &summary.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!(
        "- **Pages Downloaded**: {}\n",
        summary.pages_downloaded
    ));
    md.push_str(&format!("- **Total Errors**: {}\n", summary.total_errors));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n",
        summary.success_rate()
    ));
    md.push_str(&format!(
        "- **Error Rate**: {:.2}%\n\n",
        summary.error_rate()
    ));

    // Error summary
    if !summary.error_summary.is_empty() {
        md.push_str("## Error Summary\n\n");
        md.push_str("| Error Type | Count |\n");
        md.push_str("|------------|-------|\n");

        for (kind, count) in &summary.error_summary {
            md.push_str(&format!("| {} | {} |\n", kind, count));
        }
        md.push('\n');
    }

    // Failed URLs
    if !summary.failed_pages.is_empty() {
        md.push_str("## Failed URLs\n\n");
        md.push_str("| URL | Type | Cause |\n");
        md.push_str("|-----|------|-------|\n");

        for page in summary.failed_pages.iter().take(MAX_LISTED_FAILURES) {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                page.url,
                page.kind,
                page.message.replace('|', "\\|")
            ));
        }
        if summary.failed_pages.len() > MAX_LISTED_FAILURES {
            md.push_str(&format!(
                "\n... and {} more\n",
                summary.failed_pages.len() - MAX_LISTED_FAILURES
            ));
        }
        md.push('\n');
    }

    md
}
