//! Plain-text crawl report
//!
//! Lists every downloaded URL, one per line, followed by one
//! `url: Error(cause)` line per failed URL.

use crate::crawler::CrawlResult;
use crate::output::summary::CrawlSummary;

/// Formats `result` as the console report
pub fn format_text_report(result: &CrawlResult) -> String {
    let mut out = String::new();

    for url in &result.downloaded {
        out.push_str(url);
        out.push('\n');
    }
    for (url, error) in result.sorted_errors() {
        out.push_str(&format!("{}: Error({})\n", url, error.message()));
    }

    out
}

/// Prints the report to stdout
pub fn print_report(result: &CrawlResult) {
    print!("{}", format_text_report(result));
}

/// Prints a short statistics block to stderr
pub fn print_statistics(summary: &CrawlSummary) {
    eprintln!("=== Crawl Statistics ===");
    eprintln!("  Seed: {} (depth {})", summary.seed, summary.depth);
    eprintln!("  Downloaded: {}", summary.pages_downloaded);
    eprintln!("  Errors: {}", summary.total_errors);

    for (kind, count) in &summary.error_summary {
        eprintln!("    {}: {}", kind, count);
    }
    if let Some(duration) = summary.duration_seconds {
        eprintln!("  Duration: {:.2}s", duration);
    }

    eprintln!(
        "Success Rate: {:.1}% ({} / {} pages)",
        summary.success_rate(),
        summary.pages_downloaded,
        summary.total_pages()
    );
}
