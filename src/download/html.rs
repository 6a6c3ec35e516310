//! HTML parser for extracting links and metadata
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow (from <a> tags and canonical links)
//! - Page title

use crate::download::Document;
use crate::DownloadError;
use scraper::{Html, Selector};
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// All links found on the page (absolute URLs)
    pub links: Vec<String>,
}

/// A page body fetched over HTTP
#[derive(Debug, Clone)]
pub struct HtmlPage {
    url: String,
    base_url: Url,
    content_type: Option<String>,
    body: String,
    html_only: bool,
}

impl HtmlPage {
    /// Creates a page requested as `url` and served from `base_url`
    ///
    /// `base_url` is the final URL after redirects; relative links resolve
    /// against it.
    pub fn new(url: String, base_url: Url, content_type: Option<String>, body: String) -> Self {
        Self {
            url,
            base_url,
            content_type,
            body,
            html_only: false,
        }
    }

    /// When set, non-HTML responses yield no links instead of being parsed
    pub fn html_only(mut self, html_only: bool) -> Self {
        self.html_only = html_only;
        self
    }

    fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map_or(false, |ct| ct.contains("text/html"))
    }
}

impl Document for HtmlPage {
    fn url(&self) -> &str {
        &self.url
    }

    fn extract_links(&self) -> Result<Vec<String>, DownloadError> {
        if self.html_only && !self.is_html() {
            tracing::debug!(
                "Skipping link extraction for {} ({})",
                self.url,
                self.content_type.as_deref().unwrap_or("no content type")
            );
            return Ok(Vec::new());
        }

        let parsed =
            parse_html(&self.body, &self.base_url).map_err(|e| DownloadError::extract(&self.url, e))?;
        tracing::trace!(
            "Parsed {} ({}): {} links",
            self.url,
            parsed.title.as_deref().unwrap_or("untitled"),
            parsed.links.len()
        );
        Ok(parsed.links)
    }
}

/// Parses HTML content and extracts links and metadata
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only links
/// - Anything that is not http(s) after resolution
///
/// # Example
///
/// ```
/// use layered_crawler::download::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url).unwrap();
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> Result<ParsedPage, String> {
    let document = Html::parse_document(html);

    let title = extract_title(&document)?;
    let links = extract_links(&document, base_url)?;

    Ok(ParsedPage { title, links })
}

fn selector(css: &'static str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| format!("invalid selector '{}': {:?}", css, e))
}

fn extract_title(document: &Html) -> Result<Option<String>, String> {
    let title_selector = selector("title")?;

    Ok(document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn extract_links(document: &Html, base_url: &Url) -> Result<Vec<String>, String> {
    let mut links = Vec::new();

    let a_selector = selector("a[href]")?;
    for element in document.select(&a_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        if let Some(absolute_url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        {
            links.push(absolute_url);
        }
    }

    let canonical_selector = selector("link[rel='canonical'][href]")?;
    for element in document.select(&canonical_selector) {
        if let Some(absolute_url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        {
            links.push(absolute_url);
        }
    }

    Ok(links)
}

/// Resolves a link href to an absolute http(s) URL
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}
