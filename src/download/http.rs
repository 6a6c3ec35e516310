//! HTTP downloader
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content
//! - Error classification into per-URL fetch errors

use crate::config::{Config, HttpConfig, UserAgentConfig};
use crate::download::{Document, Downloader, HtmlPage};
use crate::DownloadError;
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use layered_crawler::config::{HttpConfig, UserAgentConfig};
/// use layered_crawler::download::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    http: &HttpConfig,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(Duration::from_secs(http.timeout_secs))
        .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Downloader backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
    html_only: bool,
}

impl HttpDownloader {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, &config.http)?;
        Ok(Self::with_client(client, config.http.html_only))
    }

    pub fn with_client(client: Client, html_only: bool) -> Self {
        Self { client, html_only }
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn fetch(&self, url: &str) -> Result<Box<dyn Document>, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::fetch(
                url,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        tracing::trace!(
            "Fetched {} ({} bytes, final URL {})",
            url,
            body.len(),
            final_url
        );

        let page = HtmlPage::new(url.to_string(), final_url, content_type, body)
            .html_only(self.html_only);
        Ok(Box::new(page))
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> DownloadError {
    let message = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else if error.is_redirect() {
        format!("Redirect error: {}", error)
    } else {
        error.to_string()
    };
    DownloadError::fetch(url, message)
}
