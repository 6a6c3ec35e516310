//! In-memory downloader over a fixed link graph
//!
//! Useful for exercising the crawler without a network: every page, fetch
//! failure, extraction failure and stall is declared up front, and the
//! downloader counts how often each URL was fetched.

use crate::download::{Document, Downloader};
use crate::DownloadError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone)]
enum Outcome {
    Page(Vec<String>),
    FetchFailure(String),
    ExtractFailure(String),
    Stall,
}

/// Downloader serving a static link graph
#[derive(Debug, Default)]
pub struct StaticDownloader {
    pages: HashMap<String, Outcome>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl StaticDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page with the given outbound links
    pub fn page<I, S>(mut self, url: &str, links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let links = links.into_iter().map(Into::into).collect();
        self.pages.insert(url.to_string(), Outcome::Page(links));
        self
    }

    /// Adds a URL whose fetch fails
    pub fn fetch_failure(mut self, url: &str, message: &str) -> Self {
        self.pages
            .insert(url.to_string(), Outcome::FetchFailure(message.to_string()));
        self
    }

    /// Adds a URL that fetches fine but whose link extraction fails
    pub fn extract_failure(mut self, url: &str, message: &str) -> Self {
        self.pages
            .insert(url.to_string(), Outcome::ExtractFailure(message.to_string()));
        self
    }

    /// Adds a URL whose fetch never completes
    pub fn stall(mut self, url: &str) -> Self {
        self.pages.insert(url.to_string(), Outcome::Stall);
        self
    }

    /// How many times `url` has been fetched
    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }

    /// Every URL fetched at least once, sorted
    pub fn fetched_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        urls.sort();
        urls
    }
}

#[async_trait]
impl Downloader for StaticDownloader {
    async fn fetch(&self, url: &str) -> Result<Box<dyn Document>, DownloadError> {
        *self
            .fetches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(url.to_string())
            .or_insert(0) += 1;

        let links = match self.pages.get(url) {
            None => return Err(DownloadError::fetch(url, "no such page")),
            Some(Outcome::FetchFailure(message)) => {
                return Err(DownloadError::fetch(url, message.as_str()))
            }
            Some(Outcome::Stall) => futures::future::pending().await,
            Some(Outcome::Page(links)) => Ok(links.clone()),
            Some(Outcome::ExtractFailure(message)) => Err(message.clone()),
        };

        Ok(Box::new(StaticPage {
            url: url.to_string(),
            links,
        }))
    }
}

struct StaticPage {
    url: String,
    links: Result<Vec<String>, String>,
}

impl Document for StaticPage {
    fn url(&self) -> &str {
        &self.url
    }

    fn extract_links(&self) -> Result<Vec<String>, DownloadError> {
        self.links
            .clone()
            .map_err(|message| DownloadError::extract(&self.url, message))
    }
}
