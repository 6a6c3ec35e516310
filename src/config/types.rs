use serde::Deserialize;

/// Main configuration structure for Layered-Crawler
///
/// Every section is optional; missing sections fall back to their defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// How the orchestrator decides that a crawl has finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStrategy {
    /// Single global outstanding-work counter
    Counter,

    /// Global counter plus a per-depth barrier: pages at a depth only proceed
    /// once the previous layer has finished extracting
    #[default]
    Layered,
}

impl CrawlStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Layered => "layered",
        }
    }
}

impl std::fmt::Display for CrawlStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CrawlStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "counter" => Ok(Self::Counter),
            "layered" => Ok(Self::Layered),
            other => Err(format!(
                "unknown strategy '{}', expected 'counter' or 'layered'",
                other
            )),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of BFS layers to crawl, including the seed
    pub depth: u32,

    /// Number of concurrent page fetches
    pub downloaders: usize,

    /// Number of concurrent link extractions
    pub extractors: usize,

    /// Completion strategy
    pub strategy: CrawlStrategy,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            depth: 2,
            downloaders: 3,
            extractors: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            strategy: CrawlStrategy::default(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "LayeredCrawler".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the user agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Only extract links from responses served as `text/html`
    #[serde(rename = "html-only")]
    pub html_only: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            html_only: false,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path to the markdown summary file
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_round_trips_through_str() {
        for strategy in [CrawlStrategy::Counter, CrawlStrategy::Layered] {
            assert_eq!(strategy.to_string().parse::<CrawlStrategy>(), Ok(strategy));
        }
        assert!("bfs".parse::<CrawlStrategy>().is_err());
    }

    #[test]
    fn test_crawler_defaults() {
        let config = CrawlerConfig::default();
        assert_eq!(config.depth, 2);
        assert_eq!(config.downloaders, 3);
        assert!(config.extractors >= 1);
        assert_eq!(config.strategy, CrawlStrategy::Layered);
    }
}
