//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run full crawls
//! through the real HTTP downloader.

use layered_crawler::config::{Config, CrawlStrategy, CrawlerConfig, UserAgentConfig};
use layered_crawler::WebCrawler;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with small pools and a short timeout
fn create_test_config(depth: u32, strategy: CrawlStrategy) -> Config {
    let mut config = Config {
        crawler: CrawlerConfig {
            depth,
            downloaders: 3,
            extractors: 2,
            strategy,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        ..Config::default()
    };
    config.http.timeout_secs = 5;
    config
}

/// Mounts an HTML page at `route` linking to each of `links`
async fn mount_page(server: &MockServer, route: &str, links: &[&str]) {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">{}</a>"#, link, link))
        .collect();

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    "<html><head><title>{}</title></head><body>{}</body></html>",
                    route, anchors
                ))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Paths the server has been asked for, sorted
async fn requested_paths(server: &MockServer) -> Vec<String> {
    let mut paths: Vec<String> = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_string())
        .collect();
    paths.sort();
    paths
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_crawl_with_depth_limit() {
    for strategy in [CrawlStrategy::Layered, CrawlStrategy::Counter] {
        let mock_server = MockServer::start().await;
        let base_url = mock_server.uri();

        mount_page(&mock_server, "/", &["/b", "/c"]).await;
        mount_page(&mock_server, "/b", &["/d"]).await;
        mount_page(&mock_server, "/c", &[]).await;
        mount_page(&mock_server, "/d", &[]).await;

        let config = create_test_config(2, strategy);
        let crawler = WebCrawler::from_config(&config).expect("Failed to build crawler");

        let result = crawler
            .crawl(&format!("{}/", base_url), config.crawler.depth)
            .await
            .expect("Crawl failed");

        assert_eq!(
            result.downloaded,
            vec![
                format!("{}/", base_url),
                format!("{}/b", base_url),
                format!("{}/c", base_url),
            ]
        );
        assert!(result.errors.is_empty());

        // /d sits beyond the depth limit and must never be requested
        assert_eq!(requested_paths(&mock_server).await, vec!["/", "/b", "/c"]);

        crawler.close();
    }
}

#[tokio::test]
async fn test_unreachable_seed() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/missing", mock_server.uri());

    let crawler = WebCrawler::from_config(&create_test_config(3, CrawlStrategy::Layered))
        .expect("Failed to build crawler");
    let result = crawler.crawl(&seed, 3).await.expect("Crawl failed");

    assert!(result.downloaded.is_empty());
    assert_eq!(result.errors.len(), 1);

    let error = &result.errors[&seed];
    assert!(error.is_fetch());
    assert_eq!(error.message(), "HTTP 404");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cycle_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &["/b"]).await;
    mount_page(&mock_server, "/b", &["/"]).await;

    let crawler = WebCrawler::from_config(&create_test_config(10, CrawlStrategy::Layered))
        .expect("Failed to build crawler");
    let result = crawler
        .crawl(&format!("{}/", base_url), 10)
        .await
        .expect("Crawl failed");

    assert_eq!(result.downloaded.len(), 2);
    assert_eq!(requested_paths(&mock_server).await, vec!["/", "/b"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_broken_link_does_not_affect_siblings() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &["/ok", "/broken", "/absent"]).await;
    mount_page(&mock_server, "/ok", &["/deeper"]).await;
    mount_page(&mock_server, "/deeper", &[]).await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let crawler = WebCrawler::from_config(&create_test_config(3, CrawlStrategy::Layered))
        .expect("Failed to build crawler");
    let result = crawler
        .crawl(&format!("{}/", base_url), 3)
        .await
        .expect("Crawl failed");

    assert_eq!(
        result.downloaded,
        vec![
            format!("{}/", base_url),
            format!("{}/deeper", base_url),
            format!("{}/ok", base_url),
        ]
    );
    assert_eq!(result.errors.len(), 2);
    assert_eq!(
        result.errors[&format!("{}/broken", base_url)].message(),
        "HTTP 500"
    );
    assert_eq!(
        result.errors[&format!("{}/absent", base_url)].message(),
        "HTTP 404"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_content_type_handling() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &["/data.txt"]).await;
    mount_page(&mock_server, "/linked-from-text", &[]).await;
    Mock::given(method("GET"))
        .and(path("/data.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<a href="/linked-from-text">not really html</a>"#)
                .insert_header("content-type", "text/plain"),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(3, CrawlStrategy::Layered);
    config.http.html_only = true;
    let crawler = WebCrawler::from_config(&config).expect("Failed to build crawler");

    let result = crawler
        .crawl(&format!("{}/", base_url), 3)
        .await
        .expect("Crawl failed");

    assert_eq!(
        result.downloaded,
        vec![format!("{}/", base_url), format!("{}/data.txt", base_url)]
    );
    assert_eq!(requested_paths(&mock_server).await, vec!["/", "/data.txt"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_close_returns_partial_result() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/", &["/slow"]).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html></html>")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let crawler = std::sync::Arc::new(
        WebCrawler::from_config(&create_test_config(3, CrawlStrategy::Layered))
            .expect("Failed to build crawler"),
    );

    let crawl = {
        let crawler = crawler.clone();
        let seed = format!("{}/", base_url);
        tokio::spawn(async move { crawler.crawl(&seed, 3).await })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    crawler.close();

    let result = tokio::time::timeout(Duration::from_secs(2), crawl)
        .await
        .expect("crawl should return promptly after close")
        .expect("crawl task panicked")
        .expect("Crawl failed");

    assert_eq!(result.downloaded, vec![format!("{}/", base_url)]);
    assert!(result.errors.is_empty());
}
