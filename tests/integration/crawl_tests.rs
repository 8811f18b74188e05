//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end through the real HTTP fetcher.

use std::path::Path;
use sumi_harvest::config::Config;
use sumi_harvest::crawler::Coordinator;
use sumi_harvest::output::{ArticleSink, SqliteArticleSink};
use sumi_harvest::CrawlError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server
fn create_test_config(base_url: &str, max_calls: usize, max_depth: u32) -> Config {
    let mut config = Config::default();
    config.crawler.base_url = base_url.to_string();
    config.crawler.max_calls = max_calls;
    config.crawler.max_depth = max_depth;
    config.crawler.max_errors = 5;
    config.crawler.request_timeout_secs = Some(10);
    config.output.print_articles = false;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/html")
}

/// Number of requests the server received for a path
async fn hits(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == request_path)
        .count()
}

#[tokio::test]
async fn test_full_crawl_follows_relative_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body>
            <a href="/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <a href="https://external.example.org/page3">External</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html(
            r#"<html><body><a href="/deeper">Too deep</a></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html("<html><body>Content 2</body></html>"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, 2, 1);
    let mut coordinator =
        Coordinator::new(config, Vec::new()).expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Crawl failed");

    assert_eq!(summary.pages_fetched, 3);
    assert_eq!(summary.urls_discovered, 3);
    assert_eq!(hits(&mock_server, "/page1").await, 1);
    assert_eq!(hits(&mock_server, "/page2").await, 1);
    assert_eq!(hits(&mock_server, "/deeper").await, 0);
}

#[tokio::test]
async fn test_articles_exported_to_sqlite() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body>
            <a href="/news/1">One</a>
            <a href="/news/2">Two</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/news/1"))
        .respond_with(html(
            r#"<html class="articlePage"><body>
            <span class="article__date">1 mars 2019</span>
            <h1 class="article__title">First</h1>
            <h4 class="article__preamble">Preamble</h4>
            <div class="article__body"><p>Para one.</p><p>Para two.</p></div>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/news/2"))
        .respond_with(html(
            r#"<html class="articlePage"><h1 class="article__title">Second</h1></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("articles.db");

    let sink: Box<dyn ArticleSink> =
        Box::new(SqliteArticleSink::new(&db_path).expect("Failed to open DB"));
    let config = create_test_config(&base_url, 3, 1);
    let mut coordinator =
        Coordinator::new(config, vec![sink]).expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Crawl failed");
    drop(coordinator);

    assert_eq!(summary.total_articles, 2);

    let storage = SqliteArticleSink::new(Path::new(&db_path)).expect("Failed to open DB");
    assert_eq!(storage.count_articles().unwrap(), 2);
    assert_eq!(storage.count_runs().unwrap(), 1);

    let first = storage
        .get_article(&format!("{}/news/1", base_url))
        .unwrap()
        .expect("article stored");
    assert_eq!(first.depth, 1);
    assert_eq!(first.date, "1 mars 2019");
    assert_eq!(first.title, "First");
    assert_eq!(first.summary, "Preamble");
    assert_eq!(first.body, "Para one.Para two.");

    let second = storage
        .get_article(&format!("{}/news/2", base_url))
        .unwrap()
        .expect("article stored");
    assert_eq!(second.title, "Second");
    assert_eq!(second.date, "");
    assert_eq!(second.summary, "");
    assert_eq!(second.body, "");
}

#[tokio::test]
async fn test_server_errors_abort_after_budget() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 1, 1);
    let mut coordinator =
        Coordinator::new(config, Vec::new()).expect("Failed to create coordinator");
    let err = coordinator.run().await.unwrap_err();

    assert!(matches!(
        err,
        CrawlError::ErrorBudgetExhausted {
            status: 503,
            errors: 5,
            ..
        }
    ));
    assert_eq!(hits(&mock_server, "/").await, 5);
}

#[tokio::test]
async fn test_server_error_retried_until_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html class="articlePage"><body><h1 class="article__title">Back</h1></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 1, 1);
    let mut coordinator =
        Coordinator::new(config, Vec::new()).expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Crawl failed");

    assert_eq!(summary.total_articles, 1);
    assert_eq!(summary.retries, 2);
    assert_eq!(summary.server_errors, 2);
    assert_eq!(hits(&mock_server, "/").await, 3);
}

#[tokio::test]
async fn test_not_found_aborts_immediately() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<html><body><a href="/missing">Missing</a></body></html>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 1, 1);
    let mut coordinator =
        Coordinator::new(config, Vec::new()).expect("Failed to create coordinator");
    let err = coordinator.run().await.unwrap_err();

    assert!(matches!(err, CrawlError::ClientError { status: 404, .. }));
    assert_eq!(hits(&mock_server, "/missing").await, 1);
}

#[tokio::test]
async fn test_unreachable_site_is_transport_error() {
    let base_url = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let config = create_test_config(&base_url, 1, 1);
    let mut coordinator =
        Coordinator::new(config, Vec::new()).expect("Failed to create coordinator");
    let err = coordinator.run().await.unwrap_err();

    assert!(matches!(err, CrawlError::Transport { .. }));
}

#[tokio::test]
async fn test_parallel_crawl_fetches_every_page_once() {
    let mock_server = MockServer::start().await;

    let links: String = (0..12)
        .map(|i| format!(r#"<a href="/p{}">{}</a><a href="/p{}">dup</a>"#, i, i, i))
        .collect();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(&format!("<html><body>{}</body></html>", links)))
        .mount(&mock_server)
        .await;

    // Every child page links back to the root and to its siblings
    Mock::given(method("GET"))
        .respond_with(
            html(&format!(
                r#"<html class="articlePage"><body><a href="/">Home</a>{}</body></html>"#,
                links
            ))
            .set_delay(std::time::Duration::from_millis(20)),
        )
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 4, 3);
    let mut coordinator =
        Coordinator::new(config, Vec::new()).expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Crawl failed");

    assert_eq!(summary.pages_fetched, 13);
    assert_eq!(summary.total_articles, 12);
    for i in 0..12 {
        assert_eq!(hits(&mock_server, &format!("/p{}", i)).await, 1);
    }
    assert_eq!(hits(&mock_server, "/").await, 1);
}
