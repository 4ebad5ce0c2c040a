//! Integration tests for the crawler
//!
//! These tests use wiremock to serve pages over real HTTP and run the full
//! fetch, extract, follow and store cycle end-to-end.

use robly::config::{Config, CrawlerConfig, OutputConfig};
use robly::crawler::{run_crawl, Coordinator};
use robly::storage::SqliteStorage;
use robly::PageRecord;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no pause between followed links
fn create_test_config(db_path: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            follow_delay_ms: 0,
            request_timeout_secs: 5,
            connect_timeout_secs: 2,
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
        },
        ..Config::default()
    }
}

async fn mount_page(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html.as_bytes().to_vec(), "text/html"))
        .mount(server)
        .await;
}

fn urls(records: &[PageRecord]) -> Vec<&str> {
    records.iter().map(|r| r.url()).collect()
}

#[tokio::test]
async fn test_full_crawl_follows_seed_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let seed = format!("{}/", base_url);

    mount_page(
        &mock_server,
        "/",
        &format!(
            r##"<html><head>
                <title>Home</title>
                <meta name="description" content="The home page">
                <meta name="keywords" content="home, test">
            </head><body>
                <h1>Welcome</h1>
                <img src="/logo.png">
                <a href="/about">About</a>
                <a href="{base}/contact">Contact</a>
                <a href="/about#team">Team</a>
                <a href="{base}/">Home again</a>
                <a href="mailto:someone@example.com">Mail</a>
            </body></html>"##,
            base = base_url
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/about",
        r#"<html><head><title>About</title></head><body><a href="/deeper">Deeper</a></body></html>"#,
    )
    .await;
    mount_page(&mock_server, "/contact", "<html><head><title>Contact</title></head></html>").await;
    mount_page(&mock_server, "/deeper", "<html><head><title>Too deep</title></head></html>").await;

    let config = create_test_config("unused.db");
    let coordinator = Coordinator::from_config(&config).expect("Failed to build coordinator");
    let outcome = coordinator.crawl_with_report(&seed).await;

    assert_eq!(
        urls(&outcome.records),
        vec![
            seed.clone(),
            format!("{}/about", base_url),
            format!("{}/contact", base_url),
        ]
    );

    let home = &outcome.records[0];
    assert_eq!(home.title(), "Home");
    assert_eq!(home.description(), "The home page");
    assert!(home.keywords().contains("home"));
    assert!(home.h1s().contains("Welcome"));
    assert!(home.images().contains(&format!("{}/logo.png", base_url)));
    assert_eq!(home.links().len(), 5);
    assert!(home.indexable());

    assert_eq!(outcome.report.followed, 2);
    assert_eq!(outcome.report.skipped_fragment, 1);
    assert_eq!(outcome.report.skipped_seed, 1);
    assert_eq!(outcome.report.skipped_not_http, 1);

    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(
        !requests.iter().any(|r| r.url.path() == "/deeper"),
        "Links on followed pages must not be fetched"
    );
}

#[tokio::test]
async fn test_failed_link_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let seed = format!("{}/", base_url);

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/missing">Missing</a><a href="/present">Present</a></body></html>"#,
    )
    .await;
    mount_page(&mock_server, "/present", "<html><head><title>Present</title></head></html>").await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let config = create_test_config("unused.db");
    let outcome = Coordinator::from_config(&config)
        .expect("Failed to build coordinator")
        .crawl_with_report(&seed)
        .await;

    assert_eq!(
        urls(&outcome.records),
        vec![seed.clone(), format!("{}/present", base_url)]
    );
    assert_eq!(outcome.report.failed, 1);
    assert!(!outcome.report.seed_failed);
}

#[tokio::test]
async fn test_non_html_link_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let seed = format!("{}/", base_url);

    mount_page(
        &mock_server,
        "/",
        r#"<html><body><a href="/report.pdf">Report</a></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"))
        .mount(&mock_server)
        .await;

    let config = create_test_config("unused.db");
    let outcome = Coordinator::from_config(&config)
        .expect("Failed to build coordinator")
        .crawl_with_report(&seed)
        .await;

    assert_eq!(urls(&outcome.records), vec![seed.as_str()]);
    assert_eq!(outcome.report.failed, 1);
}

#[tokio::test]
async fn test_seed_failure_yields_empty_run() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config("unused.db");
    let outcome = Coordinator::from_config(&config)
        .expect("Failed to build coordinator")
        .crawl_with_report(&seed)
        .await;

    assert!(outcome.records.is_empty());
    assert!(outcome.report.seed_failed);
    assert_eq!(mock_server.received_requests().await.unwrap_or_default().len(), 1);
}

#[tokio::test]
async fn test_configured_user_agent_is_sent() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "RoblyTest/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            b"<html><head><title>Hello</title></head></html>".to_vec(),
            "text/html",
        ))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config("unused.db");
    config
        .headers
        .insert("User-Agent".to_string(), "RoblyTest/1.0".to_string());

    let records = Coordinator::from_config(&config)
        .expect("Failed to build coordinator")
        .crawl(&seed)
        .await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title(), "Hello");
}

#[tokio::test]
async fn test_run_crawl_persists_records() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let seed = format!("{}/", base_url);

    mount_page(
        &mock_server,
        "/",
        r#"<html><head><title>Home</title></head>
           <body><a href="/hidden">Hidden</a><a href="/open">Open</a></body></html>"#,
    )
    .await;
    mount_page(
        &mock_server,
        "/hidden",
        r#"<html><head><title>Hidden</title><meta name="robots" content="noindex, nofollow"></head></html>"#,
    )
    .await;
    mount_page(&mock_server, "/open", "<html><head><title>Open</title></head></html>").await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("robly.db");
    let config = create_test_config(db_path.to_str().expect("temp path is UTF-8"));

    let mut storage = SqliteStorage::new(&db_path)
        .expect("Failed to open storage")
        .with_config_hash("test-hash");
    let outcome = run_crawl(&config, &seed, &mut storage, CancellationToken::new())
        .await
        .expect("Crawl failed");
    assert_eq!(outcome.records.len(), 3);

    let run = storage
        .latest_run()
        .expect("Failed to query runs")
        .expect("A run should be stored");
    assert_eq!(run.record_count, 3);
    assert_eq!(run.seed_url.as_deref(), Some(seed.as_str()));
    assert_eq!(run.config_hash.as_deref(), Some("test-hash"));

    let stored = storage.load_run(run.id).expect("Failed to load run");
    assert_eq!(stored, outcome.records);
    assert!(!stored[1].indexable());
    assert!(stored[2].indexable());
    assert_eq!(storage.count_non_indexable().expect("count failed"), 1);
}

#[tokio::test]
async fn test_run_crawl_records_empty_run_on_seed_failure() {
    let mock_server = MockServer::start().await;
    let seed = format!("{}/", mock_server.uri());

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("robly.db");
    let config = create_test_config(db_path.to_str().expect("temp path is UTF-8"));

    let mut storage = SqliteStorage::new(&db_path)
        .expect("Failed to open storage")
        .with_seed(seed.as_str());
    let outcome = run_crawl(&config, &seed, &mut storage, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert!(outcome.records.is_empty());
    assert_eq!(storage.count_runs().expect("count failed"), 1);
    let run = storage
        .latest_run()
        .expect("Failed to query runs")
        .expect("A run should be stored");
    assert_eq!(run.seed_url.as_deref(), Some(seed.as_str()));
    assert_eq!(run.record_count, 0);
    assert_eq!(storage.count_pages().expect("count failed"), 0);
}

#[tokio::test]
async fn test_run_crawl_rejects_invalid_seed() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("robly.db");
    let config = create_test_config(db_path.to_str().expect("temp path is UTF-8"));

    let mut storage = SqliteStorage::new(&db_path).expect("Failed to open storage");
    let result = run_crawl(&config, "/relative", &mut storage, CancellationToken::new()).await;

    assert!(result.is_err());
    assert_eq!(storage.count_runs().expect("count failed"), 0);
}
