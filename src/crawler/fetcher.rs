//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - The `Fetcher` seam the coordinator fetches through
//! - Building HTTP clients with request and connect timeouts
//! - GET requests carrying the configured header set
//! - Error classification

use crate::config::CrawlerConfig;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Maximum redirect hops followed for a single fetch
const MAX_REDIRECTS: usize = 10;

/// Something that can turn a URL into raw page bytes
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches `url`, sending `headers` with the request
    async fn fetch(&self, url: &str, headers: &HeaderMap) -> Result<Vec<u8>, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use robly::config::CrawlerConfig;
/// use robly::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `Fetcher` backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        build_http_client(config).map(Self::new)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches a URL and returns its body
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx with HTML or missing Content-Type | body bytes |
    /// | 2xx with another Content-Type | `NotHtml` |
    /// | Any other status | `Status` |
    /// | Timeout | `Timeout` |
    /// | Connection refused, DNS, TLS | `Connect` |
    async fn fetch(&self, url: &str, headers: &HeaderMap) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !is_html_content_type(&content_type) {
            return Err(FetchError::NotHtml(content_type));
        }

        let body = response.bytes().await.map_err(classify_error)?;
        Ok(body.to_vec())
    }
}

/// Returns true for HTML-ish content types; an absent header is accepted
fn is_html_content_type(content_type: &str) -> bool {
    content_type.is_empty() || content_type.to_ascii_lowercase().contains("html")
}

fn classify_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::Connect(e.to_string())
    } else if let Some(status) = e.status() {
        FetchError::Status(status.as_u16())
    } else {
        FetchError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{build_header_map, default_headers};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::from_config(&CrawlerConfig::default()).unwrap()
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&CrawlerConfig::default()).is_ok());
    }

    #[test]
    fn test_html_content_types() {
        assert!(is_html_content_type("text/html"));
        assert!(is_html_content_type("text/html; charset=utf-8"));
        assert!(is_html_content_type("application/xhtml+xml"));
        assert!(is_html_content_type("TEXT/HTML"));
        assert!(is_html_content_type(""));
        assert!(!is_html_content_type("image/png"));
        assert!(!is_html_content_type("application/pdf"));
    }

    #[tokio::test]
    async fn test_fetch_sends_configured_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("User-Agent", "Mozilla/5 (Windows 7) Gecko"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<p>hi</p>", "text/html"))
            .expect(1)
            .mount(&server)
            .await;

        let headers = build_header_map(&default_headers()).unwrap();
        let body = fetcher()
            .fetch(&format!("{}/page", server.uri()), &headers)
            .await
            .unwrap();

        assert_eq!(body, b"<p>hi</p>");
    }

    #[tokio::test]
    async fn test_fetch_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = fetcher()
            .fetch(&format!("{}/missing", server.uri()), &HeaderMap::new())
            .await;

        assert!(matches!(result, Err(FetchError::Status(404))));
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8, 1, 2], "image/png"))
            .mount(&server)
            .await;

        let result = fetcher()
            .fetch(&format!("{}/logo.png", server.uri()), &HeaderMap::new())
            .await;

        assert!(matches!(result, Err(FetchError::NotHtml(ct)) if ct == "image/png"));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Bind and drop a listener so the port is known to be closed
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let result = fetcher()
            .fetch(&format!("http://127.0.0.1:{}/", port), &HeaderMap::new())
            .await;

        assert!(matches!(result, Err(FetchError::Connect(_))));
    }
}
