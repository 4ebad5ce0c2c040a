//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` trait
//! - HTML parsing and per-field page extraction
//! - Fixed-delay pacing between followed links
//! - Overall depth-1 crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod parser;
mod text;
mod throttle;

pub use coordinator::{
    classify_link, eligible_links, plan_follow, Coordinator, CrawlOutcome, CrawlReport,
    CrawlSettings, LinkDecision, PageError,
};
pub use extractor::Extractor;
pub use fetcher::{build_http_client, Fetcher, HttpFetcher};
pub use parser::parse_document;
pub use text::{TextCleaner, WhitespacePruner};
pub use throttle::Throttle;

use crate::config::Config;
use crate::storage::RecordSink;
use crate::RoblyError;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Checks that a seed is an absolute http(s) URL
pub fn validate_seed(seed_url: &str) -> Result<(), RoblyError> {
    let invalid = |reason: String| RoblyError::InvalidSeed {
        url: seed_url.to_string(),
        reason,
    };

    let url = Url::parse(seed_url).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    Ok(())
}

/// Runs a complete crawl operation
///
/// This is the main entry point for a crawl. It will:
/// 1. Validate the seed URL
/// 2. Build the HTTP client from the configuration
/// 3. Crawl the seed and the pages it links to
/// 4. Hand the full record set to `sink`, once
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - The run finished (its record set may be empty)
/// * `Err(RoblyError)` - The seed was invalid, the client could not be
///   built, or the sink failed
pub async fn run_crawl<S: RecordSink>(
    config: &Config,
    seed_url: &str,
    sink: &mut S,
    cancel: CancellationToken,
) -> Result<CrawlOutcome, RoblyError> {
    validate_seed(seed_url)?;

    let coordinator = Coordinator::from_config(config)?.with_cancellation(cancel);
    let outcome = coordinator.crawl_with_report(seed_url).await;

    sink.save(&outcome.records)?;
    Ok(outcome)
}
