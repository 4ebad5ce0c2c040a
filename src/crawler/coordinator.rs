//! Crawler coordinator - depth-1 crawl orchestration
//!
//! A run fetches the seed page, decides which of its links are eligible,
//! then fetches each eligible link in discovery order with a fixed pause
//! between fetches. Links found on followed pages are never followed.
//!
//! Failure handling:
//! - Seed fetch or parse failure: the run yields no records
//! - Followed link fetch or parse failure: that link is skipped
//! - Link that cannot be resolved: skipped and counted
//!
//! Every skip is logged and counted in the `CrawlReport`.

use crate::config::{build_header_map, Config};
use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::parser::parse_document;
use crate::crawler::throttle::Throttle;
use crate::record::{PageRecord, RecordError};
use crate::url::resolve;
use crate::{ConfigError, FetchError, ParseError, RoblyError};
use reqwest::header::HeaderMap;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Why fetching one page produced no record
#[derive(Debug, Error)]
pub enum PageError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("invalid record: {0}")]
    Record(#[from] RecordError),
}

/// Request identity and pacing for a run
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Headers sent with every fetch
    pub headers: HeaderMap,

    /// Pause between successive followed-link fetches
    pub follow_delay: Duration,
}

impl CrawlSettings {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            headers: build_header_map(&config.headers)?,
            follow_delay: Duration::from_millis(config.crawler.follow_delay_ms),
        })
    }
}

/// What the coordinator decided to do with one seed link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkDecision {
    /// Fetch this absolute URL
    Follow(String),
    /// Same string as the seed URL
    SkipSeed,
    /// Contains a `#` fragment marker
    SkipFragment,
    /// Protocol-relative `//host/path` link
    SkipProtocolRelative,
    /// Not an http(s) URL after resolution (`mailto:`, `javascript:`, bare paths)
    SkipNotHttp,
    /// Resolution against the seed failed
    Unresolvable,
}

/// Decides whether a single link found on the seed page should be followed
///
/// Root-relative links are resolved against the seed first. The link is then
/// followed only if it differs from the seed, has no `#`, no longer starts
/// with `/`, and starts with `http`.
pub fn classify_link(seed_url: &str, link: &str) -> LinkDecision {
    if link.starts_with("//") {
        return LinkDecision::SkipProtocolRelative;
    }

    let candidate = if link.starts_with('/') {
        match resolve(seed_url, link) {
            Ok(absolute) => absolute,
            Err(e) => {
                tracing::debug!("Cannot resolve {} against {}: {}", link, seed_url, e);
                return LinkDecision::Unresolvable;
            }
        }
    } else {
        link.to_string()
    };

    if candidate == seed_url {
        LinkDecision::SkipSeed
    } else if candidate.contains('#') {
        LinkDecision::SkipFragment
    } else if candidate.starts_with('/') || !candidate.starts_with("http") {
        LinkDecision::SkipNotHttp
    } else {
        LinkDecision::Follow(candidate)
    }
}

/// Counters describing one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Distinct links on the seed page
    pub links_seen: usize,
    /// Followed links that produced a record
    pub followed: usize,
    /// Followed links whose fetch or parse failed
    pub failed: usize,
    pub skipped_seed: usize,
    pub skipped_fragment: usize,
    pub skipped_protocol_relative: usize,
    pub skipped_not_http: usize,
    /// Links resolving to a URL already visited in this run
    pub skipped_duplicate: usize,
    pub unresolvable: usize,
    /// The seed could not be fetched or parsed
    pub seed_failed: bool,
    /// The run was stopped before every eligible link was fetched
    pub cancelled: bool,
}

impl CrawlReport {
    fn record(&mut self, decision: &LinkDecision) {
        match decision {
            LinkDecision::Follow(_) => {}
            LinkDecision::SkipSeed => self.skipped_seed += 1,
            LinkDecision::SkipFragment => self.skipped_fragment += 1,
            LinkDecision::SkipProtocolRelative => self.skipped_protocol_relative += 1,
            LinkDecision::SkipNotHttp => self.skipped_not_http += 1,
            LinkDecision::Unresolvable => self.unresolvable += 1,
        }
    }

    /// Total links not followed, for any reason
    pub fn skipped(&self) -> usize {
        self.skipped_seed
            + self.skipped_fragment
            + self.skipped_protocol_relative
            + self.skipped_not_http
            + self.skipped_duplicate
            + self.unresolvable
    }
}

/// Records of a run plus what happened along the way
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub records: Vec<PageRecord>,
    pub report: CrawlReport,
}

/// Picks the links to follow, in the order they appear on the seed page
///
/// The visited set starts with the seed, so two spellings of the same page
/// (`/about` and `http://example.com/about`) are fetched once.
pub fn plan_follow(seed_url: &str, links: &[String], report: &mut CrawlReport) -> Vec<String> {
    let mut visited: HashSet<String> = HashSet::from([seed_url.to_string()]);
    let mut targets = Vec::new();

    for link in links {
        report.links_seen += 1;
        let decision = classify_link(seed_url, link);
        report.record(&decision);

        match decision {
            LinkDecision::Follow(url) => {
                if visited.insert(url.clone()) {
                    targets.push(url);
                } else {
                    report.skipped_duplicate += 1;
                }
            }
            skipped => tracing::debug!("Skipping link {}: {:?}", link, skipped),
        }
    }

    targets
}

/// Links on the seed page that a run would follow
///
/// # Example
///
/// ```
/// use robly::crawler::eligible_links;
///
/// let links: Vec<String> = ["http://example.com/seed", "/about", "http://other.com/x#frag", "http://other.com/y"]
///     .iter()
///     .map(|s| s.to_string())
///     .collect();
///
/// assert_eq!(
///     eligible_links("http://example.com/seed", &links),
///     vec!["http://example.com/about", "http://other.com/y"]
/// );
/// ```
pub fn eligible_links(seed_url: &str, links: &[String]) -> Vec<String> {
    plan_follow(seed_url, links, &mut CrawlReport::default())
}

/// Main crawler coordinator structure
pub struct Coordinator<F> {
    fetcher: F,
    extractor: Extractor,
    settings: CrawlSettings,
    cancel: CancellationToken,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator that fetches over HTTP
    pub fn from_config(config: &Config) -> Result<Self, RoblyError> {
        let fetcher = HttpFetcher::from_config(&config.crawler)?;
        let settings = CrawlSettings::from_config(config)?;
        Ok(Self::new(fetcher, settings))
    }
}

impl<F: Fetcher> Coordinator<F> {
    pub fn new(fetcher: F, settings: CrawlSettings) -> Self {
        Self {
            fetcher,
            extractor: Extractor::default(),
            settings,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Stops the run at the next fetch boundary once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Crawls `seed_url` and the pages it links to
    pub async fn crawl(&self, seed_url: &str) -> Vec<PageRecord> {
        self.crawl_with_report(seed_url).await.records
    }

    /// Runs a depth-1 crawl
    ///
    /// This method:
    /// 1. Fetches and extracts the seed; on failure the run is empty
    /// 2. Plans which seed links to follow
    /// 3. Fetches each planned link, pausing between fetches
    /// 4. Returns the seed record followed by every successful link record
    pub async fn crawl_with_report(&self, seed_url: &str) -> CrawlOutcome {
        let mut report = CrawlReport::default();
        tracing::info!("Crawling seed {}", seed_url);

        let seed = match self.fetch_record(seed_url).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Seed {} failed, run has no records: {}", seed_url, e);
                report.seed_failed = true;
                report.cancelled = matches!(e, PageError::Fetch(FetchError::Cancelled));
                return CrawlOutcome {
                    records: Vec::new(),
                    report,
                };
            }
        };

        let targets = plan_follow(seed_url, seed.links(), &mut report);
        tracing::info!(
            "Seed has {} links, {} eligible to follow",
            report.links_seen,
            targets.len()
        );

        let mut records = vec![seed];
        let mut throttle = Throttle::new(self.settings.follow_delay);

        for target in targets {
            if !throttle.ready(&self.cancel).await {
                report.cancelled = true;
                break;
            }

            let result = self.fetch_record(&target).await;
            throttle.mark();

            match result {
                Ok(record) => {
                    tracing::debug!("Crawled {}", target);
                    report.followed += 1;
                    records.push(record);
                }
                Err(PageError::Fetch(FetchError::Cancelled)) => {
                    report.cancelled = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", target, e);
                    report.failed += 1;
                }
            }
        }

        if report.cancelled {
            tracing::info!("Crawl of {} cancelled", seed_url);
        }
        tracing::info!(
            "Crawl of {} finished: {} records, {} followed, {} failed, {} skipped ({} unresolvable)",
            seed_url,
            records.len(),
            report.followed,
            report.failed,
            report.skipped(),
            report.unresolvable
        );

        CrawlOutcome { records, report }
    }

    /// Fetches, parses and extracts one page
    async fn fetch_record(&self, url: &str) -> Result<PageRecord, PageError> {
        let body = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(FetchError::Cancelled.into()),
            result = self.fetcher.fetch(url, &self.settings.headers) => result?,
        };

        let document = parse_document(&body)?;
        let content = self.extractor.extract(url, &document);
        Ok(PageRecord::new(url, content)?)
    }
}
