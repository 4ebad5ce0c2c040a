//! Page records produced by a crawl run
//!
//! A [`PageRecord`] is built exactly once per successfully fetched and parsed
//! URL and is never modified afterwards. Its fields are only reachable through
//! accessors.

use std::collections::BTreeSet;
use thiserror::Error;

/// Errors raised when constructing a record
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("Page record URL cannot be empty")]
    EmptyUrl,
}

/// Everything extracted from a page except its URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    pub title: String,
    pub description: String,
    pub keywords: BTreeSet<String>,
    pub h1s: BTreeSet<String>,

    /// Link targets as written in the page, deduplicated, in first-seen order
    pub links: Vec<String>,

    /// Absolute image URLs
    pub images: BTreeSet<String>,
    pub text: String,
    pub indexable: bool,
}

impl Default for PageContent {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            keywords: BTreeSet::new(),
            h1s: BTreeSet::new(),
            links: Vec::new(),
            images: BTreeSet::new(),
            text: String::new(),
            indexable: true,
        }
    }
}

/// One crawled page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    url: String,
    content: PageContent,
}

impl PageRecord {
    /// Creates a record for `url`
    ///
    /// Duplicate links are collapsed (keeping the first occurrence) so the
    /// record never holds the same link twice, whatever the caller passed.
    pub fn new(url: impl Into<String>, mut content: PageContent) -> Result<Self, RecordError> {
        let url = url.into();
        if url.is_empty() {
            return Err(RecordError::EmptyUrl);
        }

        let mut seen = BTreeSet::new();
        content.links.retain(|link| seen.insert(link.clone()));

        Ok(Self { url, content })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.content.title
    }

    pub fn description(&self) -> &str {
        &self.content.description
    }

    pub fn keywords(&self) -> &BTreeSet<String> {
        &self.content.keywords
    }

    pub fn h1s(&self) -> &BTreeSet<String> {
        &self.content.h1s
    }

    /// Outbound links in the order they were first observed
    pub fn links(&self) -> &[String] {
        &self.content.links
    }

    pub fn images(&self) -> &BTreeSet<String> {
        &self.content.images
    }

    pub fn text(&self) -> &str {
        &self.content.text
    }

    pub fn indexable(&self) -> bool {
        self.content.indexable
    }

    pub fn content(&self) -> &PageContent {
        &self.content
    }
}
