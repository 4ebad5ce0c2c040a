//! Robly: a depth-1 page-record crawler
//!
//! This crate fetches a seed page, extracts structured metadata and outbound
//! links from it, follows those links one hop deep, and hands the resulting
//! page records to a sink for indexing.

pub mod config;
pub mod crawler;
pub mod record;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Robly operations
#[derive(Debug, Error)]
pub enum RoblyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Sink error: {0}")]
    Sink(#[from] storage::SinkError),

    #[error("Invalid seed URL {url}: {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

/// URL decomposition and resolution errors
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("Failed to parse URL {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("Missing host in URL: {0}")]
    MissingHost(String),

    #[error("No registrable domain in host: {0}")]
    NoRegistrableDomain(String),
}

/// Errors raised while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Not an HTML document (content-type: {0})")]
    NotHtml(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Fetch cancelled")]
    Cancelled,
}

/// Errors raised while turning fetched bytes into a document tree
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Document is empty")]
    Empty,
}

/// Errors raised by a single field extraction rule
///
/// These never escape the extractor: each one is converted to the default
/// value of the field that raised it.
#[derive(Debug, Error)]
pub enum FieldExtractionError {
    #[error("No <{0}> element found")]
    MissingElement(&'static str),

    #[error("Element <{element}> has no {attribute} attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("Invalid selector {selector}: {reason}")]
    Selector { selector: String, reason: String },
}

/// Result type alias for Robly operations
pub type Result<T> = std::result::Result<T, RoblyError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL resolution
pub type ResolveResult<T> = std::result::Result<T, ResolutionError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlOutcome, CrawlReport};
pub use record::{PageContent, PageRecord};
pub use crate::url::{base_domain_of, protocol_of, resolve};
