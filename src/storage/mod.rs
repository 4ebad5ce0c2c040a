//! Storage module for persisting crawl results
//!
//! This module handles the sink side of a crawl run:
//! - The `RecordSink` contract the crawler hands its record set to
//! - SQLite database initialization and schema management
//! - Reading persisted runs back for inspection

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{RecordSink, SinkError, SinkResult};

use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> SinkResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Represents a persisted crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub seed_url: Option<String>,
    pub config_hash: Option<String>,
    pub saved_at: String,
    pub record_count: u64,
}

/// Which set-valued page field a `page_values` row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Keyword,
    H1,
    Link,
    Image,
}

impl ValueKind {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::H1 => "h1",
            Self::Link => "link",
            Self::Image => "image",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "keyword" => Some(Self::Keyword),
            "h1" => Some(Self::H1),
            "link" => Some(Self::Link),
            "image" => Some(Self::Image),
            _ => None,
        }
    }
}
