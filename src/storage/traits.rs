//! Sink trait and error types
//!
//! A sink receives the complete record set of a crawl run, once, after the
//! run finishes.

use crate::record::{PageRecord, RecordError};
use thiserror::Error;

/// Errors that can occur while persisting a record set
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Stored record is invalid: {0}")]
    InvalidRecord(#[from] RecordError),

    #[error("Unknown value kind in database: {0}")]
    UnknownValueKind(String),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for the records of a crawl run
pub trait RecordSink {
    /// Persists the full record set of one run
    fn save(&mut self, records: &[PageRecord]) -> SinkResult<()>;
}

/// Keeps records in memory
impl RecordSink for Vec<PageRecord> {
    fn save(&mut self, records: &[PageRecord]) -> SinkResult<()> {
        self.extend_from_slice(records);
        Ok(())
    }
}
