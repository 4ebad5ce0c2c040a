//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the `RecordSink` trait.

use crate::record::{PageContent, PageRecord};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordSink, SinkError, SinkResult};
use crate::storage::{RunRecord, ValueKind};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
    config_hash: Option<String>,
    seed_url: Option<String>,
}

impl SqliteStorage {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> SinkResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn,
            config_hash: None,
            seed_url: None,
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn,
            config_hash: None,
            seed_url: None,
        })
    }

    /// Tags every run saved through this handle with a configuration hash
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = Some(hash.into());
        self
    }

    /// Records `seed` as the seed of every run saved through this handle
    ///
    /// Without it the seed is taken from the first record, so a run whose
    /// seed failed is stored with no seed.
    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed_url = Some(seed.into());
        self
    }

    /// Gets a run by ID
    pub fn get_run(&self, run_id: i64) -> SinkResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT id, seed_url, config_hash, saved_at, record_count FROM runs WHERE id = ?1",
                params![run_id],
                row_to_run,
            )
            .optional()?
            .ok_or(SinkError::RunNotFound(run_id))
    }

    /// Gets the most recently saved run
    pub fn latest_run(&self) -> SinkResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, seed_url, config_hash, saved_at, record_count FROM runs ORDER BY id DESC LIMIT 1",
                [],
                row_to_run,
            )
            .optional()?;
        Ok(run)
    }

    /// Loads the records of a run, in the order they were saved
    pub fn load_run(&self, run_id: i64) -> SinkResult<Vec<PageRecord>> {
        self.get_run(run_id)?;

        let mut stmt = self.conn.prepare(
            "SELECT id, url, title, description, body_text, indexable
             FROM pages WHERE run_id = ?1 ORDER BY position",
        )?;
        let pages = stmt
            .query_map(params![run_id], |row| {
                let content = PageContent {
                    title: row.get(2)?,
                    description: row.get(3)?,
                    text: row.get(4)?,
                    indexable: row.get(5)?,
                    ..PageContent::default()
                };
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, content))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(pages.len());
        for (page_id, url, mut content) in pages {
            self.load_values(page_id, &mut content)?;
            records.push(PageRecord::new(url, content)?);
        }

        Ok(records)
    }

    fn load_values(&self, page_id: i64, content: &mut PageContent) -> SinkResult<()> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT kind, value FROM page_values WHERE page_id = ?1 ORDER BY kind, position",
        )?;
        let rows = stmt
            .query_map(params![page_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for (kind, value) in rows {
            match ValueKind::from_db_string(&kind) {
                Some(ValueKind::Keyword) => {
                    content.keywords.insert(value);
                }
                Some(ValueKind::H1) => {
                    content.h1s.insert(value);
                }
                Some(ValueKind::Link) => content.links.push(value),
                Some(ValueKind::Image) => {
                    content.images.insert(value);
                }
                None => return Err(SinkError::UnknownValueKind(kind)),
            }
        }

        Ok(())
    }

    /// Counts persisted runs
    pub fn count_runs(&self) -> SinkResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Counts persisted page records across all runs
    pub fn count_pages(&self) -> SinkResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Counts persisted page records that asked not to be indexed
    pub fn count_non_indexable(&self) -> SinkResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pages WHERE indexable = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

impl RecordSink for SqliteStorage {
    fn save(&mut self, records: &[PageRecord]) -> SinkResult<()> {
        let seed_url = self
            .seed_url
            .clone()
            .or_else(|| records.first().map(|r| r.url().to_string()));
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO runs (seed_url, config_hash, saved_at, record_count) VALUES (?1, ?2, ?3, ?4)",
            params![
                seed_url,
                self.config_hash,
                Utc::now().to_rfc3339(),
                records.len() as i64
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        for (position, record) in records.iter().enumerate() {
            insert_record(&tx, run_id, position, record)?;
        }

        tx.commit()?;
        tracing::info!("Saved run {} with {} records", run_id, records.len());
        Ok(())
    }
}

fn insert_record(
    tx: &Transaction,
    run_id: i64,
    position: usize,
    record: &PageRecord,
) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO pages (run_id, position, url, title, description, body_text, indexable)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            run_id,
            position as i64,
            record.url(),
            record.title(),
            record.description(),
            record.text(),
            record.indexable()
        ],
    )?;
    let page_id = tx.last_insert_rowid();

    insert_values(tx, page_id, ValueKind::Keyword, record.keywords())?;
    insert_values(tx, page_id, ValueKind::H1, record.h1s())?;
    insert_values(tx, page_id, ValueKind::Link, record.links())?;
    insert_values(tx, page_id, ValueKind::Image, record.images())?;
    Ok(())
}

fn insert_values<'a>(
    tx: &Transaction,
    page_id: i64,
    kind: ValueKind,
    values: impl IntoIterator<Item = &'a String>,
) -> rusqlite::Result<()> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO page_values (page_id, kind, position, value) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for (position, value) in values.into_iter().enumerate() {
        stmt.execute(params![page_id, kind.to_db_string(), position as i64, value])?;
    }
    Ok(())
}

fn row_to_run(row: &rusqlite::Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        seed_url: row.get(1)?,
        config_hash: row.get(2)?,
        saved_at: row.get(3)?,
        record_count: row.get::<_, i64>(4)? as u64,
    })
}
