//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Robly database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per persisted crawl run
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    seed_url TEXT,
    config_hash TEXT,
    saved_at TEXT NOT NULL,
    record_count INTEGER NOT NULL
);

-- Scalar fields of each page record
CREATE TABLE IF NOT EXISTS pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    position INTEGER NOT NULL,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    body_text TEXT NOT NULL,
    indexable INTEGER NOT NULL,
    UNIQUE(run_id, url)
);

CREATE INDEX IF NOT EXISTS idx_pages_run ON pages(run_id);
CREATE INDEX IF NOT EXISTS idx_pages_url ON pages(url);

-- Set-valued fields: keywords, h1s, links, images
CREATE TABLE IF NOT EXISTS page_values (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    page_id INTEGER NOT NULL REFERENCES pages(id),
    kind TEXT NOT NULL,
    position INTEGER NOT NULL,
    value TEXT NOT NULL,
    UNIQUE(page_id, kind, value)
);

CREATE INDEX IF NOT EXISTS idx_page_values_page ON page_values(page_id);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
