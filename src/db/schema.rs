//! SQLite schema definition

/// SQL schema for the record database
pub const SCHEMA_SQL: &str = r#"
-- Raw records: one row per ingested provider item
CREATE TABLE IF NOT EXISTS raw_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source TEXT NOT NULL,
    source_id TEXT,
    title TEXT,
    content TEXT NOT NULL,
    author TEXT,
    url TEXT,
    published_at TEXT,
    raw_metadata TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- Dedup key; NULL source_ids are distinct and never collide
CREATE UNIQUE INDEX IF NOT EXISTS idx_raw_records_dedup ON raw_records(source, source_id);

-- Indexes for listing
CREATE INDEX IF NOT EXISTS idx_raw_records_published ON raw_records(published_at);
CREATE INDEX IF NOT EXISTS idx_raw_records_created ON raw_records(created_at);
"#;
