//! Record storage using SQLite
//!
//! This module holds the storage gateway the dedup engine runs against:
//! existence checks on the dedup key and transactional batch inserts.
//! It also serves the read side (paged listing, lookup by id, counts).

mod schema;

pub use schema::*;

use crate::error::{Error, Result, StorageError};
use crate::models::{NewRecord, RawRecord, SourceTag};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::{debug, info};

/// Largest page a listing may request
pub const MAX_LIST_LIMIT: u32 = 1000;

/// The storage operations the dedup engine depends on
#[async_trait]
pub trait RecordGateway: Send + Sync {
    /// Whether a record with this dedup key is already stored
    async fn exists(
        &self,
        source: SourceTag,
        source_id: &str,
    ) -> std::result::Result<bool, StorageError>;

    /// Insert every record in one transaction; on failure nothing is stored
    async fn insert_many(&self, records: &[NewRecord]) -> std::result::Result<(), StorageError>;
}

/// Paging and filter options for listing records
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub skip: u32,
    pub limit: u32,
    pub source: Option<SourceTag>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 100,
            source: None,
        }
    }
}

/// One page of stored records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPage {
    pub data: Vec<RawRecord>,
    pub total: i64,
    pub skip: u32,
    pub limit: u32,
}

/// Per-source row counts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordStats {
    pub total: i64,
    pub news: i64,
    pub social: i64,
}

/// Record database handle
#[derive(Clone)]
pub struct RecordDb {
    pool: SqlitePool,
}

impl RecordDb {
    /// Connect to a database file, creating it if needed
    pub async fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        debug!("Connecting to SQLite database at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Connect and make sure the schema exists
    pub async fn new(db_path: &Path) -> Result<Self> {
        let db = Self::open(db_path).await?;
        if !db.is_initialized().await? {
            db.init_schema().await?;
        }
        Ok(db)
    }

    /// Initialize the database schema
    pub async fn init_schema(&self) -> Result<()> {
        info!("Initializing database schema");
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// Check if database is initialized
    pub async fn is_initialized(&self) -> Result<bool> {
        let result: Option<(i32,)> = sqlx::query_as(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='raw_records'",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(result.is_some())
    }

    // ===== Read side =====

    /// Get record by ID
    pub async fn get_record(&self, id: i64) -> Result<Option<RawRecord>> {
        let record = sqlx::query_as::<_, RawRecord>("SELECT * FROM raw_records WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    /// Get record by dedup key
    pub async fn get_record_by_key(
        &self,
        source: SourceTag,
        source_id: &str,
    ) -> Result<Option<RawRecord>> {
        let record = sqlx::query_as::<_, RawRecord>(
            "SELECT * FROM raw_records WHERE source = ? AND source_id = ?",
        )
        .bind(source.as_str())
        .bind(source_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// List records in insertion order with offset/limit paging
    pub async fn list_records(&self, query: &ListQuery) -> Result<RecordPage> {
        if query.limit == 0 || query.limit > MAX_LIST_LIMIT {
            return Err(Error::InvalidArgument(format!(
                "limit must be between 1 and {}",
                MAX_LIST_LIMIT
            )));
        }

        let source = query.source.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM raw_records WHERE (?1 IS NULL OR source = ?1)",
        )
        .bind(source)
        .fetch_one(&self.pool)
        .await?;

        let data = sqlx::query_as::<_, RawRecord>(
            r#"
            SELECT * FROM raw_records
            WHERE (?1 IS NULL OR source = ?1)
            ORDER BY id
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(source)
        .bind(i64::from(query.limit))
        .bind(i64::from(query.skip))
        .fetch_all(&self.pool)
        .await?;

        Ok(RecordPage {
            data,
            total,
            skip: query.skip,
            limit: query.limit,
        })
    }

    /// Row counts, total and per source
    pub async fn get_stats(&self) -> Result<RecordStats> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT source, COUNT(*) FROM raw_records GROUP BY source")
                .fetch_all(&self.pool)
                .await?;

        let mut stats = RecordStats::default();
        for (source, count) in rows {
            stats.total += count;
            match source.parse::<SourceTag>() {
                Ok(SourceTag::News) => stats.news += count,
                Ok(SourceTag::Social) => stats.social += count,
                Err(_) => debug!("Ignoring rows with unknown source '{}'", source),
            }
        }
        Ok(stats)
    }
}

#[async_trait]
impl RecordGateway for RecordDb {
    async fn exists(
        &self,
        source: SourceTag,
        source_id: &str,
    ) -> std::result::Result<bool, StorageError> {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM raw_records WHERE source = ? AND source_id = ? LIMIT 1",
        )
        .bind(source.as_str())
        .bind(source_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }

    async fn insert_many(&self, records: &[NewRecord]) -> std::result::Result<(), StorageError> {
        if records.is_empty() {
            return Ok(());
        }

        // Dropping `tx` without commit rolls back everything staged so far
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO raw_records (source, source_id, title, content, author, url, published_at, raw_metadata, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(record.source.as_str())
            .bind(&record.source_id)
            .bind(&record.title)
            .bind(&record.content)
            .bind(&record.author)
            .bind(&record.url)
            .bind(&record.published_at)
            .bind(&record.raw_metadata)
            .bind(&record.created_at)
            .bind(&record.updated_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!("insert_many: committed {} records", records.len());
        Ok(())
    }
}
