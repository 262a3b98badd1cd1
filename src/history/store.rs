//! SQLite-based persistence backend

use crate::history::{HistoryRecord, PersistenceBackend};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// SQLite history store
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

impl SqliteHistoryStore {
    /// Create a new SQLite store
    pub async fn new(db_path: &str) -> Result<Self> {
        let url = if db_path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{}?mode=rwc", db_path)
        };
        let pool = SqlitePool::connect(&url)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.init().await?;

        Ok(store)
    }

    /// Create store with default path
    pub async fn with_default_path() -> Result<Self> {
        let data_dir = dirs::data_local_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
        let db_dir = data_dir.join("redraft");
        std::fs::create_dir_all(&db_dir)?;

        let db_path = db_dir.join("history.db");
        Self::new(db_path.to_str().context("Non-UTF-8 data directory")?).await
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS history_records (
                id TEXT PRIMARY KEY,
                recorded_at TEXT NOT NULL,
                label TEXT NOT NULL,
                original_text TEXT NOT NULL,
                result_text TEXT NOT NULL,
                tools_used TEXT NOT NULL,
                changes TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_recorded_at ON history_records(recorded_at);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Convert DateTime<Utc> to NaiveDateTime for SQLite
    fn to_naive(dt: DateTime<Utc>) -> NaiveDateTime {
        dt.naive_utc()
    }

    /// Convert NaiveDateTime to DateTime<Utc>
    fn from_naive(dt: NaiveDateTime) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(dt, Utc)
    }

    fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<HistoryRecord> {
        let changes_json: String = row.get("changes");
        Ok(HistoryRecord {
            id: Uuid::parse_str(&row.get::<String, _>("id"))?,
            timestamp: Self::from_naive(row.get("recorded_at")),
            label: row.get("label"),
            original_text: row.get("original_text"),
            result_text: row.get("result_text"),
            tools_used: row.get("tools_used"),
            changes: serde_json::from_str(&changes_json)
                .context("Failed to decode stored change list")?,
        })
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for SqliteHistoryStore {
    async fn save(&self, record: &HistoryRecord) -> Result<()> {
        let changes =
            serde_json::to_string(&record.changes).context("Failed to encode change list")?;

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO history_records
            (id, recorded_at, label, original_text, result_text, tools_used, changes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(record.id.to_string())
        .bind(Self::to_naive(record.timestamp))
        .bind(&record.label)
        .bind(&record.original_text)
        .bind(&record.result_text)
        .bind(&record.tools_used)
        .bind(changes)
        .execute(&self.pool)
        .await
        .context("Failed to save history record")?;

        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<HistoryRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, recorded_at, label, original_text, result_text, tools_used, changes
            FROM history_records
            ORDER BY recorded_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load history records")?;

        rows.iter().map(Self::record_from_row).collect()
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM history_records")
            .execute(&self.pool)
            .await
            .context("Failed to clear history")?;

        Ok(())
    }
}
