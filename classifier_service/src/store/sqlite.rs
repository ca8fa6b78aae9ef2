use super::{NewRecord, RecordId, RecordStore, RecordSummary, StoreError, StoredImage};
use crate::config::DatabaseConfig;
use async_trait::async_trait;
use chrono::DateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;

#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct SummaryRow {
    id: i64,
    filename: String,
    label: String,
    confidence: f64,
    created_at: i64,
}

#[derive(FromRow)]
struct ImageRow {
    filename: String,
    content_type: String,
    image: Vec<u8>,
}

fn normalize_url(database_url: &str) -> String {
    if database_url.starts_with("sqlite:") {
        return database_url.to_string();
    }

    let path = std::path::PathBuf::from(database_url);
    let norm = path.to_string_lossy().replace('\\', "/");
    if path.is_absolute() {
        format!("sqlite:///{}", norm.trim_start_matches('/'))
    } else {
        format!("sqlite://{}", norm)
    }
}

impl SqliteRecordStore {
    /// Opens (creating if needed) the database at `config.url` and applies the
    /// embedded migrations. Accepts both `sqlite:` URLs and bare file paths.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = normalize_url(&config.url);
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");

        if !in_memory {
            let file = url
                .trim_start_matches("sqlite:")
                .trim_start_matches("//")
                .split('?')
                .next()
                .unwrap_or_default();
            if let Some(parent) = std::path::Path::new(file).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);
        // An in-memory database lives and dies with its single connection.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(config.max_connections)
        };
        let pool = pool_options.connect_with(options).await?;

        let store = Self { pool };
        store.migrate().await?;
        tracing::info!("Connected to record store at {}", url);

        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn save(&self, record: NewRecord) -> Result<RecordId, StoreError> {
        let result = sqlx::query(
            "INSERT INTO predictions \
             (filename, content_type, image, label, confidence, raw_score, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.filename)
        .bind(&record.content_type)
        .bind(&record.image)
        .bind(record.label.as_str())
        .bind(record.confidence)
        .bind(record.raw_score)
        .bind(record.timestamp.timestamp_micros())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!("Stored {} as record {}", record.filename, id);
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<RecordSummary>, StoreError> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            "SELECT id, filename, label, confidence, created_at FROM predictions \
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let label = row.label.parse().map_err(|reason| StoreError::Corrupt {
                    id: row.id,
                    reason,
                })?;
                let timestamp = DateTime::from_timestamp_micros(row.created_at).ok_or_else(|| {
                    StoreError::Corrupt {
                        id: row.id,
                        reason: format!("timestamp out of range: {}", row.created_at),
                    }
                })?;
                Ok(RecordSummary {
                    filename: row.filename,
                    label,
                    confidence: row.confidence,
                    timestamp,
                })
            })
            .collect()
    }

    async fn find_by_filename(&self, filename: &str) -> Result<Option<StoredImage>, StoreError> {
        let row: Option<ImageRow> = sqlx::query_as(
            "SELECT filename, content_type, image FROM predictions \
             WHERE filename = ? ORDER BY id ASC LIMIT 1",
        )
        .bind(filename)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| StoredImage {
            filename: row.filename,
            content_type: row.content_type,
            bytes: row.image,
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
