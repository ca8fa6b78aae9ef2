mod sqlite;

pub use sqlite::SqliteRecordStore;

use crate::decision::Label;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub type RecordId = i64;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record store unavailable: {0}")]
    Unavailable(String),
    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: RecordId, reason: String },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct NewRecord {
    pub filename: String,
    pub content_type: String,
    pub image: Vec<u8>,
    pub label: Label,
    pub confidence: f64,
    pub raw_score: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordSummary {
    pub filename: String,
    pub label: Label,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredImage {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Append-only persistence of uploaded images and their predictions.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    async fn save(&self, record: NewRecord) -> Result<RecordId, StoreError>;

    /// Every record, newest first. Records sharing a timestamp come back in
    /// reverse insertion order.
    async fn list_all(&self) -> Result<Vec<RecordSummary>, StoreError>;

    /// Exact filename match. When several uploads share a name the earliest
    /// stored one is returned.
    async fn find_by_filename(&self, filename: &str) -> Result<Option<StoredImage>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
