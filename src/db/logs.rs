//! OCR request log operations
//!
//! Rows are only ever inserted and read back; there is no update or delete path.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::ocr::FileType;

/// Number of rows shown on the admin dashboard
pub const RECENT_LOG_LIMIT: i64 = 50;

/// Outcome of a processing attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum LogStatus {
    Success,
    Failed,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

/// OCR log record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OcrLog {
    pub id: i64,
    pub filename: String,
    pub file_type: FileType,
    pub extracted_text: String,
    pub status: LogStatus,
    pub timestamp: String,
}

/// Values for a new log row
#[derive(Debug, Clone)]
pub struct NewOcrLog<'a> {
    pub filename: &'a str,
    pub file_type: FileType,
    pub extracted_text: &'a str,
    pub status: LogStatus,
}

/// OCR log repository
pub struct LogRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> LogRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert one row and return its id
    pub async fn append(&self, entry: &NewOcrLog<'_>) -> Result<i64> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let result = sqlx::query(
            r#"
            INSERT INTO ocr_logs (filename, file_type, extracted_text, status, timestamp)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.filename)
        .bind(entry.file_type)
        .bind(entry.extracted_text)
        .bind(entry.status)
        .bind(&now)
        .execute(self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Most recent rows first, at most `limit`
    pub async fn list_recent(&self, limit: i64) -> Result<Vec<OcrLog>> {
        let logs = sqlx::query_as::<_, OcrLog>(
            r#"
            SELECT id, filename, file_type, extracted_text, status, timestamp
            FROM ocr_logs
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit.max(0))
        .fetch_all(self.pool)
        .await?;

        Ok(logs)
    }

    /// Total number of rows
    pub async fn count(&self) -> Result<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ocr_logs")
            .fetch_one(self.pool)
            .await?;

        Ok(result.0)
    }
}
