//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::Result;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL)
        .execute(pool)
        .await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- One row per processing attempt, never updated or deleted
CREATE TABLE IF NOT EXISTS ocr_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL,
    -- 'pdf' or 'image'
    file_type TEXT NOT NULL,
    -- Text preview on success, error message on failure
    extracted_text TEXT NOT NULL,
    -- 'success' or 'failed'
    status TEXT NOT NULL,
    -- RFC 3339 UTC, microsecond precision
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_ocr_logs_timestamp ON ocr_logs(timestamp);
CREATE INDEX IF NOT EXISTS idx_ocr_logs_status ON ocr_logs(status);
"#;
