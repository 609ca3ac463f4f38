//! Ingestion pipeline
//!
//! Runs one upload end to end: gate, extract, log, respond.
//!
//! Every attempt that gets past the gate writes exactly one log row, whether
//! extraction succeeded or not. Extraction failures are logged and then
//! returned to the caller with the same message.

use sqlx::SqlitePool;

use crate::db::{LogRepository, LogStatus, NewOcrLog};
use crate::error::{AppError, Result};
use crate::ocr::{FileType, TextExtractor};

/// Characters of extracted text kept in the log row
pub const PREVIEW_CHARS: usize = 1000;

/// Orchestrates extraction and request logging
#[derive(Clone)]
pub struct IngestionPipeline {
    extractor: TextExtractor,
    db: SqlitePool,
}

impl IngestionPipeline {
    pub fn new(extractor: TextExtractor, db: SqlitePool) -> Self {
        Self { extractor, db }
    }

    /// Process one upload of the declared kind and return the full text
    ///
    /// Once past the gate the attempt runs on its own task: dropping the
    /// returned future does not stop extraction or its log write.
    pub async fn process(&self, file_type: FileType, filename: &str, data: Vec<u8>) -> Result<String> {
        if file_type == FileType::Pdf && !is_pdf_filename(filename) {
            tracing::warn!(filename = %filename, "Rejected non-PDF upload");
            return Err(AppError::BadRequest("Only PDF files are supported".to_string()));
        }

        tracing::info!(
            filename = %filename,
            file_type = %file_type,
            size = data.len(),
            "Extracting text"
        );

        let extractor = self.extractor.clone();
        let db = self.db.clone();
        let filename = filename.to_string();

        let task = tokio::spawn(async move {
            extract_and_log(&extractor, &db, file_type, &filename, &data).await
        });

        task.await?
    }
}

async fn extract_and_log(
    extractor: &TextExtractor,
    db: &SqlitePool,
    file_type: FileType,
    filename: &str,
    data: &[u8],
) -> Result<String> {
    let outcome = match file_type {
        FileType::Pdf => extractor.extract_from_pdf(data).await,
        FileType::Image => extractor.extract_from_image(data).await,
    };

    let repo = LogRepository::new(db);

    match outcome {
        Ok(text) => {
            let id = repo
                .append(&NewOcrLog {
                    filename,
                    file_type,
                    extracted_text: truncate_chars(&text, PREVIEW_CHARS),
                    status: LogStatus::Success,
                })
                .await?;

            tracing::info!(
                log_id = id,
                filename = %filename,
                chars = text.chars().count(),
                "OCR succeeded"
            );
            Ok(text)
        }
        Err(e) => {
            let message = e.to_string();
            let id = repo
                .append(&NewOcrLog {
                    filename,
                    file_type,
                    extracted_text: &message,
                    status: LogStatus::Failed,
                })
                .await?;

            tracing::error!(log_id = id, filename = %filename, "{}", message);
            Err(AppError::Extraction(e))
        }
    }
}

/// `.pdf` suffix, case-insensitive
pub fn is_pdf_filename(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf")
}

/// First `max` characters of `text`
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
