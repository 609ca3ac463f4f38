//! OCR Routes
//!
//! Endpoints:
//! - POST /ocr/pdf - Multipart PDF upload, filename must end in `.pdf`
//! - POST /ocr/image - Multipart image upload

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::ocr::FileType;
use crate::state::AppState;

/// Multipart field carrying the upload
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct OcrResponse {
    pub filename: String,
    pub text: String,
}

/// Create the OCR router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pdf", post(process_pdf))
        .route("/image", post(process_image))
}

/// POST /ocr/pdf
async fn process_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<OcrResponse>> {
    process_upload(&state, FileType::Pdf, multipart).await
}

/// POST /ocr/image
async fn process_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<OcrResponse>> {
    process_upload(&state, FileType::Image, multipart).await
}

async fn process_upload(
    state: &AppState,
    file_type: FileType,
    multipart: Multipart,
) -> Result<Json<OcrResponse>> {
    let (filename, data) = read_file_field(multipart).await?;

    let text = state.pipeline().process(file_type, &filename, data.to_vec()).await?;

    Ok(Json(OcrResponse { filename, text }))
}

/// Pull the `file` field out of a multipart body
async fn read_file_field(mut multipart: Multipart) -> Result<(String, Bytes)> {
    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read upload: {}", e))
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read file data: {}", e);
            AppError::BadRequest(format!("Failed to read file data: {}", e))
        })?;

        tracing::debug!("Read {} bytes for '{}'", data.len(), filename);
        return Ok((filename, data));
    }

    tracing::warn!("No file field found in multipart upload");
    Err(AppError::BadRequest(
        "No file provided. Use field name 'file'".to_string(),
    ))
}
