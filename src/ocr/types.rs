//! OCR Types
//!
//! Defines the provider selector, the declared upload kind and the error
//! types raised while turning uploaded bytes into text.

use serde::{Deserialize, Serialize};

/// OCR provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrProvider {
    /// Tesseract OCR (local)
    Tesseract,
    /// Ollama vision model (local LLM)
    Ollama,
}

impl Default for OcrProvider {
    fn default() -> Self {
        Self::Tesseract
    }
}

/// Kind of upload, decided by the endpoint that received it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Image,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Low-level failures from the rasterizer, the image decoder or an OCR engine
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("Failed to render PDF: {0}")]
    RenderError(String),

    #[error("{0}")]
    DecodeError(String),

    #[error("{0}")]
    EngineError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Task join error: {0}")]
    JoinError(String),
}

/// Caller-visible extraction failure
///
/// The `Display` output is the descriptive message that is both stored in
/// the request log and returned to the client.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("OCR processing failed: {0}")]
    Pdf(OcrError),

    #[error("Image OCR processing failed: {0}")]
    Image(OcrError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_messages() {
        let err = ExtractError::Image(OcrError::DecodeError("bad magic".to_string()));
        assert_eq!(
            err.to_string(),
            "Image OCR processing failed: bad magic"
        );

        let err = ExtractError::Pdf(OcrError::EngineError("Tesseract failed: boom".to_string()));
        assert_eq!(err.to_string(), "OCR processing failed: Tesseract failed: boom");
    }

    #[test]
    fn test_file_type_serialization() {
        assert_eq!(serde_json::to_string(&FileType::Pdf).unwrap(), "\"pdf\"");
        assert_eq!(FileType::Image.to_string(), "image");
    }
}
