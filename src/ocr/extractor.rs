//! Text extraction
//!
//! Stateless conversion of uploaded bytes into text. PDFs are rasterized page
//! by page and each page is OCR'd in order; images are decoded and OCR'd once.
//! Any failure fails the whole extraction, no partial text is returned.

use std::sync::Arc;

use super::{
    provider::OcrProviderTrait,
    rasterizer::{encode_png, PageRasterizer},
    types::{ExtractError, OcrError},
};

/// Wraps a rasterizer and an OCR provider
#[derive(Clone)]
pub struct TextExtractor {
    rasterizer: Arc<dyn PageRasterizer>,
    provider: Arc<dyn OcrProviderTrait>,
    language: String,
}

impl TextExtractor {
    pub fn new(
        rasterizer: Arc<dyn PageRasterizer>,
        provider: Arc<dyn OcrProviderTrait>,
        language: &str,
    ) -> Self {
        Self {
            rasterizer,
            provider,
            language: language.to_string(),
        }
    }

    /// OCR every page of a PDF
    ///
    /// Pages are joined as `--- Page <n> ---\n<text>\n\n` and the result is
    /// trimmed.
    pub async fn extract_from_pdf(&self, data: &[u8]) -> Result<String, ExtractError> {
        let pages = self
            .rasterizer
            .rasterize(data)
            .await
            .map_err(ExtractError::Pdf)?;

        let mut full_text = String::new();
        for (index, page_image) in pages.iter().enumerate() {
            let text = self
                .provider
                .recognize(page_image, &self.language)
                .await
                .map_err(ExtractError::Pdf)?;

            tracing::debug!("OCR page {}: {} chars", index + 1, text.chars().count());
            full_text.push_str(&format!("--- Page {} ---\n{}\n\n", index + 1, text));
        }

        Ok(full_text.trim().to_string())
    }

    /// OCR a single still image
    pub async fn extract_from_image(&self, data: &[u8]) -> Result<String, ExtractError> {
        let png = decode_to_png(data).await.map_err(ExtractError::Image)?;

        let text = self
            .provider
            .recognize(&png, &self.language)
            .await
            .map_err(ExtractError::Image)?;

        Ok(text.trim().to_string())
    }
}

/// Decode any supported image format and re-encode it as PNG
async fn decode_to_png(data: &[u8]) -> Result<Vec<u8>, OcrError> {
    let data = data.to_vec();

    tokio::task::spawn_blocking(move || {
        let img = image::load_from_memory(&data)
            .map_err(|e| OcrError::DecodeError(e.to_string()))?;
        encode_png(&img).map_err(|e| OcrError::DecodeError(e.to_string()))
    })
    .await
    .map_err(|e| OcrError::JoinError(e.to_string()))?
}
