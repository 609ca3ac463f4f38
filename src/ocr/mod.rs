//! OCR Module
//!
//! Turns uploaded PDFs and images into text.
//!
//! Supports multiple backends:
//! - Tesseract (local, requires installation)
//! - Ollama vision models (local LLM)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blind_ocr_server::ocr::{build_provider, MupdfRasterizer, TextExtractor};
//!
//! let provider = build_provider(&config.ocr);
//! let rasterizer = Arc::new(MupdfRasterizer::new(config.ocr.render_scale));
//! let extractor = TextExtractor::new(rasterizer, provider, &config.ocr.language);
//!
//! let text = extractor.extract_from_pdf(&pdf_bytes).await?;
//! ```

mod extractor;
mod provider;
mod rasterizer;
mod types;

pub use extractor::TextExtractor;
pub use provider::{build_provider, OcrProviderTrait, OllamaProvider, TesseractProvider};
pub use rasterizer::{encode_png, MupdfRasterizer, PageRasterizer};
pub use types::{ExtractError, FileType, OcrError, OcrProvider};

#[cfg(test)]
pub(crate) use extractor::tests::sample_png;
#[cfg(test)]
pub(crate) use provider::MockProvider;
#[cfg(test)]
pub(crate) use rasterizer::MockRasterizer;
