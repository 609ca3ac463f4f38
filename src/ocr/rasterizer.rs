//! PDF page rasterization
//!
//! Turns every page of a PDF into a PNG so it can be handed to an OCR engine.
//! Uses MuPDF for rendering and the `image` crate for encoding.

use std::io::Cursor;

use async_trait::async_trait;
use image::{DynamicImage, RgbImage};
use mupdf::{Colorspace, Document, Matrix};

use super::types::OcrError;

/// Renders PDF pages to images
#[async_trait]
pub trait PageRasterizer: Send + Sync {
    /// Render every page, in page order, as PNG bytes
    async fn rasterize(&self, pdf_data: &[u8]) -> Result<Vec<Vec<u8>>, OcrError>;
}

/// MuPDF-backed rasterizer
///
/// MuPDF documents are not `Send`, so each call opens the document inside a
/// blocking task and drops it before returning.
pub struct MupdfRasterizer {
    scale: f32,
}

impl MupdfRasterizer {
    pub fn new(scale: f32) -> Self {
        Self { scale }
    }
}

#[async_trait]
impl PageRasterizer for MupdfRasterizer {
    async fn rasterize(&self, pdf_data: &[u8]) -> Result<Vec<Vec<u8>>, OcrError> {
        let data = pdf_data.to_vec();
        let scale = self.scale;

        tokio::task::spawn_blocking(move || render_all_pages(&data, scale))
            .await
            .map_err(|e| OcrError::JoinError(e.to_string()))?
    }
}

fn render_all_pages(data: &[u8], scale: f32) -> Result<Vec<Vec<u8>>, OcrError> {
    let doc = Document::from_bytes(data, "application/pdf")
        .map_err(|e| OcrError::RenderError(e.to_string()))?;
    let page_count = doc
        .page_count()
        .map_err(|e| OcrError::RenderError(e.to_string()))?;

    if page_count <= 0 {
        return Err(OcrError::RenderError("PDF has no pages".to_string()));
    }

    let matrix = Matrix::new_scale(scale, scale);
    let colorspace = Colorspace::device_rgb();
    let mut pages = Vec::with_capacity(page_count as usize);

    for index in 0..page_count {
        let page = doc.load_page(index).map_err(|e| {
            OcrError::RenderError(format!("page {}: {}", index + 1, e))
        })?;
        let pixmap = page
            .to_pixmap(&matrix, &colorspace, false, true)
            .map_err(|e| OcrError::RenderError(format!("page {}: {}", index + 1, e)))?;

        pages.push(encode_pixmap(&pixmap)?);
        tracing::debug!("Rasterized page {}/{}", index + 1, page_count);
    }

    Ok(pages)
}

fn encode_pixmap(pixmap: &mupdf::Pixmap) -> Result<Vec<u8>, OcrError> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;

    let mut rgb_buffer = Vec::with_capacity((width * height * 3) as usize);

    for y in 0..height as usize {
        for x in 0..width as usize {
            let offset = (y * width as usize + x) * n;
            let r = samples.get(offset).copied().unwrap_or(0);
            let g = samples.get(offset + 1).copied().unwrap_or(0);
            let b = samples.get(offset + 2).copied().unwrap_or(0);
            rgb_buffer.extend_from_slice(&[r, g, b]);
        }
    }

    let img = RgbImage::from_raw(width, height, rgb_buffer)
        .ok_or_else(|| OcrError::RenderError("Failed to create image buffer".to_string()))?;

    encode_png(&DynamicImage::ImageRgb8(img))
        .map_err(|e| OcrError::RenderError(e.to_string()))
}

/// Encode an image as PNG bytes
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut output = Vec::new();
    img.write_to(&mut Cursor::new(&mut output), image::ImageFormat::Png)?;
    Ok(output)
}

/// Rasterizer returning fixed pages, for tests
#[cfg(test)]
pub struct MockRasterizer {
    pub result: Result<usize, String>,
}

#[cfg(test)]
#[async_trait]
impl PageRasterizer for MockRasterizer {
    async fn rasterize(&self, _pdf_data: &[u8]) -> Result<Vec<Vec<u8>>, OcrError> {
        match &self.result {
            Ok(pages) => Ok((0..*pages).map(|i| vec![i as u8]).collect()),
            Err(msg) => Err(OcrError::RenderError(msg.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_garbage_bytes_fail_to_render() {
        let rasterizer = MupdfRasterizer::new(1.0);
        let result = rasterizer.rasterize(b"definitely not a pdf").await;
        assert!(matches!(result, Err(OcrError::RenderError(_))));
    }

    #[test]
    fn test_encode_png_has_signature() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
        let png = encode_png(&img).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
