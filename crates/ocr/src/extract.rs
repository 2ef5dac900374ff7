//! OCR-capable extractors
//!
//! [`OcrPdfExtractor`] reads the text layer first and only falls back to
//! rendering plus recognition when the document has none. [`ImageExtractor`]
//! recognises PNG and JPEG uploads directly.

use guardian_core::{DocumentFormat, ExtractError, ExtractResult, TextExtractor};
use guardian_pdf::{extract_text_layer, require_text};
use guardian_render::{render_with_config, PdfiumConfig, RenderError, RenderOptions};
use image::DynamicImage;
use std::sync::Arc;

use crate::clean::clean_ocr_text;
use crate::engine::OcrEngine;
use crate::preprocess::preprocess;

/// A ready engine, or the reason there is none.
pub type EngineSlot = Result<Arc<dyn OcrEngine>, String>;

/// Turns a PDF into one image per page.
pub trait PageRenderer: Send + Sync {
    fn render_pages(
        &self,
        bytes: &[u8],
        password: Option<&str>,
    ) -> Result<Vec<DynamicImage>, RenderError>;
}

/// Renders through pdfium, binding the library on each call.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRenderer {
    pub library: PdfiumConfig,
    pub options: RenderOptions,
}

impl PageRenderer for PdfiumRenderer {
    fn render_pages(
        &self,
        bytes: &[u8],
        password: Option<&str>,
    ) -> Result<Vec<DynamicImage>, RenderError> {
        render_with_config(&self.library, bytes, password, &self.options)
    }
}

/// Preprocesses, recognises and cleans one image.
pub fn recognize_page(engine: &dyn OcrEngine, img: &DynamicImage) -> ExtractResult<String> {
    let prepared = DynamicImage::ImageLuma8(preprocess(img));
    let raw = engine
        .recognize_image(&prepared)
        .map_err(|e| ExtractError::OcrUnavailable(e.to_string()))?;
    Ok(clean_ocr_text(&raw))
}

/// `--- Page N ---` sections; `ImageOnly` when no page produced text.
pub fn ocr_pages(engine: &dyn OcrEngine, pages: &[DynamicImage]) -> ExtractResult<String> {
    let mut sections = Vec::with_capacity(pages.len());
    let mut any_text = false;

    for (index, page) in pages.iter().enumerate() {
        let text = recognize_page(engine, page)?;
        log::debug!("[OCR] page {}: {} chars", index + 1, text.chars().count());
        any_text |= !text.is_empty();
        sections.push(format!("--- Page {} ---\n{}", index + 1, text));
    }

    if !any_text {
        return Err(ExtractError::ImageOnly);
    }
    Ok(sections.join("\n").trim().to_string())
}

fn engine_from(slot: &EngineSlot) -> ExtractResult<&dyn OcrEngine> {
    slot.as_ref()
        .map(|engine| engine.as_ref())
        .map_err(|reason| ExtractError::OcrUnavailable(reason.clone()))
}

pub struct OcrPdfExtractor {
    engine: EngineSlot,
    renderer: Box<dyn PageRenderer>,
}

impl OcrPdfExtractor {
    pub fn new(engine: EngineSlot, renderer: Box<dyn PageRenderer>) -> Self {
        Self { engine, renderer }
    }
}

impl TextExtractor for OcrPdfExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn extract_raw(&self, bytes: &[u8], password: Option<&str>) -> ExtractResult<String> {
        // Decryption failures return here and never reach OCR.
        let layer = extract_text_layer(bytes, password)?;
        match require_text(&layer) {
            Err(ExtractError::ImageOnly) => {}
            other => return other,
        }

        let engine = engine_from(&self.engine)?;
        log::info!(
            "[OCR] no text layer in {} page(s), running OCR: {}",
            layer.pages.len(),
            engine.audit_info()
        );

        let pages = self
            .renderer
            .render_pages(bytes, password)
            .map_err(|e| ExtractError::OcrUnavailable(e.to_string()))?;
        ocr_pages(engine, &pages)
    }
}

pub struct ImageExtractor {
    format: DocumentFormat,
    engine: EngineSlot,
}

impl ImageExtractor {
    pub fn new(format: DocumentFormat, engine: EngineSlot) -> Self {
        Self { format, engine }
    }
}

impl TextExtractor for ImageExtractor {
    fn format(&self) -> DocumentFormat {
        self.format
    }

    fn extract_raw(&self, bytes: &[u8], _password: Option<&str>) -> ExtractResult<String> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| ExtractError::decode(self.format.as_str(), e))?;
        let engine = engine_from(&self.engine)?;

        let text = recognize_page(engine, &img)?;
        if text.is_empty() {
            return Err(ExtractError::ImageOnly);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use guardian_core::FailureKind;
    use guardian_pdf::test_support::{image_only_pdf, text_pdf, undecodable_font_pdf};
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns canned text per call, cycling.
    struct StubEngine {
        outputs: Vec<String>,
        calls: AtomicUsize,
    }

    impl StubEngine {
        fn slot(outputs: &[&str]) -> EngineSlot {
            Ok(Arc::new(StubEngine {
                outputs: outputs.iter().map(|s| s.to_string()).collect(),
                calls: AtomicUsize::new(0),
            }))
        }
    }

    impl OcrEngine for StubEngine {
        fn recognize_image(&self, _img: &DynamicImage) -> Result<String, OcrError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.outputs[n % self.outputs.len()].clone())
        }

        fn audit_info(&self) -> String {
            "stub".to_string()
        }
    }

    struct FailingEngine;

    impl OcrEngine for FailingEngine {
        fn recognize_image(&self, _img: &DynamicImage) -> Result<String, OcrError> {
            Err(OcrError::Recognition("engine crashed".to_string()))
        }

        fn audit_info(&self) -> String {
            "failing".to_string()
        }
    }

    struct StubRenderer(usize);

    impl PageRenderer for StubRenderer {
        fn render_pages(
            &self,
            _bytes: &[u8],
            _password: Option<&str>,
        ) -> Result<Vec<DynamicImage>, RenderError> {
            Ok((0..self.0)
                .map(|_| DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]))))
                .collect())
        }
    }

    struct NoPdfium;

    impl PageRenderer for NoPdfium {
        fn render_pages(
            &self,
            _bytes: &[u8],
            _password: Option<&str>,
        ) -> Result<Vec<DynamicImage>, RenderError> {
            Err(RenderError::LibraryUnavailable("missing".to_string()))
        }
    }

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 255, 255])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_text_layer_wins_over_ocr() {
        let extractor = OcrPdfExtractor::new(StubEngine::slot(&["ocr text"]), Box::new(StubRenderer(1)));
        let result = extractor.extract(&text_pdf(&["Contact ravi@mail.in"]), None);
        assert!(!result.is_scanned);
        assert!(result.text.contains("ravi@mail.in"));
        assert!(!result.text.contains("ocr text"));
    }

    #[test]
    fn test_image_pdf_falls_back_to_ocr_pages() {
        let extractor = OcrPdfExtractor::new(
            StubEngine::slot(&["Call 9876543210", "Sector 5 Road"]),
            Box::new(StubRenderer(2)),
        );
        let result = extractor.extract(&image_only_pdf(), None);
        assert!(!result.is_scanned);
        assert_eq!(
            result.text,
            "--- Page 1 ---\nCall 9876543210\n--- Page 2 ---\nSector 5 Road"
        );
    }

    #[test]
    fn test_ocr_with_no_text_is_image_only() {
        let extractor = OcrPdfExtractor::new(StubEngine::slot(&["  ||  "]), Box::new(StubRenderer(2)));
        let result = extractor.extract(&image_only_pdf(), None);
        assert!(result.is_scanned);
        assert_eq!(result.failure, Some(FailureKind::ImageOnly));
    }

    #[test]
    fn test_missing_engine_is_ocr_unavailable() {
        let extractor = OcrPdfExtractor::new(
            Err("tesseract binary not found".to_string()),
            Box::new(StubRenderer(1)),
        );
        let result = extractor.extract(&image_only_pdf(), None);
        assert!(result.is_scanned);
        assert_eq!(result.failure, Some(FailureKind::OcrUnavailable));
        assert!(result.text.contains("tesseract binary not found"));
    }

    #[test]
    fn test_engine_failure_is_ocr_unavailable() {
        let extractor = OcrPdfExtractor::new(Ok(Arc::new(FailingEngine)), Box::new(StubRenderer(1)));
        let result = extractor.extract(&image_only_pdf(), None);
        assert_eq!(result.failure, Some(FailureKind::OcrUnavailable));
    }

    #[test]
    fn test_render_failure_is_ocr_unavailable() {
        let extractor = OcrPdfExtractor::new(StubEngine::slot(&["text"]), Box::new(NoPdfium));
        let result = extractor.extract(&image_only_pdf(), None);
        assert_eq!(result.failure, Some(FailureKind::OcrUnavailable));
    }

    #[test]
    fn test_corrupt_pdf_is_not_retried_with_ocr() {
        let extractor = OcrPdfExtractor::new(StubEngine::slot(&["should not run"]), Box::new(StubRenderer(1)));
        let result = extractor.extract(b"%PDF-1.4 garbage", None);
        assert!(result.is_scanned);
        assert_eq!(result.failure, Some(FailureKind::UnreadablePdf));
    }

    #[test]
    fn test_undecodable_text_layer_is_not_retried_with_ocr() {
        let extractor = OcrPdfExtractor::new(StubEngine::slot(&["should not run"]), Box::new(StubRenderer(1)));
        let result = extractor.extract(&undecodable_font_pdf(), None);
        assert!(result.is_scanned);
        assert_eq!(result.failure, Some(FailureKind::DecodeError));
        assert!(!result.text.contains("should not run"));
    }

    #[test]
    fn test_image_upload_is_recognised_and_cleaned() {
        let extractor = ImageExtractor::new(DocumentFormat::Png, StubEngine::slot(&["Aadhaar:  1234 5678 9012 !"]));
        let result = extractor.extract(&png_bytes(), None);
        assert!(!result.is_scanned);
        assert_eq!(result.text, "Aadhaar 1234 5678 9012");
    }

    #[test]
    fn test_undecodable_image_is_decode_error() {
        let extractor = ImageExtractor::new(DocumentFormat::Jpeg, StubEngine::slot(&["x"]));
        let result = extractor.extract(b"not an image", None);
        assert_eq!(result.failure, Some(FailureKind::DecodeError));
        assert!(result.text.contains("JPEG"));
    }
}
