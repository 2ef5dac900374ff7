//! Extraction dispatcher
//!
//! Picks the extractor from the filename extension and always returns one
//! [`ExtractionResult`]. Two variants exist: the text-layer-only baseline and
//! an OCR-capable one that also reads image-only PDFs and image uploads.

use guardian_core::{
    detect_in, DocumentFormat, ExtractError, ExtractionResult, TextExtractor, UploadedDocument,
    Verdict,
};
use guardian_docx::DocxExtractor;
use guardian_ocr::{
    EngineSlot, ImageExtractor, OcrEngine, OcrPdfExtractor, PageRenderer, PdfiumRenderer,
    TesseractEngine,
};
use guardian_pdf::PdfExtractor;
use guardian_render::{PdfiumConfig, RenderOptions};
use guardian_text::TxtExtractor;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::report::ScanReport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtractorMode {
    #[default]
    TextLayerOnly,
    OcrCapable,
}

pub struct Scanner {
    mode: ExtractorMode,
    pdf: Box<dyn TextExtractor>,
    docx: DocxExtractor,
    txt: TxtExtractor,
    png: Option<ImageExtractor>,
    jpeg: Option<ImageExtractor>,
}

impl Scanner {
    pub fn text_layer_only() -> Self {
        Self {
            mode: ExtractorMode::TextLayerOnly,
            pdf: Box::new(PdfExtractor::new()),
            docx: DocxExtractor::new(),
            txt: TxtExtractor::new(),
            png: None,
            jpeg: None,
        }
    }

    pub fn ocr_capable(engine: EngineSlot, renderer: Box<dyn PageRenderer>) -> Self {
        Self {
            mode: ExtractorMode::OcrCapable,
            png: Some(ImageExtractor::new(DocumentFormat::Png, engine.clone())),
            jpeg: Some(ImageExtractor::new(DocumentFormat::Jpeg, engine.clone())),
            pdf: Box::new(OcrPdfExtractor::new(engine, renderer)),
            docx: DocxExtractor::new(),
            txt: TxtExtractor::new(),
        }
    }

    /// Builds the variant selected by `config.extractor`.
    ///
    /// A missing tesseract does not fail construction; OCR-dependent uploads
    /// then report `OcrUnavailable`.
    pub fn from_config(config: &AppConfig) -> Self {
        match config.extractor {
            ExtractorMode::TextLayerOnly => Self::text_layer_only(),
            ExtractorMode::OcrCapable => {
                let engine: EngineSlot = match TesseractEngine::new(config.tesseract.clone()) {
                    Ok(engine) => Ok(Arc::new(engine) as Arc<dyn OcrEngine>),
                    Err(e) => {
                        log::warn!("[Scanner] OCR engine unavailable: {}", e);
                        Err(e.to_string())
                    }
                };
                let renderer = PdfiumRenderer {
                    library: PdfiumConfig {
                        library_path: config.pdfium_library_path.as_ref().map(PathBuf::from),
                    },
                    options: RenderOptions {
                        dpi: config.ocr_dpi,
                    },
                };
                Self::ocr_capable(engine, Box::new(renderer))
            }
        }
    }

    pub fn mode(&self) -> ExtractorMode {
        self.mode
    }

    fn extractor_for(&self, format: DocumentFormat) -> Option<&dyn TextExtractor> {
        match format {
            DocumentFormat::Pdf => Some(self.pdf.as_ref()),
            DocumentFormat::Docx => Some(&self.docx),
            DocumentFormat::Txt => Some(&self.txt),
            DocumentFormat::Png => self.png.as_ref().map(|e| e as &dyn TextExtractor),
            DocumentFormat::Jpeg => self.jpeg.as_ref().map(|e| e as &dyn TextExtractor),
        }
    }

    /// Total over every filename and byte sequence.
    pub fn extract_text(&self, document: &UploadedDocument) -> ExtractionResult {
        let extractor = document
            .format()
            .and_then(|format| self.extractor_for(format));

        match extractor {
            Some(extractor) => extractor.extract(&document.bytes, document.password()),
            None => {
                let err = ExtractError::UnsupportedFormat(document.extension());
                log::warn!("[Scanner] {}: {}", document.filename, err);
                ExtractionResult::failed(&err)
            }
        }
    }

    /// Extraction followed by detection.
    pub fn scan(&self, document: &UploadedDocument) -> ScanReport {
        log::info!(
            "[Scanner] scanning {} ({} bytes, {:?})",
            document.filename,
            document.bytes.len(),
            self.mode
        );
        let extraction = self.extract_text(document);
        let findings = detect_in(&extraction);
        let verdict = Verdict::from_findings(&findings);
        log::info!("[Scanner] {} verdict: {:?}", document.filename, verdict);

        ScanReport {
            filename: document.filename.clone(),
            extraction,
            findings,
            verdict,
        }
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::text_layer_only()
    }
}

/// Baseline extraction: text layer only, no OCR.
pub fn extract_text(document: &UploadedDocument) -> ExtractionResult {
    Scanner::text_layer_only().extract_text(document)
}
