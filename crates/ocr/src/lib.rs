//! OCR support for image-only documents
//!
//! Page images are preprocessed, recognised by an [`OcrEngine`] (tesseract by
//! default) and cleaned before being handed to PII detection.

mod clean;
mod engine;
mod error;
mod extract;
mod preprocess;
mod tesseract;
mod types;

pub use clean::clean_ocr_text;
pub use engine::OcrEngine;
pub use error::OcrError;
pub use extract::{
    ocr_pages, recognize_page, EngineSlot, ImageExtractor, OcrPdfExtractor, PageRenderer,
    PdfiumRenderer,
};
pub use preprocess::{binarize, preprocess, BINARY_THRESHOLD};
pub use tesseract::{get_tesseract_version, parse_version, recognition_args, TesseractEngine};
pub use types::{TesseractConfig, DEFAULT_LANG, DEFAULT_OEM, DEFAULT_PSM};
