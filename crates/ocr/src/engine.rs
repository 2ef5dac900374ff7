//! OCR engine abstraction

use crate::error::OcrError;
use image::DynamicImage;

/// A text recogniser for a single preprocessed page image.
pub trait OcrEngine: Send + Sync {
    /// Raw recognised text, before cleanup.
    fn recognize_image(&self, img: &DynamicImage) -> Result<String, OcrError>;

    /// Engine name, version and parameters, as a JSON string for logs.
    fn audit_info(&self) -> String;
}
