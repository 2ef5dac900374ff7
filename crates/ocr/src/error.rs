//! OCR error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("tesseract binary not found: {0}")]
    BinaryNotFound(String),

    #[error("image processing failed: {0}")]
    ImageProcess(String),

    #[error("recognition failed: {0}")]
    Recognition(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
