//! Extraction failure taxonomy.
//!
//! Every failure an extractor can hit is one of these variants. None of them
//! crosses the extractor boundary as an `Err`: `TextExtractor::extract` turns
//! them into an [`ExtractionResult`](crate::ExtractionResult) whose text is the
//! variant's diagnostic message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

pub const PASSWORD_REQUIRED_MESSAGE: &str =
    "PDF is password protected. Provide password to read it.";
pub const IMAGE_ONLY_MESSAGE: &str =
    "Scanned or image-based documents are not supported for text extraction.";
pub const UNSUPPORTED_MESSAGE: &str = "Unsupported file type";
pub const EMPTY_MESSAGE: &str = "Empty file: no readable text found.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("PDF is password protected. Provide password to read it.")]
    PasswordRequired,

    /// Corrupt structure or wrong password.
    #[error("Unable to read PDF (unreadable or corrupt): {0}")]
    UnreadablePdf(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Empty file: no readable text found.")]
    EmptyOrUnreadableContent,

    /// No text layer; the pages only carry images.
    #[error("Scanned or image-based documents are not supported for text extraction.")]
    ImageOnly,

    #[error("Error reading {format} (malformed content): {reason}")]
    DecodeError { format: &'static str, reason: String },

    #[error("OCR is not available: {0}")]
    OcrUnavailable(String),
}

impl ExtractError {
    pub fn decode(format: &'static str, reason: impl std::fmt::Display) -> Self {
        ExtractError::DecodeError {
            format,
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ExtractError::PasswordRequired => FailureKind::PasswordRequired,
            ExtractError::UnreadablePdf(_) => FailureKind::UnreadablePdf,
            ExtractError::UnsupportedFormat(_) => FailureKind::UnsupportedFormat,
            ExtractError::EmptyOrUnreadableContent => FailureKind::EmptyOrUnreadableContent,
            ExtractError::ImageOnly => FailureKind::ImageOnly,
            ExtractError::DecodeError { .. } => FailureKind::DecodeError,
            ExtractError::OcrUnavailable(_) => FailureKind::OcrUnavailable,
        }
    }

    /// Text shown in place of document content.
    pub fn diagnostic(&self) -> String {
        match self {
            ExtractError::UnsupportedFormat(_) => UNSUPPORTED_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// Fieldless mirror of [`ExtractError`], carried by results and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    PasswordRequired,
    UnreadablePdf,
    UnsupportedFormat,
    EmptyOrUnreadableContent,
    ImageOnly,
    DecodeError,
    OcrUnavailable,
}

/// Returns true when `text` is one of the diagnostic messages above rather
/// than document content.
pub fn is_diagnostic_text(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }
    [
        PASSWORD_REQUIRED_MESSAGE,
        IMAGE_ONLY_MESSAGE,
        UNSUPPORTED_MESSAGE,
        EMPTY_MESSAGE,
    ]
    .iter()
    .any(|m| lower == m.to_lowercase())
        || lower.starts_with("unable to read pdf (unreadable or corrupt):")
        || lower.starts_with("unsupported file type:")
        || lower.starts_with("ocr is not available:")
        || (lower.starts_with("error reading ") && lower.contains("(malformed content):"))
}
