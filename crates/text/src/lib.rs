//! Plain-text extraction
//!
//! Bytes are decoded as UTF-8; invalid sequences are dropped rather than
//! replaced so they never show up in findings.

use guardian_core::{
    DocumentFormat, ExtractError, ExtractResult, ExtractionResult, TextExtractor,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct TxtExtractor;

impl TxtExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for TxtExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Txt
    }

    fn extract_raw(&self, bytes: &[u8], _password: Option<&str>) -> ExtractResult<String> {
        Ok(decode_lossless(bytes).trim().to_string())
    }

    /// An empty text file yields no text at all, not a diagnostic.
    fn failure_result(&self, err: &ExtractError) -> ExtractionResult {
        match err {
            ExtractError::EmptyOrUnreadableContent => ExtractionResult::empty(err.kind()),
            other => ExtractionResult::failed(other),
        }
    }
}

/// Keeps the valid UTF-8 runs of `bytes`, skipping everything else.
pub fn decode_lossless(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut dropped = 0usize;
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
        dropped += chunk.invalid().len();
    }
    if dropped > 0 {
        log::debug!("[Text] dropped {} invalid UTF-8 byte(s)", dropped);
    }
    out
}
