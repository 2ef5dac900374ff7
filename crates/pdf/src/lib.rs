//! PDF decryption and text-layer extraction.

pub mod decrypt;
pub mod extract;
pub mod security;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use decrypt::{decrypt_pdf, is_encrypted, unlock_document, DecryptError};
pub use extract::{
    detect_page_kind, extract_document_text, extract_text_layer, require_text, PageKind,
    PageText, PdfExtractor, PdfTextLayer,
};
pub use security::SecurityError;
