//! PDF decryption
//!
//! Loads the document, unlocks it when it carries an `Encrypt` dictionary and
//! writes it back out, so callers always get a plain, normalised copy.

use crate::security::decrypt_document;
use guardian_core::ExtractError;
use lopdf::Document;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecryptError {
    #[error("PDF is password protected. Provide password to read it.")]
    PasswordRequired,
    #[error("Unable to read PDF: {0}")]
    UnreadablePdf(String),
}

impl From<DecryptError> for ExtractError {
    fn from(err: DecryptError) -> Self {
        match err {
            DecryptError::PasswordRequired => ExtractError::PasswordRequired,
            DecryptError::UnreadablePdf(reason) => ExtractError::UnreadablePdf(reason),
        }
    }
}

/// Returns decrypted (or merely re-serialised) PDF bytes.
///
/// An empty password counts as no password. The input is never modified.
pub fn decrypt_pdf(bytes: &[u8], password: Option<&str>) -> Result<Vec<u8>, DecryptError> {
    let doc = Document::load_mem(bytes).map_err(|e| DecryptError::UnreadablePdf(e.to_string()))?;
    let mut doc = unlock_document(doc, password)?;

    let mut out = Vec::with_capacity(bytes.len());
    doc.save_to(&mut out)
        .map_err(|e| DecryptError::UnreadablePdf(e.to_string()))?;
    Ok(out)
}

/// Decrypts a loaded document in place when needed.
pub fn unlock_document(mut doc: Document, password: Option<&str>) -> Result<Document, DecryptError> {
    if !is_encrypted(&doc) {
        return Ok(doc);
    }

    let password = password
        .filter(|p| !p.is_empty())
        .ok_or(DecryptError::PasswordRequired)?;

    log::info!("[Decrypt] encrypted PDF, trying supplied password");
    decrypt_document(&mut doc, password).map_err(|e| {
        log::warn!("[Decrypt] cannot unlock PDF: {}", e);
        DecryptError::UnreadablePdf(e.to_string())
    })?;
    log::info!("[Decrypt] PDF decrypted");
    Ok(doc)
}

pub fn is_encrypted(doc: &Document) -> bool {
    doc.trailer.has(b"Encrypt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{encrypted_marker_document, encrypted_pdf, text_pdf, PdfCipher};

    #[test]
    fn test_plain_pdf_passes_through() {
        let bytes = text_pdf(&["Hello World"]);
        let out = decrypt_pdf(&bytes, None).expect("decrypt");
        assert!(out.starts_with(b"%PDF"));
        let doc = Document::load_mem(&out).expect("reload");
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_plain_pdf_ignores_password() {
        let bytes = text_pdf(&["Hello World"]);
        assert!(decrypt_pdf(&bytes, Some("unused")).is_ok());
    }

    #[test]
    fn test_encrypted_without_password() {
        let doc = encrypted_marker_document();
        assert!(is_encrypted(&doc));
        assert_eq!(
            unlock_document(doc, None).err(),
            Some(DecryptError::PasswordRequired)
        );
    }

    #[test]
    fn test_encrypted_with_empty_password_is_still_missing() {
        let doc = encrypted_marker_document();
        assert_eq!(
            unlock_document(doc, Some("")).err(),
            Some(DecryptError::PasswordRequired)
        );
    }

    #[test]
    fn test_broken_encryption_dictionary_is_unreadable() {
        let doc = encrypted_marker_document();
        match unlock_document(doc, Some("guess")) {
            Err(DecryptError::UnreadablePdf(reason)) => assert!(!reason.is_empty()),
            other => panic!("expected UnreadablePdf, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_aes_pdf_round_trips_to_plain_bytes() {
        let bytes = encrypted_pdf(&["Card 4111 1111 1111 1111"], PdfCipher::Aes128, "user-password", "owner");
        assert_eq!(
            decrypt_pdf(&bytes, None).unwrap_err(),
            DecryptError::PasswordRequired
        );

        let out = decrypt_pdf(&bytes, Some("user-password")).expect("decrypt");
        let doc = Document::load_mem(&out).expect("reload");
        assert!(!is_encrypted(&doc));
        let text = doc.extract_text(&[1]).expect("text");
        assert!(text.contains("4111 1111 1111 1111"));
    }

    #[test]
    fn test_wrong_password_is_unreadable() {
        let bytes = encrypted_pdf(&["secret"], PdfCipher::Rc4, "right", "owner");
        match decrypt_pdf(&bytes, Some("wrong")) {
            Err(DecryptError::UnreadablePdf(reason)) => assert!(reason.contains("incorrect")),
            other => panic!("expected UnreadablePdf, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_garbage_is_unreadable() {
        let err = decrypt_pdf(b"definitely not a pdf", None).unwrap_err();
        assert!(matches!(err, DecryptError::UnreadablePdf(_)));
        let converted: ExtractError = err.into();
        assert_eq!(converted.kind(), guardian_core::FailureKind::UnreadablePdf);
    }
}
