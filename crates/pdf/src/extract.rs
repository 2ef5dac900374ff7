//! Text-layer PDF extraction.

use crate::decrypt::{decrypt_pdf, unlock_document};
use guardian_core::{DocumentFormat, ExtractError, ExtractResult, TextExtractor};
use lopdf::content::Content;
use lopdf::{Document, ObjectId};

/// What a page's content stream draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Shows text with `Tj`, `TJ`, `'` or `"`
    Text,
    /// Only image XObjects, typical for scans
    ImageBased,
    /// Glyphs converted to outlines: many path operators, no text
    PathDrawn,
    Empty,
}

impl PageKind {
    /// Pages whose content can only be read by rendering them.
    pub fn needs_ocr(self) -> bool {
        matches!(self, PageKind::ImageBased | PageKind::PathDrawn)
    }
}

#[derive(Debug, Clone)]
pub struct PageText {
    /// 1-based
    pub number: u32,
    pub kind: PageKind,
    pub text: String,
    /// Why the text layer of this page could not be decoded.
    pub error: Option<String>,
}

/// Per-page text of a decrypted document.
#[derive(Debug, Clone, Default)]
pub struct PdfTextLayer {
    pub pages: Vec<PageText>,
}

impl PdfTextLayer {
    /// Page texts joined by newlines, trimmed.
    pub fn joined(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    pub fn image_page_count(&self) -> usize {
        self.pages.iter().filter(|p| p.kind.needs_ocr()).count()
    }

    /// First page that has a text layer we failed to decode, with the reason.
    pub fn undecodable_page(&self) -> Option<(u32, String)> {
        self.pages.iter().find_map(|page| {
            if let Some(error) = &page.error {
                return Some((page.number, error.clone()));
            }
            (page.kind == PageKind::Text && page.text.trim().is_empty())
                .then(|| (page.number, "text could not be decoded with the page fonts".to_string()))
        })
    }
}

/// PDF handler that only reads the embedded text layer.
///
/// A document without one is reported as image-based; nothing is OCR'd here.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn extract_raw(&self, bytes: &[u8], password: Option<&str>) -> ExtractResult<String> {
        let layer = extract_text_layer(bytes, password)?;
        require_text(&layer)
    }
}

/// Decrypts, re-serialises and reads every page's text.
pub fn extract_text_layer(bytes: &[u8], password: Option<&str>) -> ExtractResult<PdfTextLayer> {
    let decrypted = decrypt_pdf(bytes, password)?;
    let doc = Document::load_mem(&decrypted).map_err(|e| ExtractError::UnreadablePdf(e.to_string()))?;
    Ok(read_pages(&doc))
}

/// Same as [`extract_text_layer`] for an already loaded document.
pub fn extract_document_text(doc: Document, password: Option<&str>) -> ExtractResult<PdfTextLayer> {
    let doc = unlock_document(doc, password)?;
    Ok(read_pages(&doc))
}

/// Joined text when there is any.
///
/// An empty layer is a `DecodeError` if some page shows text we could not
/// decode, and `ImageOnly` when the pages are scans or blank.
pub fn require_text(layer: &PdfTextLayer) -> ExtractResult<String> {
    let text = layer.joined();
    if text.is_empty() {
        if let Some((number, reason)) = layer.undecodable_page() {
            log::warn!("[Extract] page {} has an undecodable text layer: {}", number, reason);
            return Err(ExtractError::decode("PDF", format!("page {}: {}", number, reason)));
        }
        log::info!(
            "[Extract] no text layer in {} page(s), {} image-based",
            layer.pages.len(),
            layer.image_page_count()
        );
        return Err(ExtractError::ImageOnly);
    }
    Ok(text)
}

fn read_pages(doc: &Document) -> PdfTextLayer {
    let pages = doc
        .get_pages()
        .into_iter()
        .map(|(number, page_id)| {
            let (text, error) = match doc.extract_text(&[number]) {
                Ok(text) => (text, None),
                Err(e) => {
                    log::warn!("[Extract] page {} text unreadable: {}", number, e);
                    (String::new(), Some(e.to_string()))
                }
            };
            PageText {
                number,
                kind: page_kind(doc, page_id),
                text,
                error,
            }
        })
        .collect();
    PdfTextLayer { pages }
}

fn page_kind(doc: &Document, page_id: ObjectId) -> PageKind {
    match doc.get_page_content(page_id) {
        Ok(data) => detect_page_kind(&data),
        Err(_) => PageKind::Empty,
    }
}

/// Classifies a content stream by the operators it uses.
pub fn detect_page_kind(content_data: &[u8]) -> PageKind {
    let content = match Content::decode(content_data) {
        Ok(c) => c,
        Err(_) => return PageKind::Empty,
    };

    let mut text_ops = 0usize;
    let mut path_ops = 0usize;
    let mut has_image_ops = false;

    for op in &content.operations {
        match op.operator.as_str() {
            "Tj" | "TJ" | "'" | "\"" => text_ops += 1,
            "m" | "l" | "c" | "v" | "y" | "h" | "re" => path_ops += 1,
            "Do" => has_image_ops = true,
            _ => {}
        }
    }

    log::debug!(
        "[ContentType] text_ops={}, path_ops={}, image_ops={}",
        text_ops,
        path_ops,
        has_image_ops
    );

    if text_ops > 0 {
        PageKind::Text
    } else if has_image_ops {
        PageKind::ImageBased
    } else if path_ops > 500 {
        PageKind::PathDrawn
    } else {
        PageKind::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        encrypted_marker_document, encrypted_pdf, image_only_pdf, stream_as_font_pdf, text_pdf,
        undecodable_font_pdf, PdfCipher,
    };
    use guardian_core::FailureKind;

    #[test]
    fn test_text_pdf_pages_joined() {
        let bytes = text_pdf(&["First page a@b.com", "Second page 9876543210"]);
        let layer = extract_text_layer(&bytes, None).expect("extract");
        assert_eq!(layer.pages.len(), 2);
        assert_eq!(layer.pages[0].kind, PageKind::Text);
        let text = layer.joined();
        assert!(text.contains("First page a@b.com"));
        assert!(text.contains("Second page 9876543210"));
        assert!(text.find("First").unwrap() < text.find("Second").unwrap());
    }

    #[test]
    fn test_extractor_returns_content() {
        let result = PdfExtractor::new().extract(&text_pdf(&["Hello World"]), None);
        assert!(!result.is_scanned);
        assert!(result.text.contains("Hello World"));
        assert_eq!(result.text, result.text.trim());
    }

    #[test]
    fn test_image_only_pdf_is_scanned() {
        let bytes = image_only_pdf();
        let layer = extract_text_layer(&bytes, None).expect("extract");
        assert_eq!(layer.image_page_count(), 1);

        let result = PdfExtractor::new().extract(&bytes, None);
        assert!(result.is_scanned);
        assert_eq!(result.failure, Some(FailureKind::ImageOnly));
        assert!(result.text.contains("not supported"));
    }

    #[test]
    fn test_encrypted_document_needs_password() {
        let err = extract_document_text(encrypted_marker_document(), None).unwrap_err();
        assert_eq!(err, ExtractError::PasswordRequired);
        assert!(ExtractError::PasswordRequired
            .diagnostic()
            .contains("password protected"));
    }

    #[test]
    fn test_undecodable_font_is_decode_error() {
        let bytes = undecodable_font_pdf();
        let layer = extract_text_layer(&bytes, None).expect("extract");
        assert_eq!(layer.pages[0].kind, PageKind::Text);
        assert!(layer.pages[0].error.is_some());
        assert!(matches!(
            require_text(&layer),
            Err(ExtractError::DecodeError { .. })
        ));

        let result = PdfExtractor::new().extract(&bytes, None);
        assert!(result.is_scanned);
        assert_eq!(result.failure, Some(FailureKind::DecodeError));
        assert!(result.text.contains("PDF"));
    }

    #[test]
    fn test_text_page_with_unresolved_font_is_decode_error() {
        let result = PdfExtractor::new().extract(&stream_as_font_pdf(), None);
        assert_eq!(result.failure, Some(FailureKind::DecodeError));
        assert_ne!(result.failure, Some(FailureKind::ImageOnly));
    }

    #[test]
    fn test_encrypted_layer_reads_with_password() {
        let bytes = encrypted_pdf(&["Passport K1234567"], PdfCipher::Aes256, "pw", "owner");
        let layer = extract_text_layer(&bytes, Some("pw")).expect("extract");
        assert!(layer.joined().contains("Passport K1234567"));
        assert_eq!(
            extract_text_layer(&bytes, None).unwrap_err(),
            ExtractError::PasswordRequired
        );
    }

    #[test]
    fn test_corrupt_bytes_become_diagnostic() {
        let result = PdfExtractor::new().extract(b"%PDF-1.4 truncated", None);
        assert!(result.is_scanned);
        assert_eq!(result.failure, Some(FailureKind::UnreadablePdf));
    }

    #[test]
    fn test_detect_page_kind() {
        assert_eq!(detect_page_kind(b"BT /F1 12 Tf (hi) Tj ET"), PageKind::Text);
        assert_eq!(detect_page_kind(b"q /Im1 Do Q"), PageKind::ImageBased);
        assert_eq!(detect_page_kind(b"q /Im1 Do Q BT (caption) Tj ET"), PageKind::Text);
        assert_eq!(detect_page_kind(b"0 0 10 10 re f"), PageKind::Empty);
        let outlines = "0 0 m 1 1 l ".repeat(300);
        assert_eq!(detect_page_kind(outlines.as_bytes()), PageKind::PathDrawn);
        assert!(PageKind::PathDrawn.needs_ocr());
        assert!(!PageKind::Text.needs_ocr());
        assert_eq!(detect_page_kind(b""), PageKind::Empty);
    }
}
