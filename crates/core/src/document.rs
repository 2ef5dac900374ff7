//! Unified document interface
//!
//! Every format handler implements [`TextExtractor`] so uploads of any
//! supported type go through one extraction flow and produce one
//! [`ExtractionResult`].

use crate::error::{ExtractError, ExtractResult, FailureKind};
use serde::{Deserialize, Serialize};

/// File formats recognised by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
    /// `.png`, only read by the OCR-capable extractor
    Png,
    /// `.jpg` / `.jpeg`, only read by the OCR-capable extractor
    Jpeg,
}

impl DocumentFormat {
    /// Picks the format from the filename suffix, ignoring case.
    ///
    /// A bare `.pdf` counts as a PDF.
    pub fn from_filename(filename: &str) -> Option<Self> {
        match filename_extension(filename).as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "txt" => Some(DocumentFormat::Txt),
            "png" => Some(DocumentFormat::Png),
            "jpg" | "jpeg" => Some(DocumentFormat::Jpeg),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::Txt => "TXT",
            DocumentFormat::Png => "PNG",
            DocumentFormat::Jpeg => "JPEG",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, DocumentFormat::Png | DocumentFormat::Jpeg)
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-cased text after the last dot of the last path component.
fn filename_extension(filename: &str) -> String {
    let name = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);
    name.rsplit_once('.')
        .map(|(_, extension)| extension.to_lowercase())
        .unwrap_or_default()
}

/// An upload as handed over by the caller.
///
/// The filename only selects the format; the bytes are never written to disk
/// by the text-layer extractors.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub password: Option<String>,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
            password: None,
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn format(&self) -> Option<DocumentFormat> {
        DocumentFormat::from_filename(&self.filename)
    }

    /// Lower-cased extension, empty when the filename has none.
    pub fn extension(&self) -> String {
        filename_extension(&self.filename)
    }

    /// The password, with an empty string treated as "not supplied".
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

/// Uniform output of every extractor.
///
/// `is_scanned == true` means `text` is empty or a diagnostic message, never
/// document content. `failure` names the reason in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub text: String,
    pub is_scanned: bool,
    pub failure: Option<FailureKind>,
}

impl ExtractionResult {
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_scanned: false,
            failure: None,
        }
    }

    /// Diagnostic result carrying the error's message as text.
    pub fn failed(err: &ExtractError) -> Self {
        Self {
            text: err.diagnostic(),
            is_scanned: true,
            failure: Some(err.kind()),
        }
    }

    /// Diagnostic result with no text at all (empty plain-text uploads).
    pub fn empty(kind: FailureKind) -> Self {
        Self {
            text: String::new(),
            is_scanned: true,
            failure: Some(kind),
        }
    }

    pub fn has_content(&self) -> bool {
        !self.is_scanned
    }
}

/// Format handler contract.
///
/// Implementors only write [`extract_raw`](TextExtractor::extract_raw) and use
/// `?` freely; the provided [`extract`](TextExtractor::extract) is the
/// boundary where failures become data.
pub trait TextExtractor: Send + Sync {
    /// Format this handler reads.
    fn format(&self) -> DocumentFormat;

    /// Returns the trimmed document text, or the reason there is none.
    fn extract_raw(&self, bytes: &[u8], password: Option<&str>) -> ExtractResult<String>;

    /// Maps a failure to the result shown to the caller.
    fn failure_result(&self, err: &ExtractError) -> ExtractionResult {
        ExtractionResult::failed(err)
    }

    /// Total over every input: never returns an error.
    fn extract(&self, bytes: &[u8], password: Option<&str>) -> ExtractionResult {
        let outcome = self.extract_raw(bytes, password).and_then(|text| {
            if text.trim().is_empty() {
                Err(ExtractError::EmptyOrUnreadableContent)
            } else {
                Ok(text)
            }
        });

        match outcome {
            Ok(text) => {
                log::info!(
                    "[Extract] {} text extracted, {} chars",
                    self.format(),
                    text.chars().count()
                );
                ExtractionResult::content(text)
            }
            Err(err) => {
                log::warn!("[Extract] {} extraction failed: {}", self.format(), err);
                self.failure_result(&err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedExtractor(ExtractResult<String>);

    impl TextExtractor for FixedExtractor {
        fn format(&self) -> DocumentFormat {
            DocumentFormat::Txt
        }

        fn extract_raw(&self, _bytes: &[u8], _password: Option<&str>) -> ExtractResult<String> {
            self.0.clone()
        }
    }

    #[test]
    fn test_format_from_filename_ignores_case() {
        assert_eq!(DocumentFormat::from_filename("Report.PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_filename("cv.Docx"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_filename("notes.txt"), Some(DocumentFormat::Txt));
        assert_eq!(DocumentFormat::from_filename("scan.JPEG"), Some(DocumentFormat::Jpeg));
        assert_eq!(DocumentFormat::from_filename("sheet.xlsx"), None);
        assert_eq!(DocumentFormat::from_filename("README"), None);
    }

    #[test]
    fn test_bare_extension_names_are_recognised() {
        assert_eq!(DocumentFormat::from_filename(".pdf"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_filename(".DOCX"), Some(DocumentFormat::Docx));
        assert_eq!(DocumentFormat::from_filename("uploads/.txt"), Some(DocumentFormat::Txt));
        assert_eq!(DocumentFormat::from_filename("report.pdf.bak"), None);
        assert_eq!(DocumentFormat::from_filename("v1.2/README"), None);
        assert_eq!(DocumentFormat::from_filename("notes."), None);

        assert_eq!(UploadedDocument::new(".pdf", Vec::new()).extension(), "pdf");
        assert_eq!(UploadedDocument::new("Scan.JPG", Vec::new()).extension(), "jpg");
        assert_eq!(UploadedDocument::new("README", Vec::new()).extension(), "");
    }

    #[test]
    fn test_empty_password_counts_as_missing() {
        let doc = UploadedDocument::new("a.pdf", b"%PDF".to_vec()).with_password("");
        assert_eq!(doc.password(), None);
        let doc = doc.with_password("secret");
        assert_eq!(doc.password(), Some("secret"));
    }

    #[test]
    fn test_extract_converts_errors_to_data() {
        let result = FixedExtractor(Err(ExtractError::PasswordRequired)).extract(b"", None);
        assert!(result.is_scanned);
        assert_eq!(result.failure, Some(FailureKind::PasswordRequired));
        assert!(result.text.contains("password protected"));
    }

    #[test]
    fn test_blank_text_is_never_content() {
        let result = FixedExtractor(Ok("  \n ".to_string())).extract(b"", None);
        assert!(result.is_scanned);
        assert_eq!(result.failure, Some(FailureKind::EmptyOrUnreadableContent));
    }

    #[test]
    fn test_content_result() {
        let result = FixedExtractor(Ok("hello".to_string())).extract(b"", None);
        assert_eq!(result, ExtractionResult::content("hello"));
        assert!(result.has_content());
    }
}
