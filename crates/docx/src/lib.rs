//! DOCX text extraction
//!
//! Reads `word/document.xml` from the package and returns paragraph text in
//! document order, one paragraph per line. Paragraphs inside tables and text
//! boxes are included.

use guardian_core::{DocumentFormat, ExtractError, ExtractResult, TextExtractor};
use roxmltree::Node;
use std::io::{Cursor, Read};
use zip::ZipArchive;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub const DOCUMENT_PART: &str = "word/document.xml";
pub const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

#[derive(Debug, Clone, Copy, Default)]
pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for DocxExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn extract_raw(&self, bytes: &[u8], _password: Option<&str>) -> ExtractResult<String> {
        let xml = read_document_part(bytes)?;
        let paragraphs = paragraphs(&xml)?;
        log::debug!("[Docx] {} paragraph(s)", paragraphs.len());

        let text = paragraphs.join("\n").trim().to_string();
        if text.is_empty() {
            // Image-only documents have paragraphs but no runs of text.
            return Err(ExtractError::EmptyOrUnreadableContent);
        }
        Ok(text)
    }
}

fn read_document_part(bytes: &[u8]) -> ExtractResult<String> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractError::decode("DOCX", e))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractError::decode("DOCX", format!("{}: {}", DOCUMENT_PART, e)))?;

    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| ExtractError::decode("DOCX", e))?;
    Ok(xml)
}

/// Text of every `w:p` element in document order.
pub fn paragraphs(xml: &str) -> ExtractResult<Vec<String>> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| ExtractError::decode("DOCX", e))?;
    Ok(doc
        .descendants()
        .filter(|n| is_wordml(n, "p"))
        .map(paragraph_text)
        .collect())
}

fn paragraph_text(paragraph: Node) -> String {
    let mut out = String::new();
    for node in paragraph.descendants().filter(|n| n.is_element()) {
        // Nested paragraphs (text boxes) are emitted on their own.
        let owner = node.ancestors().skip(1).find(|a| is_wordml(a, "p"));
        if node != paragraph && owner != Some(paragraph) {
            continue;
        }
        if is_wordml(&node, "t") {
            out.push_str(node.text().unwrap_or(""));
        } else if is_wordml(&node, "tab") {
            out.push('\t');
        } else if is_wordml(&node, "br") || is_wordml(&node, "cr") {
            out.push('\n');
        }
    }
    out
}

fn is_wordml(node: &Node, local: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local
        && node.tag_name().namespace() == Some(WORDML_NS)
}
