//! In-memory DOCX fixtures for tests.

use crate::{DOCUMENT_PART, WORDML_NS};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Package whose body is the given raw WordprocessingML.
pub fn docx_with_body(body: &str) -> Vec<u8> {
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
        WORDML_NS, body
    );
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(DOCUMENT_PART, SimpleFileOptions::default())
        .expect("start document part");
    writer.write_all(xml.as_bytes()).expect("write document part");
    writer.finish().expect("finish docx").into_inner()
}

/// One single-run paragraph per entry.
pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    docx_with_body(&body)
}
