use guardian_core::{ExtractionResult, PersonalInfoFinding, Verdict};
use serde::{Deserialize, Serialize};

/// Outcome of scanning one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub filename: String,
    pub extraction: ExtractionResult,
    pub findings: Vec<PersonalInfoFinding>,
    pub verdict: Verdict,
}

impl ScanReport {
    pub fn headline(&self) -> &'static str {
        match self.verdict {
            Verdict::Sensitive => "Sensitive information detected",
            Verdict::Clean => "No personal information found in this document.",
            Verdict::Unreadable => "Document could not be analysed",
        }
    }

    /// Human-readable rendering for the terminal.
    pub fn render_text(&self, show_text: bool) -> String {
        let mut out = format!("{}: {}\n", self.filename, self.headline());
        for finding in &self.findings {
            out.push_str(&format!("  {}:\n", finding.label.display_name()));
            for item in finding.preview() {
                out.push_str(&format!("    - {}\n", item));
            }
        }
        if show_text && !self.extraction.is_scanned {
            out.push_str("\n--- Extracted text ---\n");
            out.push_str(&self.extraction.text);
            out.push('\n');
        }
        out
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_core::{detect, FindingLabel};

    fn report(text: &str) -> ScanReport {
        let findings = detect(text, false);
        ScanReport {
            filename: "notes.txt".to_string(),
            extraction: ExtractionResult::content(text),
            verdict: Verdict::from_findings(&findings),
            findings,
        }
    }

    #[test]
    fn test_render_limits_preview() {
        let text = (0..8)
            .map(|i| format!("u{}@mail.com", i))
            .collect::<Vec<_>>()
            .join(" ");
        let rendered = report(&text).render_text(false);
        assert!(rendered.contains("u4@mail.com"));
        assert!(!rendered.contains("u5@mail.com"));
        assert!(rendered.starts_with("notes.txt: Sensitive information detected"));
    }

    #[test]
    fn test_render_optionally_shows_text() {
        let r = report("Hello world");
        assert!(!r.render_text(false).contains("Extracted text"));
        assert!(r.render_text(true).contains("Hello world"));
        assert_eq!(r.findings[0].label, FindingLabel::Status);
    }

    #[test]
    fn test_json_shape() {
        let value: serde_json::Value = serde_json::from_str(&report("a@b.com").to_json().unwrap()).unwrap();
        assert_eq!(value["verdict"], "sensitive");
        assert_eq!(value["extraction"]["isScanned"], false);
        assert_eq!(value["findings"][0]["label"], "Email");
        assert_eq!(value["findings"][0]["matches"][0], "a@b.com");
    }
}
