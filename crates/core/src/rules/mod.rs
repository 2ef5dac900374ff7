//! Personal-information detection
//!
//! Scans extracted text against the fixed pattern categories and turns the
//! hits into an ordered list of findings for display.

use crate::document::ExtractionResult;
use crate::error::is_diagnostic_text;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

mod heuristics;
pub use heuristics::{HeuristicMatch, HeuristicMatcher};

pub const NOTICE_MESSAGE: &str =
    "Scanned or image-based documents are not supported for text extraction.";
pub const STATUS_MESSAGE: &str = "No personal information found in this document.";

/// Number of matches a finding shows in its preview.
pub const PREVIEW_LIMIT: usize = 5;

/// Pattern categories, in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PiiCategory {
    Email,
    PhoneNumber,
    AadhaarNumber,
    AddressHint,
}

impl PiiCategory {
    pub const ALL: [PiiCategory; 4] = [
        PiiCategory::Email,
        PiiCategory::PhoneNumber,
        PiiCategory::AadhaarNumber,
        PiiCategory::AddressHint,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            PiiCategory::Email => "Email",
            PiiCategory::PhoneNumber => "Phone Number",
            PiiCategory::AadhaarNumber => "Aadhaar Number",
            PiiCategory::AddressHint => "Address (hint)",
        }
    }

    pub fn find(&self, text: &str) -> Vec<HeuristicMatch> {
        match self {
            PiiCategory::Email => HeuristicMatcher::match_email(text),
            PiiCategory::PhoneNumber => HeuristicMatcher::match_phone(text),
            PiiCategory::AadhaarNumber => HeuristicMatcher::match_aadhaar(text),
            PiiCategory::AddressHint => HeuristicMatcher::match_address(text),
        }
    }
}

/// Label of one finding: a pattern category or one of the synthetic entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingLabel {
    Email,
    PhoneNumber,
    AadhaarNumber,
    AddressHint,
    /// Input could not be analysed
    Notice,
    /// Nothing was found
    Status,
}

impl FindingLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingLabel::Email => "Email",
            FindingLabel::PhoneNumber => "PhoneNumber",
            FindingLabel::AadhaarNumber => "AadhaarNumber",
            FindingLabel::AddressHint => "AddressHint",
            FindingLabel::Notice => "Notice",
            FindingLabel::Status => "Status",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FindingLabel::Email => PiiCategory::Email.display_name(),
            FindingLabel::PhoneNumber => PiiCategory::PhoneNumber.display_name(),
            FindingLabel::AadhaarNumber => PiiCategory::AadhaarNumber.display_name(),
            FindingLabel::AddressHint => PiiCategory::AddressHint.display_name(),
            FindingLabel::Notice => "Notice",
            FindingLabel::Status => "Status",
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, FindingLabel::Notice | FindingLabel::Status)
    }
}

impl From<PiiCategory> for FindingLabel {
    fn from(category: PiiCategory) -> Self {
        match category {
            PiiCategory::Email => FindingLabel::Email,
            PiiCategory::PhoneNumber => FindingLabel::PhoneNumber,
            PiiCategory::AadhaarNumber => FindingLabel::AadhaarNumber,
            PiiCategory::AddressHint => FindingLabel::AddressHint,
        }
    }
}

impl std::fmt::Display for FindingLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deduplicated matches of one label, in first-occurrence order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfoFinding {
    pub label: FindingLabel,
    pub matches: Vec<String>,
}

impl PersonalInfoFinding {
    fn notice() -> Self {
        Self {
            label: FindingLabel::Notice,
            matches: vec![NOTICE_MESSAGE.to_string()],
        }
    }

    fn status() -> Self {
        Self {
            label: FindingLabel::Status,
            matches: vec![STATUS_MESSAGE.to_string()],
        }
    }

    /// At most [`PREVIEW_LIMIT`] matches.
    pub fn preview(&self) -> &[String] {
        &self.matches[..self.matches.len().min(PREVIEW_LIMIT)]
    }
}

/// Overall classification of a scanned document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Sensitive,
    Clean,
    Unreadable,
}

impl Verdict {
    pub fn from_findings(findings: &[PersonalInfoFinding]) -> Self {
        if findings.iter().any(|f| f.label == FindingLabel::Notice) {
            Verdict::Unreadable
        } else if findings.iter().any(|f| !f.label.is_synthetic()) {
            Verdict::Sensitive
        } else {
            Verdict::Clean
        }
    }
}

/// Scans `text` for personal identifiers.
///
/// Scanned input (by flag, or because the text is a diagnostic message)
/// yields a single `Notice` and no scanning. Otherwise one finding per
/// category with hits, in category order, or a single `Status` when there
/// are none. Pure: the same text always gives the same findings.
pub fn detect(text: &str, is_scanned: bool) -> Vec<PersonalInfoFinding> {
    if is_scanned || text.trim().is_empty() || is_diagnostic_text(text) {
        log::info!("[Detection] input not analysable, returning notice");
        return vec![PersonalInfoFinding::notice()];
    }

    log_text_preview(text);

    let mut findings = Vec::new();
    for category in PiiCategory::ALL {
        let matches = dedup_matches(category.find(text));
        if !matches.is_empty() {
            log::info!(
                "[Detection] {}: {} distinct match(es)",
                category.display_name(),
                matches.len()
            );
            findings.push(PersonalInfoFinding {
                label: category.into(),
                matches,
            });
        }
    }

    if findings.is_empty() {
        findings.push(PersonalInfoFinding::status());
    }
    findings
}

/// [`detect`] over an extraction result.
pub fn detect_in(result: &ExtractionResult) -> Vec<PersonalInfoFinding> {
    detect(&result.text, result.is_scanned)
}

fn dedup_matches(matches: Vec<HeuristicMatch>) -> Vec<String> {
    let mut seen = HashSet::new();
    matches
        .into_iter()
        .map(|m| m.text)
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

fn log_text_preview(text: &str) {
    if should_log_full_text() {
        log::debug!("[Detection] full text: {:?}", text);
    } else {
        let preview: String = text.chars().take(200).collect();
        log::debug!("[Detection] text preview: {:?}", preview);
    }
}

fn should_log_full_text() -> bool {
    match std::env::var("GUARDIAN_LOG_FULL_TEXT") {
        Ok(val) => {
            let val = val.to_ascii_lowercase();
            val == "1" || val == "true" || val == "yes"
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;

    fn pairs(findings: &[PersonalInfoFinding]) -> Vec<(&'static str, Vec<&str>)> {
        findings
            .iter()
            .map(|f| (f.label.as_str(), f.matches.iter().map(String::as_str).collect()))
            .collect()
    }

    #[test]
    fn test_email_and_phone() {
        let findings = detect("Contact me at a@b.com or 9876543210", false);
        assert_eq!(
            pairs(&findings),
            vec![("Email", vec!["a@b.com"]), ("PhoneNumber", vec!["9876543210"])]
        );
        assert_eq!(Verdict::from_findings(&findings), Verdict::Sensitive);
    }

    #[test]
    fn test_aadhaar_number() {
        let findings = detect("1234 5678 9012 is my Aadhaar", false);
        assert!(pairs(&findings).contains(&("AadhaarNumber", vec!["1234 5678 9012"])));
    }

    #[test]
    fn test_clean_text_gets_status() {
        let findings = detect("Hello world", false);
        assert_eq!(
            pairs(&findings),
            vec![("Status", vec!["No personal information found in this document."])]
        );
        assert_eq!(Verdict::from_findings(&findings), Verdict::Clean);
    }

    #[test]
    fn test_scanned_flag_short_circuits() {
        let findings = detect("a@b.com", true);
        assert_eq!(
            pairs(&findings),
            vec![(
                "Notice",
                vec!["Scanned or image-based documents are not supported for text extraction."]
            )]
        );
        assert_eq!(Verdict::from_findings(&findings), Verdict::Unreadable);
    }

    #[test]
    fn test_diagnostic_text_short_circuits_without_flag() {
        let text = ExtractError::UnreadablePdf("trailer not found".to_string()).diagnostic();
        let findings = detect(&text, false);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].label, FindingLabel::Notice);
    }

    #[test]
    fn test_empty_text_routes_to_notice_not_status() {
        let findings = detect("", true);
        assert_eq!(findings[0].label, FindingLabel::Notice);
        let findings = detect("   ", false);
        assert_eq!(findings[0].label, FindingLabel::Notice);
    }

    #[test]
    fn test_duplicates_collapse() {
        let findings = detect("x@y.org, x@y.org and again x@y.org", false);
        assert_eq!(pairs(&findings), vec![("Email", vec!["x@y.org"])]);
    }

    #[test]
    fn test_detect_is_idempotent() {
        let text = "Reach ravi@mail.in, 9123456789, 1111 2222 3333, 12 Gandhi Nagar";
        assert_eq!(detect(text, false), detect(text, false));
    }

    #[test]
    fn test_category_order() {
        let text = "Sector 21\n9988776655\nme@site.io\n4444 5555 6666";
        let labels: Vec<_> = detect(text, false).iter().map(|f| f.label).collect();
        assert_eq!(
            labels,
            vec![
                FindingLabel::Email,
                FindingLabel::PhoneNumber,
                FindingLabel::AadhaarNumber,
                FindingLabel::AddressHint
            ]
        );
    }

    #[test]
    fn test_preview_is_bounded() {
        let text: String = (0..8).map(|i| format!("user{}@host.com ", i)).collect();
        let findings = detect(&text, false);
        assert_eq!(findings[0].matches.len(), 8);
        assert_eq!(findings[0].preview().len(), PREVIEW_LIMIT);
        assert_eq!(findings[0].preview()[0], "user0@host.com");
    }

    #[test]
    fn test_detect_in_uses_flag() {
        let result = ExtractionResult::failed(&ExtractError::ImageOnly);
        assert_eq!(detect_in(&result)[0].label, FindingLabel::Notice);
    }

    #[test]
    fn test_findings_serialize_with_labels() {
        let findings = detect("a@b.com", false);
        let json = serde_json::to_string(&findings).expect("serialize");
        assert_eq!(json, r#"[{"label":"Email","matches":["a@b.com"]}]"#);
    }
}
