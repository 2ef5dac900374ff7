//! Pattern matchers for personal identifiers.
//!
//! Each category is one case-insensitive regex compiled once. Matchers return
//! every hit with its byte span, in text order; deduplication happens in the
//! caller.

use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// Compiled patterns
// ============================================================================

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}").expect("valid email regex")
});

// Indian mobile numbers: ten digits starting 6-9, optional +91 prefix with an
// optional '-' or whitespace separator.
static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+91[-\s]?|\b)[6-9][0-9]{9}\b").expect("valid phone regex")
});

// Three groups of four digits. No checksum validation, so any 12-digit run
// matches as well.
static AADHAAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[0-9]{4}\s?[0-9]{4}\s?[0-9]{4}\b").expect("valid aadhaar regex")
});

// Keyword followed by the rest of the line.
static ADDRESS_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:street|road|colony|nagar|block|sector)\b.*")
        .expect("valid address regex")
});

// ============================================================================
// Matching
// ============================================================================

/// One pattern hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeuristicMatch {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

pub struct HeuristicMatcher;

impl HeuristicMatcher {
    /// Email addresses
    pub fn match_email(text: &str) -> Vec<HeuristicMatch> {
        match_with_pattern(text, &EMAIL)
    }

    /// Indian mobile numbers
    pub fn match_phone(text: &str) -> Vec<HeuristicMatch> {
        match_with_pattern(text, &PHONE)
    }

    /// 12-digit Aadhaar-shaped numbers
    pub fn match_aadhaar(text: &str) -> Vec<HeuristicMatch> {
        match_with_pattern(text, &AADHAAR)
    }

    /// Street/road/colony/nagar/block/sector hints
    pub fn match_address(text: &str) -> Vec<HeuristicMatch> {
        match_with_pattern(text, &ADDRESS_HINT)
    }
}

fn match_with_pattern(text: &str, pattern: &Regex) -> Vec<HeuristicMatch> {
    pattern
        .find_iter(text)
        .map(|m| HeuristicMatch {
            text: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
        })
        .collect()
}
