//! Cleanup of raw recognised text.

use once_cell::sync::Lazy;
use regex::Regex;

static STRAY_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s.,%-]").unwrap());
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

/// Drops characters outside word chars, whitespace and `.,%-`, collapses
/// blank lines and repeated spaces, and trims.
pub fn clean_ocr_text(raw: &str) -> String {
    let text = STRAY_CHARS.replace_all(raw, "");
    let text = BLANK_LINES.replace_all(&text, "\n");
    let text = SPACE_RUNS.replace_all(&text, " ");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stray_symbols_removed() {
        assert_eq!(clean_ocr_text("Name: Ravi | 45% done!"), "Name Ravi 45% done");
    }

    #[test]
    fn test_blank_lines_collapse() {
        assert_eq!(clean_ocr_text("line one\n\n  \nline two\n"), "line one\nline two");
    }

    #[test]
    fn test_space_runs_collapse() {
        assert_eq!(clean_ocr_text("  12    Gandhi   Nagar "), "12 Gandhi Nagar");
    }

    #[test]
    fn test_email_at_sign_is_dropped() {
        // `@` is not kept, so OCR text never yields email findings.
        assert_eq!(clean_ocr_text("a.b@mail.com"), "a.bmail.com");
    }

    #[test]
    fn test_noise_only_is_empty() {
        assert_eq!(clean_ocr_text("|| ~~ ^^\n\n"), "");
    }
}
