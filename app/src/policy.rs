//! Privacy-policy summarizer
//!
//! Keyword matching over the lower-cased policy text; no language model.

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const STRIPPED_TAGS: [&str; 5] = ["script", "style", "nav", "footer", "header"];

pub const DEFAULT_SUMMARY: &str = "This policy describes how the service handles user data.";
pub const NO_RISKS: &str = "No obvious risks found.";

/// A keyword group and the phrase it contributes when any keyword appears.
struct KeywordRule {
    keywords: &'static [&'static str],
    phrase: &'static str,
}

const fn rule(keywords: &'static [&'static str], phrase: &'static str) -> KeywordRule {
    KeywordRule { keywords, phrase }
}

const SUMMARY_RULES: [KeywordRule; 6] = [
    rule(&["collect", "gather", "obtain"], "collects personal data"),
    rule(&["email", "name", "contact"], "includes contact details"),
    rule(&["location", "gps"], "uses or tracks location"),
    rule(&["cookie", "tracking", "analytics"], "uses cookies or tracking tools"),
    rule(
        &["advertis", "marketing", "third-party"],
        "shares data with third parties or advertisers",
    ),
    rule(&["store", "retain", "save"], "stores user data for some time"),
];

const RISK_RULES: [KeywordRule; 4] = [
    rule(&["location", "gps"], "Shares or collects location data."),
    rule(
        &["advertis", "marketing", "third-party"],
        "Shares data with advertisers or third parties.",
    ),
    rule(&["cookie", "tracking"], "Uses cookies or tracking technologies."),
    rule(&["retain", "store"], "Stores your data for retention."),
];

/// Phrases of the rules that match `text`, in rule order.
fn matching_phrases(rules: &[KeywordRule], text: &str) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    rules
        .iter()
        .filter(|r| r.keywords.iter().any(|k| lower.contains(k)))
        .map(|r| r.phrase)
        .collect()
}

#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Error fetching URL: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Error fetching URL: HTTP {0}")]
    Status(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyInput {
    Text(String),
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyAnalysis {
    pub summary: String,
    pub risks: Vec<String>,
}

pub fn summarize(text: &str) -> String {
    let parts = matching_phrases(&SUMMARY_RULES, text);
    if parts.is_empty() {
        return DEFAULT_SUMMARY.to_string();
    }
    sentence_case(&format!("This policy {}.", parts.join(", ")))
}

pub fn extract_risks(text: &str) -> Vec<String> {
    let risks = matching_phrases(&RISK_RULES, text);
    if risks.is_empty() {
        return vec![NO_RISKS.to_string()];
    }
    risks.into_iter().map(String::from).collect()
}

/// First character upper-cased, the rest lower-cased.
fn sentence_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}

pub fn fetch_policy_text(client: &reqwest::blocking::Client, url: &str) -> Result<String, PolicyError> {
    log::info!("[Policy] fetching {}", url);
    let response = client.get(url).timeout(FETCH_TIMEOUT).send()?;
    if !response.status().is_success() {
        return Err(PolicyError::Status(response.status().as_u16()));
    }
    let body = response.text()?;
    Ok(visible_text(&body))
}

/// Whitespace-joined text of the page, without scripts, styles and page chrome.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts = Vec::new();
    collect_text(document.root_element(), &mut parts);
    parts.join(" ")
}

fn collect_text(element: ElementRef<'_>, parts: &mut Vec<String>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let text = text.trim();
            if !text.is_empty() {
                parts.push(text.to_string());
            }
        } else if let Some(child) = ElementRef::wrap(child) {
            if !STRIPPED_TAGS.contains(&child.value().name()) {
                collect_text(child, parts);
            }
        }
    }
}

pub fn analyze_policy(
    client: &reqwest::blocking::Client,
    input: &PolicyInput,
) -> Result<PolicyAnalysis, PolicyError> {
    let text = match input {
        PolicyInput::Text(text) => text.clone(),
        PolicyInput::Url(url) => fetch_policy_text(client, url)?,
    };
    Ok(analyze_text(&text))
}

pub fn analyze_text(text: &str) -> PolicyAnalysis {
    PolicyAnalysis {
        summary: summarize(text),
        risks: extract_risks(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_in_rule_order() {
        let text = "We store your Email and use cookies. We COLLECT data.";
        assert_eq!(
            summarize(text),
            "This policy collects personal data, includes contact details, \
             uses cookies or tracking tools, stores user data for some time."
        );
    }

    #[test]
    fn test_summary_default() {
        assert_eq!(summarize("Terms apply."), DEFAULT_SUMMARY);
        assert_eq!(summarize(""), DEFAULT_SUMMARY);
    }

    #[test]
    fn test_summary_third_party() {
        assert_eq!(
            summarize("Shared with third-party partners"),
            "This policy shares data with third parties or advertisers."
        );
    }

    #[test]
    fn test_risks() {
        assert_eq!(
            extract_risks("GPS tracking for Advertising; we retain logs"),
            vec![
                "Shares or collects location data.",
                "Shares data with advertisers or third parties.",
                "Uses cookies or tracking technologies.",
                "Stores your data for retention.",
            ]
        );
    }

    #[test]
    fn test_analytics_is_summary_only() {
        // "analytics" counts towards the summary but is not a listed risk.
        let analysis = analyze_text("We use analytics.");
        assert_eq!(analysis.summary, "This policy uses cookies or tracking tools.");
        assert_eq!(analysis.risks, vec![NO_RISKS]);
    }

    #[test]
    fn test_visible_text_strips_chrome() {
        let html = r#"<html><head><title>Privacy</title><style>p{color:red}</style></head>
            <body><header>Menu</header><nav>Home</nav>
            <p>We collect   your <b>location</b>.</p><script>track()</script>
            <footer>(c) 2025</footer></body></html>"#;
        assert_eq!(visible_text(html), "Privacy We collect   your location .");
    }

    #[test]
    fn test_analyze_plain_text_needs_no_network() {
        let client = reqwest::blocking::Client::new();
        let analysis = analyze_policy(&client, &PolicyInput::Text("we save cookies".into())).unwrap();
        assert_eq!(
            analysis.summary,
            "This policy uses cookies or tracking tools, stores user data for some time."
        );
    }
}
