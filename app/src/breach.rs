//! Breach checks
//!
//! Email lookup is a flat key lookup in a local JSON dataset. Password checks
//! use the Pwned Passwords range API: only the first five hex characters of
//! the SHA-1 hash leave the machine.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const HASH_PREFIX_LEN: usize = 5;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `{ "email": ["site", ...] }`, keys lower-case.
pub type BreachDataset = HashMap<String, Vec<String>>;

#[derive(Debug, Error)]
pub enum BreachError {
    #[error("breach dataset unreadable: {0}")]
    Dataset(#[from] std::io::Error),
    #[error("breach dataset malformed: {0}")]
    DatasetFormat(#[from] serde_json::Error),
    #[error("Error connecting to API: {0}")]
    Connection(#[from] reqwest::Error),
    #[error("Error connecting to API: HTTP {0}")]
    Status(u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "breaches", rename_all = "camelCase")]
pub enum EmailLookup {
    NotFound,
    /// Known address; an empty list means no recorded breaches.
    Found(Vec<String>),
}

pub fn load_dataset(path: &Path) -> Result<BreachDataset, BreachError> {
    let raw = fs::read_to_string(path)?;
    let dataset: BreachDataset = serde_json::from_str(&raw)?;
    log::debug!("[Breach] {} known address(es) in {}", dataset.len(), path.display());
    Ok(dataset)
}

pub fn lookup_email(dataset: &BreachDataset, email: &str) -> EmailLookup {
    match dataset.get(&email.trim().to_lowercase()) {
        Some(sites) => EmailLookup::Found(sites.clone()),
        None => EmailLookup::NotFound,
    }
}

/// Upper-case SHA-1 hex split into the range prefix and the remaining suffix.
pub fn hash_password(password: &str) -> (String, String) {
    let digest = hex::encode_upper(Sha1::digest(password.as_bytes()));
    let (prefix, suffix) = digest.split_at(HASH_PREFIX_LEN);
    (prefix.to_string(), suffix.to_string())
}

/// Count for `suffix` in a range response of `SUFFIX:COUNT` lines, or 0.
pub fn count_in_range(body: &str, suffix: &str) -> u64 {
    body.lines()
        .filter_map(|line| line.trim().split_once(':'))
        .find(|(hash, _)| hash.eq_ignore_ascii_case(suffix))
        .and_then(|(_, count)| count.trim().parse().ok())
        .unwrap_or(0)
}

pub struct PwnedPasswordsClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl PwnedPasswordsClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BreachError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("privacy-guardian/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Raw range response for a 5-char hash prefix.
    pub fn range(&self, prefix: &str) -> Result<String, BreachError> {
        let url = format!("{}{}", self.base_url, prefix);
        log::info!("[Breach] querying range {}", prefix);

        let response = self.http.get(&url).send()?;
        if !response.status().is_success() {
            return Err(BreachError::Status(response.status().as_u16()));
        }
        Ok(response.text()?)
    }
}

/// Times the password appears in known breaches.
pub fn check_password(client: &PwnedPasswordsClient, password: &str) -> Result<u64, BreachError> {
    let (prefix, suffix) = hash_password(password);
    let body = client.range(&prefix)?;
    Ok(count_in_range(&body, &suffix))
}
