//! OCR configuration types

use serde::{Deserialize, Serialize};

pub const DEFAULT_LANG: &str = "eng";
/// Assume a single uniform block of text.
pub const DEFAULT_PSM: u32 = 6;
/// LSTM engine only.
pub const DEFAULT_OEM: u32 = 1;

/// Tesseract settings. Unset fields fall back to the defaults above, and an
/// unset binary path triggers discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TesseractConfig {
    pub binary_path: Option<String>,
    pub tessdata_path: Option<String>,
    pub lang: Option<String>,
    pub psm: Option<u32>,
    pub oem: Option<u32>,
}

impl TesseractConfig {
    pub fn lang_or_default(&self) -> &str {
        self.lang.as_deref().unwrap_or(DEFAULT_LANG)
    }

    pub fn psm_or_default(&self) -> u32 {
        self.psm.unwrap_or(DEFAULT_PSM)
    }

    pub fn oem_or_default(&self) -> u32 {
        self.oem.unwrap_or(DEFAULT_OEM)
    }
}
