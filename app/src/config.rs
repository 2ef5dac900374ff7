use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use guardian_ocr::TesseractConfig;

use crate::dispatch::ExtractorMode;

pub const DEFAULT_OCR_DPI: u32 = 200;
pub const DEFAULT_BREACH_DATASET: &str = "data/mock_breaches.json";
pub const DEFAULT_PWNED_PASSWORDS_URL: &str = "https://api.pwnedpasswords.com/range/";

pub const ENV_OCR_DPI: &str = "GUARDIAN_OCR_DPI";
pub const ENV_TESSERACT: &str = "GUARDIAN_TESSERACT";
pub const ENV_PDFIUM_PATH: &str = "GUARDIAN_PDFIUM_PATH";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Which extractor variant handles uploads
    pub extractor: ExtractorMode,
    pub tesseract: TesseractConfig,
    /// Directory holding the pdfium shared library
    pub pdfium_library_path: Option<String>,
    /// Render resolution for OCR
    pub ocr_dpi: u32,
    /// Flat `{ "email": ["site", ...] }` JSON map
    pub breach_dataset: PathBuf,
    /// Range endpoint; the 5-char hash prefix is appended
    pub pwned_passwords_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            extractor: ExtractorMode::default(),
            tesseract: TesseractConfig::default(),
            pdfium_library_path: None,
            ocr_dpi: DEFAULT_OCR_DPI,
            breach_dataset: PathBuf::from(DEFAULT_BREACH_DATASET),
            pwned_passwords_url: DEFAULT_PWNED_PASSWORDS_URL.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config dir unavailable")]
    NoConfigDir,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

pub fn default_config_path() -> ConfigResult<PathBuf> {
    let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join("privacy-guardian").join("config.json"))
}

/// Reads the file at `path`; a missing file gives the defaults.
///
/// A relative `breachDataset` that exists next to the config file is
/// anchored there.
pub fn load_config_from(path: &Path) -> ConfigResult<AppConfig> {
    if !path.exists() {
        log::debug!("[Config] {} not found, using defaults", path.display());
        return Ok(AppConfig::default());
    }
    let raw = fs::read_to_string(path)?;
    let mut config: AppConfig = serde_json::from_str(&raw)?;
    if let Some(dir) = path.parent() {
        if config.breach_dataset.is_relative() {
            let anchored = dir.join(&config.breach_dataset);
            if anchored.exists() {
                config.breach_dataset = anchored;
            }
        }
    }
    Ok(config)
}

/// Directories a relative data path is looked up in: the working directory,
/// the executable's directory, then the application crate itself.
pub fn data_search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }
    dirs.push(PathBuf::from(env!("CARGO_MANIFEST_DIR")));
    dirs
}

/// First existing `dir/path` in `search_dirs`; absolute or unfound paths are
/// returned unchanged.
pub fn resolve_data_path(path: &Path, search_dirs: &[PathBuf]) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    search_dirs
        .iter()
        .map(|dir| dir.join(path))
        .find(|candidate| candidate.exists())
        .unwrap_or_else(|| {
            log::debug!("[Config] {} not found in any data dir", path.display());
            path.to_path_buf()
        })
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> ConfigResult<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let raw = serde_json::to_string_pretty(config)?;
    fs::write(path, raw)?;
    Ok(())
}

/// Loads from `explicit` or the default location, then applies environment
/// overrides.
pub fn load_config(explicit: Option<&Path>) -> ConfigResult<AppConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };
    let mut config = load_config_from(&path)?;
    config.apply_overrides(|name| std::env::var(name).ok())?;
    Ok(config)
}

impl AppConfig {
    /// The breach dataset, located independently of the working directory.
    pub fn breach_dataset_path(&self) -> PathBuf {
        resolve_data_path(&self.breach_dataset, &data_search_dirs())
    }

    /// Applies `GUARDIAN_*` overrides, looking each name up with `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_OCR_DPI) {
            self.ocr_dpi = value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|dpi| *dpi > 0)
                .ok_or(ConfigError::InvalidEnv {
                    name: ENV_OCR_DPI,
                    value,
                })?;
        }
        if let Some(value) = lookup(ENV_TESSERACT).filter(|v| !v.is_empty()) {
            self.tesseract.binary_path = Some(value);
        }
        if let Some(value) = lookup(ENV_PDFIUM_PATH).filter(|v| !v.is_empty()) {
            self.pdfium_library_path = Some(value);
        }
        Ok(())
    }
}
