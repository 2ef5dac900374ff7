//! Tesseract OCR engine (CLI wrapper)

use image::{DynamicImage, ImageFormat};
use std::path::Path;
use std::process::Command;
use std::time::Instant;

use crate::engine::OcrEngine;
use crate::error::OcrError;
use crate::types::TesseractConfig;

pub struct TesseractEngine {
    config: TesseractConfig,
    binary: String,
    version: String,
}

impl TesseractEngine {
    /// Resolves the binary and checks it runs.
    pub fn new(config: TesseractConfig) -> Result<Self, OcrError> {
        let (binary, version) = resolve_binary(&config)?;
        log::info!("[Tesseract] using {} (version {})", binary, version);

        Ok(Self {
            config,
            binary,
            version,
        })
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn command(&self, image_path: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(image_path)
            .arg("stdout")
            .args(recognition_args(&self.config));

        if let Some(tessdata_path) = &self.config.tessdata_path {
            cmd.env("TESSDATA_PREFIX", tessdata_path);
        }
        cmd
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize_image(&self, img: &DynamicImage) -> Result<String, OcrError> {
        let start = Instant::now();

        // Removed when dropped.
        let input = tempfile::Builder::new()
            .prefix("guardian-ocr-")
            .suffix(".png")
            .tempfile()?;
        img.save_with_format(input.path(), ImageFormat::Png)
            .map_err(|e| OcrError::ImageProcess(e.to_string()))?;

        let output = self.command(input.path()).output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(stderr.trim().to_string()));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        log::info!(
            "[Tesseract] recognised {} chars in {} ms",
            text.chars().count(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }

    fn audit_info(&self) -> String {
        serde_json::json!({
            "engine": "tesseract",
            "version": self.version,
            "lang": self.config.lang_or_default(),
            "psm": self.config.psm_or_default(),
            "oem": self.config.oem_or_default(),
        })
        .to_string()
    }
}

/// Arguments after `<image> stdout`.
pub fn recognition_args(config: &TesseractConfig) -> Vec<String> {
    vec![
        "-l".to_string(),
        config.lang_or_default().to_string(),
        "--psm".to_string(),
        config.psm_or_default().to_string(),
        "--oem".to_string(),
        config.oem_or_default().to_string(),
    ]
}

/// The configured path when there is one, otherwise `PATH`, then common
/// install locations.
///
/// A configured binary that does not run is an error, never a silent switch
/// to some other tesseract.
fn resolve_binary(config: &TesseractConfig) -> Result<(String, String), OcrError> {
    if let Some(path) = config.binary_path.as_deref().filter(|p| !p.trim().is_empty()) {
        return get_tesseract_version(path)
            .map(|version| (path.to_string(), version))
            .map_err(|e| {
                log::warn!("[Tesseract] configured binary {} is unusable: {}", path, e);
                OcrError::BinaryNotFound(format!("configured tesseract {} is unusable: {}", path, e))
            });
    }

    let mut candidates: Vec<String> = Vec::new();
    if let Some(path) = which_tesseract("tesseract") {
        candidates.push(path);
    }
    candidates.extend(
        common_install_paths()
            .into_iter()
            .filter(|p| Path::new(p).exists()),
    );

    for candidate in &candidates {
        match get_tesseract_version(candidate) {
            Ok(version) => return Ok((candidate.clone(), version)),
            Err(e) => log::debug!("[Tesseract] {} unusable: {}", candidate, e),
        }
    }

    Err(OcrError::BinaryNotFound(if candidates.is_empty() {
        "no tesseract on PATH or in common install locations".to_string()
    } else {
        format!("tried {}", candidates.join(", "))
    }))
}

pub fn get_tesseract_version(binary_path: &str) -> Result<String, OcrError> {
    let output = Command::new(binary_path).arg("--version").output()?;

    if !output.status.success() {
        return Err(OcrError::Recognition(format!(
            "{} --version exited with {}",
            binary_path, output.status
        )));
    }

    let combined = format!(
        "{}{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(parse_version(&combined).unwrap_or_else(|| "unknown".to_string()))
}

/// Version from `tesseract --version` output, e.g. "tesseract v5.3.0".
pub fn parse_version(output: &str) -> Option<String> {
    output
        .lines()
        .filter(|line| line.contains("tesseract"))
        .find_map(|line| line.split_whitespace().nth(1))
        .map(|v| v.trim_start_matches('v').to_string())
}

fn which_tesseract(binary: &str) -> Option<String> {
    #[cfg(target_os = "windows")]
    let lookup = "where";
    #[cfg(not(target_os = "windows"))]
    let lookup = "which";

    Command::new(lookup)
        .arg(binary)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| {
            String::from_utf8_lossy(&o.stdout)
                .lines()
                .next()
                .map(|line| line.trim().to_string())
        })
        .filter(|s| !s.is_empty())
}

fn common_install_paths() -> Vec<String> {
    #[cfg(target_os = "windows")]
    {
        let mut paths = Vec::new();
        if let Ok(program_files) = std::env::var("ProgramFiles") {
            paths.push(format!("{}\\Tesseract-OCR\\tesseract.exe", program_files));
        }
        paths.push("C:\\Program Files\\Tesseract-OCR\\tesseract.exe".to_string());
        paths.push("C:\\Program Files (x86)\\Tesseract-OCR\\tesseract.exe".to_string());
        paths
    }

    #[cfg(not(target_os = "windows"))]
    {
        vec![
            "/usr/bin/tesseract".to_string(),
            "/usr/local/bin/tesseract".to_string(),
            "/opt/homebrew/bin/tesseract".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version_variants() {
        assert_eq!(
            parse_version("tesseract 5.3.0\n leptonica-1.82.0").as_deref(),
            Some("5.3.0")
        );
        assert_eq!(parse_version("tesseract v4.1.1").as_deref(), Some("4.1.1"));
        assert_eq!(parse_version("leptonica only"), None);
    }

    #[test]
    fn test_recognition_args_use_config() {
        let config = TesseractConfig {
            lang: Some("eng+hin".to_string()),
            ..Default::default()
        };
        assert_eq!(
            recognition_args(&config),
            vec!["-l", "eng+hin", "--psm", "6", "--oem", "1"]
        );
    }

    #[test]
    fn test_configured_binary_is_authoritative() {
        let config = TesseractConfig {
            binary_path: Some("/definitely/not/here/tesseract".to_string()),
            ..Default::default()
        };
        match resolve_binary(&config) {
            Err(OcrError::BinaryNotFound(reason)) => {
                assert!(reason.contains("/definitely/not/here/tesseract"), "{}", reason)
            }
            other => panic!("expected BinaryNotFound, got {:?}", other),
        }
        assert!(matches!(
            TesseractEngine::new(config),
            Err(OcrError::BinaryNotFound(_))
        ));
    }
}
