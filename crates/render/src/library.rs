//! Locating and binding the pdfium shared library.

use crate::RenderError;
use pdfium_render::prelude::*;
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct PdfiumConfig {
    /// Directory containing the platform pdfium library, searched first.
    pub library_path: Option<PathBuf>,
}

/// Directories probed for the pdfium library, in order.
pub fn pdfium_search_paths(config: &PdfiumConfig) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(path) = &config.library_path {
        paths.push(path.clone());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            paths.push(exe_dir.join("libs"));
            paths.push(exe_dir.to_path_buf());

            #[cfg(target_os = "macos")]
            {
                if let Some(contents_dir) = exe_dir.parent() {
                    paths.push(contents_dir.join("Resources").join("libs"));
                }
            }
        }
    }

    paths.push(PathBuf::from("libs"));
    paths.push(PathBuf::from("./"));
    paths
}

/// Tries each search path, then the system library.
pub fn bind_pdfium(config: &PdfiumConfig) -> Result<Pdfium, RenderError> {
    for path in pdfium_search_paths(config) {
        let lib_path = Pdfium::pdfium_platform_library_name_at_path(&path);
        log::debug!("[Render] trying pdfium at {:?}", lib_path);

        if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
            log::info!("[Render] loaded pdfium from {:?}", path);
            return Ok(Pdfium::new(bindings));
        }
    }

    log::debug!("[Render] trying system pdfium");
    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| RenderError::LibraryUnavailable(e.to_string()))
}
