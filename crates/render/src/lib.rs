//! PDF page rasterisation for OCR
//!
//! Binds the pdfium shared library at runtime and renders every page of a
//! document to an in-memory image at the requested DPI.

mod library;

pub use library::{bind_pdfium, pdfium_search_paths, PdfiumConfig};

use image::DynamicImage;
use pdfium_render::prelude::*;
use thiserror::Error;

pub const DEFAULT_DPI: u32 = 200;

/// PDF user space is 72 points per inch.
const POINTS_PER_INCH: f32 = 72.0;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("pdfium library is not available: {0}")]
    LibraryUnavailable(String),

    #[error("PDF is password protected")]
    PasswordRequired,

    #[error("Failed to load PDF: {0}")]
    Load(String),

    #[error("Failed to render page {page}: {reason}")]
    Page { page: u16, reason: String },
}

impl RenderError {
    fn from_load(err: PdfiumError) -> Self {
        match err {
            PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
                RenderError::PasswordRequired
            }
            other => RenderError::Load(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub dpi: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { dpi: DEFAULT_DPI }
    }
}

impl RenderOptions {
    /// Pixel size of a page measured in points.
    pub fn target_size(&self, width_pt: f32, height_pt: f32) -> (i32, i32) {
        let scale = self.dpi.max(1) as f32 / POINTS_PER_INCH;
        (
            ((width_pt * scale).round() as i32).max(1),
            ((height_pt * scale).round() as i32).max(1),
        )
    }
}

/// Renders all pages in order.
pub fn render_pdf_pages(
    pdfium: &Pdfium,
    bytes: &[u8],
    password: Option<&str>,
    options: &RenderOptions,
) -> Result<Vec<DynamicImage>, RenderError> {
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(RenderError::from_load)?;

    let pages = document.pages();
    let mut images = Vec::with_capacity(pages.len() as usize);

    for (index, page) in pages.iter().enumerate() {
        let number = index as u16 + 1;
        let (width, height) = options.target_size(page.width().value, page.height().value);
        log::debug!(
            "[Render] page {}: {}x{} px at {} dpi",
            number,
            width,
            height,
            options.dpi
        );

        let config = PdfRenderConfig::new()
            .set_target_width(width)
            .set_target_height(height);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| RenderError::Page {
                page: number,
                reason: e.to_string(),
            })?;
        images.push(bitmap.as_image());
    }

    log::info!("[Render] rendered {} page(s)", images.len());
    Ok(images)
}

/// Binds pdfium and renders in one call.
pub fn render_with_config(
    config: &PdfiumConfig,
    bytes: &[u8],
    password: Option<&str>,
    options: &RenderOptions,
) -> Result<Vec<DynamicImage>, RenderError> {
    let pdfium = bind_pdfium(config)?;
    render_pdf_pages(&pdfium, bytes, password, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dpi() {
        assert_eq!(RenderOptions::default().dpi, 200);
    }

    #[test]
    fn test_target_size_scales_points() {
        let opts = RenderOptions { dpi: 144 };
        assert_eq!(opts.target_size(612.0, 792.0), (1224, 1584));
    }

    #[test]
    fn test_target_size_never_zero() {
        let opts = RenderOptions { dpi: 0 };
        let (w, h) = opts.target_size(0.0, 0.0);
        assert!(w >= 1 && h >= 1);
    }

    #[test]
    fn test_password_error_is_mapped() {
        let err = RenderError::from_load(PdfiumError::PdfiumLibraryInternalError(
            PdfiumInternalError::PasswordError,
        ));
        assert!(matches!(err, RenderError::PasswordRequired));
    }
}
