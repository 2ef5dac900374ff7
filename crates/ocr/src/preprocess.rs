//! Image preprocessing ahead of recognition
//!
//! The chain is fixed so identical input always produces identical output:
//! grayscale, invert, binarise at 140, then a 3x3 median filter.

use image::{DynamicImage, GrayImage};
use imageproc::filter::median_filter;

pub const BINARY_THRESHOLD: u8 = 140;

pub fn preprocess(img: &DynamicImage) -> GrayImage {
    let mut gray = img.to_luma8();
    image::imageops::invert(&mut gray);
    binarize(&mut gray, BINARY_THRESHOLD);
    // Radius 1 in both directions is a 3x3 window.
    median_filter(&gray, 1, 1)
}

/// Pixels below `threshold` become black, the rest white.
pub fn binarize(gray: &mut GrayImage, threshold: u8) {
    for pixel in gray.pixels_mut() {
        pixel.0[0] = if pixel.0[0] < threshold { 0 } else { 255 };
    }
}
