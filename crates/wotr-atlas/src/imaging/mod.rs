//! Grayscale image helpers used by symbol detection.

mod canny;
mod matching;

pub use canny::{canny, CANNY_HIGH, CANNY_LOW};
pub use matching::match_template_max;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage};

/// Luma conversion.
pub fn to_gray(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

/// Bilinear resize.
pub fn resize_linear(image: &GrayImage, width: u32, height: u32) -> GrayImage {
    imageops::resize(image, width, height, FilterType::Triangle)
}

/// True when every pixel is zero, e.g. an edge map with no edges.
pub fn is_blank(image: &GrayImage) -> bool {
    image.as_raw().iter().all(|&p| p == 0)
}
