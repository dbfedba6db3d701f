//! Downscale geometry
//!
//! One uniform factor `min(1, max_edge / long_edge)` is applied to both sides,
//! so the aspect ratio survives and images are never enlarged.

use image::imageops::FilterType;

use veil_core::ResizeFilter;

/// Uniform scale for an image of `w`×`h` under a long-edge limit.
pub fn scale_factor(w: u32, h: u32, max_edge: u32) -> f64 {
    let long_edge = w.max(h);
    if long_edge == 0 || max_edge == 0 {
        return 1.0;
    }
    (max_edge as f64 / long_edge as f64).min(1.0)
}

/// Rounded target dimensions, never below 1 px.
pub fn target_dimensions(w: u32, h: u32, max_edge: u32) -> (u32, u32) {
    let scale = scale_factor(w, h, max_edge);
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    (scaled(w), scaled(h))
}

pub fn filter_type(filter: ResizeFilter) -> FilterType {
    match filter {
        ResizeFilter::Nearest => FilterType::Nearest,
        ResizeFilter::Triangle => FilterType::Triangle,
        ResizeFilter::Lanczos3 => FilterType::Lanczos3,
    }
}
