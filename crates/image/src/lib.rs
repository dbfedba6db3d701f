//! Image hygiene
//!
//! Decodes a raster image, scales it under a long-edge limit and re-encodes it
//! from a fresh pixel buffer. Embedded metadata (EXIF, XMP, ICC profiles) is
//! discarded because only pixels are carried over; no tag editing happens.
//! The EXIF orientation is applied to the pixels before it is lost.
//! PNG input stays PNG, everything else becomes JPEG.

mod error;
mod scale;

pub use error::ImageError;
pub use scale::{scale_factor, target_dimensions};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;

use veil_core::{ImageConfig, ResizeFilter};

pub const MIME_JPEG: &str = "image/jpeg";
pub const MIME_PNG: &str = "image/png";

/// Re-encoded image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanImage {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub original_width: u32,
    pub original_height: u32,
}

/// Metadata stripper
pub struct ImageHygiene {
    max_edge: u32,
    jpeg_quality: u8,
    filter: ResizeFilter,
}

impl ImageHygiene {
    pub fn new(config: &ImageConfig) -> Self {
        Self {
            max_edge: config.max_edge,
            jpeg_quality: config.jpeg_quality.clamp(1, 100),
            filter: config.filter,
        }
    }

    /// Decode, downscale and re-encode.
    ///
    /// # Errors
    /// - [`ImageError::EmptyInput`] for a zero-length payload
    /// - [`ImageError::Decode`] for corrupt or unsupported data
    /// - [`ImageError::Encode`] if the encoder fails
    pub fn strip_metadata(
        &self,
        bytes: &[u8],
        mime_type: &str,
        file_name: &str,
    ) -> Result<CleanImage, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::EmptyInput);
        }

        let img = decode_upright(bytes)?;
        let (original_width, original_height) = (img.width(), img.height());

        let (width, height) = target_dimensions(original_width, original_height, self.max_edge);
        let img = if (width, height) == (original_width, original_height) {
            img
        } else {
            img.resize_exact(width, height, scale::filter_type(self.filter))
        };

        let png = is_png(mime_type);
        let (encoded, mime) = if png {
            (encode_png(&img)?, MIME_PNG)
        } else {
            (encode_jpeg(&img, self.jpeg_quality)?, MIME_JPEG)
        };

        log::info!(
            "[Hygiene] {}: {}x{} -> {}x{}, {} -> {} bytes as {}",
            file_name,
            original_width,
            original_height,
            width,
            height,
            bytes.len(),
            encoded.len(),
            mime
        );

        Ok(CleanImage {
            bytes: encoded,
            mime_type: mime.to_string(),
            file_name: output_file_name(file_name, png),
            width,
            height,
            original_width,
            original_height,
        })
    }
}

impl Default for ImageHygiene {
    fn default() -> Self {
        Self::new(&ImageConfig::default())
    }
}

/// [`ImageHygiene::strip_metadata`] with the default configuration.
pub fn strip_image_metadata(bytes: &[u8], mime_type: &str) -> Result<CleanImage, ImageError> {
    ImageHygiene::default().strip_metadata(bytes, mime_type, "image")
}

/// Decode and apply the EXIF orientation, which re-encoding would otherwise drop.
fn decode_upright(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| ImageError::Decode(image::ImageError::IoError(err)))?
        .into_decoder()
        .map_err(ImageError::Decode)?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut img = DynamicImage::from_decoder(decoder).map_err(ImageError::Decode)?;
    if orientation != Orientation::NoTransforms {
        log::debug!("[Hygiene] applying EXIF orientation {:?}", orientation);
        img.apply_orientation(orientation);
    }
    Ok(img)
}

fn is_png(mime_type: &str) -> bool {
    mime_type.trim().eq_ignore_ascii_case(MIME_PNG)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut out = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality))
        .map_err(ImageError::Encode)?;
    Ok(out)
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, ImageError> {
    let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
    let mut out = Vec::new();
    rgba.write_with_encoder(PngEncoder::new(&mut out))
        .map_err(ImageError::Encode)?;
    Ok(out)
}

/// Filename whose extension matches the output encoding.
pub fn output_file_name(original: &str, png: bool) -> String {
    let path = Path::new(original);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    if png {
        format!("{stem}.png")
    } else if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") {
        format!("{stem}.{ext}")
    } else {
        format!("{stem}.jpg")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("scan.png", true), "scan.png");
        assert_eq!(output_file_name("photo.JPEG", false), "photo.JPEG");
        assert_eq!(output_file_name("photo.webp", false), "photo.jpg");
        assert_eq!(output_file_name("noext", false), "noext.jpg");
        assert_eq!(output_file_name("", false), "image.jpg");
    }

    #[test]
    fn test_png_detection() {
        assert!(is_png("image/png"));
        assert!(is_png(" IMAGE/PNG "));
        assert!(!is_png("image/jpeg"));
    }

    #[test]
    fn test_quality_clamped() {
        let hygiene = ImageHygiene::new(&ImageConfig {
            jpeg_quality: 0,
            ..ImageConfig::default()
        });
        assert_eq!(hygiene.jpeg_quality, 1);
    }
}
