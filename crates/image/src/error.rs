//! Image hygiene errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("empty image payload")]
    EmptyInput,

    /// Corrupt or unsupported image; the input must not be treated as cleaned.
    #[error("image decode failed: {0}")]
    Decode(#[source] image::ImageError),

    #[error("image encode failed: {0}")]
    Encode(#[source] image::ImageError),
}
