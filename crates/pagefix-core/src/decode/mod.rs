//! Decoding file bytes into a [`PixelBuffer`].
//!
//! Any format the `image` crate is built with (PNG and JPEG here) is
//! accepted; the format is sniffed from the bytes, not the file name.
//! EXIF orientation is applied, and the result is always three-channel
//! colour regardless of the stored layout, so later stages see one shape.
//!
//! # Examples
//!
//! ```ignore
//! use pagefix_core::decode::decode_image;
//!
//! let bytes = std::fs::read("scan.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod orientation;

pub use orientation::{apply_orientation, read_orientation, Orientation};

use std::io::Cursor;

use image::{ImageError, ImageReader};
use thiserror::Error;
use tracing::debug;

use crate::buffer::PixelBuffer;

/// Error types for image decoding.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// No bytes were supplied.
    #[error("Empty input")]
    EmptyInput,

    /// The bytes are not in a recognized or supported format.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image header was recognized but the data could not be decoded.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The decoded image has zero width or height.
    #[error("Image has no pixels")]
    ZeroSized,
}

/// Decode an image from bytes, applying EXIF orientation correction.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format is not recognized,
/// `DecodeError::CorruptedFile` if decoding fails part way.
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let orientation = read_orientation(bytes);

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    let img = reader.decode().map_err(|e| match e {
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    })?;

    if img.width() == 0 || img.height() == 0 {
        return Err(DecodeError::ZeroSized);
    }

    debug!(
        width = img.width(),
        height = img.height(),
        ?orientation,
        "decoded image"
    );

    let rgb = apply_orientation(img, orientation).into_rgb8();
    Ok(PixelBuffer::from_rgb_image(rgb))
}
