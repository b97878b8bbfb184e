//! Encoding a [`PixelBuffer`] to PNG or JPEG bytes.
//!
//! The format is chosen from the target file extension: `.jpg`/`.jpeg`
//! write JPEG at quality 95, everything else writes PNG at compression
//! level 3. Gray buffers are written as 8-bit luma, colour as 8-bit RGB.
//!
//! # Examples
//!
//! ```ignore
//! use pagefix_core::encode::{encode_image, OutputFormat};
//!
//! let bytes = encode_image(&image, OutputFormat::for_extension("jpg"))?;
//! std::fs::write("out.jpg", bytes)?;
//! ```

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use crate::buffer::{ColorLayout, PixelBuffer};

/// PNG compression level used when saving.
pub const PNG_COMPRESSION: u8 = 3;

/// JPEG quality used when saving.
pub const JPEG_QUALITY: u8 = 95;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: &'static str,
        message: String,
    },
}

/// Output container and its quality knob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// PNG with a zlib-style compression level (0-9).
    Png { compression: u8 },
    /// JPEG with a quality from 1 to 100.
    Jpeg { quality: u8 },
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Png {
            compression: PNG_COMPRESSION,
        }
    }
}

impl OutputFormat {
    /// Format for a recognized extension (case-insensitive, no dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(OutputFormat::Png {
                compression: PNG_COMPRESSION,
            }),
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg {
                quality: JPEG_QUALITY,
            }),
            _ => None,
        }
    }

    /// Like [`OutputFormat::from_extension`] but falls back to PNG.
    pub fn for_extension(ext: &str) -> Self {
        Self::from_extension(ext).unwrap_or_default()
    }

    /// Canonical file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png { .. } => "png",
            OutputFormat::Jpeg { .. } => "jpg",
        }
    }
}

/// Map a 0-9 compression level onto the PNG encoder's presets.
fn png_compression(level: u8) -> CompressionType {
    match level {
        0..=3 => CompressionType::Fast,
        4..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

/// Encode a buffer in the given format.
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` for empty buffers and
/// `EncodeError::InvalidPixelData` if the sample count does not match.
pub fn encode_image(image: &PixelBuffer, format: OutputFormat) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = (image.width, image.height);
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = image.pixel_count() * image.channels();
    if image.pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: image.pixels.len(),
        });
    }

    let color = match image.layout {
        ColorLayout::Gray => ExtendedColorType::L8,
        ColorLayout::Rgb => ExtendedColorType::Rgb8,
    };

    let mut buffer = Cursor::new(Vec::new());
    match format {
        OutputFormat::Png { compression } => {
            PngEncoder::new_with_quality(
                &mut buffer,
                png_compression(compression),
                FilterType::Adaptive,
            )
            .write_image(&image.pixels, width, height, color)
            .map_err(|e| EncodeError::EncodingFailed {
                format: "PNG",
                message: e.to_string(),
            })?;
        }
        OutputFormat::Jpeg { quality } => {
            JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
                .write_image(&image.pixels, width, height, color)
                .map_err(|e| EncodeError::EncodingFailed {
                    format: "JPEG",
                    message: e.to_string(),
                })?;
        }
    }

    Ok(buffer.into_inner())
}
