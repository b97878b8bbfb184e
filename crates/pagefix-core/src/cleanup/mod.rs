//! Document cleanup and moire removal.
//!
//! Cleanup turns a photographed or scanned page into a clean baseline:
//! an adaptive threshold finds everything darker than its surroundings
//! (text, lines, stamps) and every other pixel is flattened to white,
//! while foreground pixels keep their original intensity.
//!
//! ```text
//! gray ──► adaptive mask ──► close / dilate ──► composite ──► baseline
//!   (Gaussian mean, 25×25, C = 15, inverted)      (src & m) + !m
//! ```
//!
//! Moire removal runs the same recipe on a denoised copy of the
//! pre-cleanup source, then composites against the untouched source so
//! colour survives.

mod denoise;

pub use denoise::{denoise, multi_scale_smooth};

use image::GrayImage;
use imageproc::distance_transform::Norm;
use imageproc::morphology;
use tracing::{debug, instrument};

use crate::buffer::{ColorLayout, PixelBuffer};
use crate::color::to_gray;
use crate::filter::{gaussian_blur, Border};

/// Neighbourhood size of the adaptive threshold.
pub const BLOCK_SIZE: usize = 25;

/// How far below the local mean a pixel must be to count as foreground.
pub const THRESHOLD_OFFSET: i16 = 15;

/// Half-size of the structuring element used to refine the mask.
///
/// Zero means a 1×1 element, for which closing and dilation leave the
/// mask unchanged.
pub const MORPH_RADIUS: u8 = 0;

/// Inverted adaptive threshold with a Gaussian-weighted local mean.
///
/// A pixel becomes foreground (255) when `src <= mean - offset`, where
/// `mean` is the `block_size`×`block_size` Gaussian blur of `gray` with
/// replicated borders. Everything else becomes 0.
pub fn adaptive_mask(gray: &PixelBuffer, block_size: usize, offset: i16) -> PixelBuffer {
    debug_assert_eq!(gray.layout, ColorLayout::Gray);

    let mean = gaussian_blur(gray, block_size, 0.0, Border::Replicate);
    let pixels = gray
        .pixels
        .iter()
        .zip(&mean.pixels)
        .map(|(&s, &m)| {
            if s as i16 - m as i16 <= -offset {
                255
            } else {
                0
            }
        })
        .collect();
    PixelBuffer::new(gray.width, gray.height, ColorLayout::Gray, pixels)
}

/// Close then dilate the mask with a square element of [`MORPH_RADIUS`].
pub fn refine_mask(mask: &PixelBuffer) -> PixelBuffer {
    let Some(image) = mask.to_gray_image() else {
        return mask.clone();
    };
    let closed: GrayImage = morphology::close(&image, Norm::LInf, MORPH_RADIUS);
    let dilated = morphology::dilate(&closed, Norm::LInf, MORPH_RADIUS);
    PixelBuffer::from_gray_image(dilated)
}

/// Keep `source` where `mask` is set and paint white elsewhere.
///
/// Per sample: `(source & mask) + !mask`, saturating. A gray mask is
/// broadcast across all channels of a colour source.
pub fn composite(source: &PixelBuffer, mask: &PixelBuffer) -> PixelBuffer {
    debug_assert_eq!(mask.layout, ColorLayout::Gray);
    debug_assert_eq!(source.pixel_count(), mask.pixel_count());

    let ch = source.channels();
    let pixels = source
        .pixels
        .chunks_exact(ch)
        .zip(&mask.pixels)
        .flat_map(|(px, &m)| px.iter().map(move |&s| (s & m).saturating_add(!m)))
        .collect();
    PixelBuffer::new(source.width, source.height, source.layout, pixels)
}

/// Build the refined foreground mask for an image of any layout.
fn foreground_mask(image: &PixelBuffer) -> PixelBuffer {
    let gray = to_gray(image);
    refine_mask(&adaptive_mask(&gray, BLOCK_SIZE, THRESHOLD_OFFSET))
}

/// Produce the single-channel baseline from a freshly decoded image.
#[instrument(skip_all, fields(width = raw.width, height = raw.height))]
pub fn cleanup(raw: &PixelBuffer) -> PixelBuffer {
    let gray = to_gray(raw);
    let mask = refine_mask(&adaptive_mask(&gray, BLOCK_SIZE, THRESHOLD_OFFSET));
    debug!(
        foreground = mask.pixels.iter().filter(|&&m| m != 0).count(),
        "cleanup mask built"
    );
    composite(&gray, &mask)
}

/// Re-derive a moire-free baseline from the pre-cleanup source.
///
/// The mask comes from the denoised image, but the kept pixels come from
/// `source` itself, so the result has the same layout as `source`.
#[instrument(skip_all, fields(width = source.width, height = source.height))]
pub fn remove_moire(source: &PixelBuffer) -> PixelBuffer {
    let smoothed = denoise(source);
    let mask = foreground_mask(&smoothed);
    debug!(
        foreground = mask.pixels.iter().filter(|&&m| m != 0).count(),
        "moire mask built"
    );
    composite(source, &mask)
}
