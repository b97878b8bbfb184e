//! The pixel buffer shared by every pipeline stage.
//!
//! A [`PixelBuffer`] is either single-channel intensity or three-channel
//! colour, stored row-major with interleaved samples. There is no alpha:
//! anything decoded with transparency is flattened before it gets here.

use image::{GrayImage, RgbImage};

/// Channel layout of a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorLayout {
    /// One intensity sample per pixel.
    Gray,
    /// Three interleaved samples per pixel, in R, G, B order.
    Rgb,
}

impl ColorLayout {
    /// Number of samples per pixel.
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            ColorLayout::Gray => 1,
            ColorLayout::Rgb => 3,
        }
    }
}

/// A rectangular 8-bit image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Channel layout of `pixels`.
    pub layout: ColorLayout,
    /// Row-major sample data. Length is `width * height * channels`.
    pub pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Create a buffer from existing sample data.
    pub fn new(width: u32, height: u32, layout: ColorLayout, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * layout.channels(),
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            layout,
            pixels,
        }
    }

    /// Create a buffer with every sample set to `value`.
    pub fn filled(width: u32, height: u32, layout: ColorLayout, value: u8) -> Self {
        let len = width as usize * height as usize * layout.channels();
        Self::new(width, height, layout, vec![value; len])
    }

    /// Wrap an `image::GrayImage`.
    pub fn from_gray_image(img: GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, ColorLayout::Gray, img.into_raw())
    }

    /// Wrap an `image::RgbImage`.
    pub fn from_rgb_image(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, ColorLayout::Rgb, img.into_raw())
    }

    /// Copy into an `image::GrayImage`, or `None` if this is a colour buffer.
    pub fn to_gray_image(&self) -> Option<GrayImage> {
        match self.layout {
            ColorLayout::Gray => GrayImage::from_raw(self.width, self.height, self.pixels.clone()),
            ColorLayout::Rgb => None,
        }
    }

    /// Samples per pixel.
    #[inline]
    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    /// Sample `c` of the pixel at `(x, y)`.
    #[inline]
    pub fn sample(&self, x: u32, y: u32, c: usize) -> u8 {
        self.pixels[self.index(x, y) + c]
    }

    /// Offset of the first sample of pixel `(x, y)`.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels()
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Get the size of the sample buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// Apply `f` to every sample, keeping dimensions and layout.
    pub fn map_samples(&self, f: impl Fn(u8) -> u8) -> Self {
        Self {
            width: self.width,
            height: self.height,
            layout: self.layout,
            pixels: self.pixels.iter().map(|&v| f(v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let img = PixelBuffer::filled(100, 50, ColorLayout::Rgb, 0);

        assert_eq!(img.width, 100);
        assert_eq!(img.height, 50);
        assert_eq!(img.channels(), 3);
        assert_eq!(img.pixel_count(), 5000);
        assert_eq!(img.byte_size(), 15000);
        assert!(!img.is_empty());
    }

    #[test]
    fn test_buffer_empty() {
        let img = PixelBuffer::new(0, 0, ColorLayout::Gray, vec![]);
        assert!(img.is_empty());
    }

    #[test]
    fn test_sample_indexing() {
        let pixels: Vec<u8> = (0..12).collect();
        let img = PixelBuffer::new(2, 2, ColorLayout::Rgb, pixels);

        assert_eq!(img.sample(0, 0, 0), 0);
        assert_eq!(img.sample(1, 0, 2), 5);
        assert_eq!(img.sample(0, 1, 1), 7);
        assert_eq!(img.sample(1, 1, 2), 11);
    }

    #[test]
    fn test_gray_roundtrip_through_image_crate() {
        let img = PixelBuffer::new(3, 1, ColorLayout::Gray, vec![1, 2, 3]);
        let gray = img.to_gray_image().unwrap();
        assert_eq!(PixelBuffer::from_gray_image(gray), img);
        assert!(PixelBuffer::filled(3, 1, ColorLayout::Rgb, 0).to_gray_image().is_none());
    }

    #[test]
    fn test_map_samples() {
        let img = PixelBuffer::new(2, 1, ColorLayout::Gray, vec![10, 250]);
        let out = img.map_samples(|v| v.saturating_add(10));
        assert_eq!(out.pixels, vec![20, 255]);
    }
}
