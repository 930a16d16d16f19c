//! The immutable RGB image buffer passed between pipeline stages.

use serde::{Deserialize, Serialize};

/// Color model tag carried by every [`Image`].
///
/// Every effect in the pipeline produces RGB output, including the edge map
/// which replicates its single channel across all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorModel {
    #[default]
    Rgb,
}

impl ColorModel {
    /// Number of interleaved channels per pixel.
    pub fn channels(self) -> usize {
        match self {
            ColorModel::Rgb => 3,
        }
    }
}

/// An RGB image with 8 bits per channel.
///
/// Images are never mutated after construction: every effect takes `&Image`
/// and returns a new one. The pixel buffer is row-major with
/// `width * height * 3` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    color: ColorModel,
    pixels: Vec<u8>,
}

impl Image {
    /// Create a new image with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize) * 3,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            color: ColorModel::Rgb,
            pixels,
        }
    }

    /// Create an image, returning `None` if the buffer length does not match.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != (width as usize) * (height as usize) * 3 {
            return None;
        }
        Some(Self::new(width, height, pixels))
    }

    /// Build an image by evaluating `f` for every pixel in row-major order.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 3]) -> Self {
        let mut pixels = Vec::with_capacity((width as usize) * (height as usize) * 3);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Self::new(width, height, pixels)
    }

    /// Create an image from an `image::RgbImage`.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, img.into_raw())
    }

    /// Convert to an `image::RgbImage` for use with the `image` crate.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Derive a new image of the same size by mapping every channel value.
    pub fn map_channels(&self, f: impl Fn(u8) -> u8) -> Self {
        Self::new(
            self.width,
            self.height,
            self.pixels.iter().map(|&c| f(c)).collect(),
        )
    }

    /// Derive a new image of the same size by mapping every pixel.
    pub fn map_pixels(&self, mut f: impl FnMut([u8; 3]) -> [u8; 3]) -> Self {
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for chunk in self.pixels.chunks_exact(3) {
            pixels.extend_from_slice(&f([chunk[0], chunk[1], chunk[2]]));
        }
        Self::new(self.width, self.height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn color_model(&self) -> ColorModel {
        self.color
    }

    /// Raw RGB bytes in row-major order.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Consume the image and return its pixel buffer.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Read the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are outside the image.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 3;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
