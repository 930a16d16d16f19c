//! WASM-compatible wrapper types for image data.

use retouch_core::Image;
use wasm_bindgen::prelude::*;

/// An RGB image handed to or from JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`.
#[wasm_bindgen]
pub struct JsImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsImage {
    /// Create a new JsImage from dimensions and pixel data.
    ///
    /// # Arguments
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsImage {
        JsImage {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 3 for RGB)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns RGB pixel data as Uint8Array.
    ///
    /// Note: This creates a copy of the pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }
}

impl JsImage {
    pub(crate) fn from_image(img: &Image) -> Self {
        Self {
            width: img.width(),
            height: img.height(),
            pixels: img.pixels().to_vec(),
        }
    }

    /// Convert to a core image. `None` if the buffer length does not match
    /// the dimensions.
    pub(crate) fn to_image(&self) -> Option<Image> {
        Image::from_raw(self.width, self.height, self.pixels.clone())
    }
}
