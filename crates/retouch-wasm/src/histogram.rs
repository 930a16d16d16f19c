//! Histogram WASM bindings.

use retouch_core::histogram::{compute_histogram as compute_histogram_core, Histogram};
use wasm_bindgen::prelude::*;

use crate::types::JsImage;

/// Histogram result accessible from JavaScript.
///
/// Contains 256-bin histograms for red, green, blue, and luminance channels,
/// plus helper methods for clipping detection and normalization.
#[wasm_bindgen]
pub struct JsHistogram {
    red: Vec<u32>,
    green: Vec<u32>,
    blue: Vec<u32>,
    luminance: Vec<u32>,
    max_value: u32,
    has_highlight_clipping: bool,
    has_shadow_clipping: bool,
}

#[wasm_bindgen]
impl JsHistogram {
    /// Get red channel histogram (256 bins).
    pub fn red(&self) -> Vec<u32> {
        self.red.clone()
    }

    /// Get green channel histogram (256 bins).
    pub fn green(&self) -> Vec<u32> {
        self.green.clone()
    }

    /// Get blue channel histogram (256 bins).
    pub fn blue(&self) -> Vec<u32> {
        self.blue.clone()
    }

    /// Get luminance histogram (256 bins).
    pub fn luminance(&self) -> Vec<u32> {
        self.luminance.clone()
    }

    /// Get maximum bin value across all RGB channels.
    #[wasm_bindgen(getter)]
    pub fn max_value(&self) -> u32 {
        self.max_value
    }

    #[wasm_bindgen(getter)]
    pub fn has_highlight_clipping(&self) -> bool {
        self.has_highlight_clipping
    }

    #[wasm_bindgen(getter)]
    pub fn has_shadow_clipping(&self) -> bool {
        self.has_shadow_clipping
    }
}

impl From<&Histogram> for JsHistogram {
    fn from(hist: &Histogram) -> Self {
        Self {
            red: hist.red.to_vec(),
            green: hist.green.to_vec(),
            blue: hist.blue.to_vec(),
            luminance: hist.luminance.to_vec(),
            max_value: hist.max_value(),
            has_highlight_clipping: hist.has_highlight_clipping(),
            has_shadow_clipping: hist.has_shadow_clipping(),
        }
    }
}

/// Compute the histogram of an arbitrary image.
///
/// Returns `undefined` if the pixel buffer does not match the dimensions.
///
/// # Example (TypeScript)
/// ```typescript
/// const hist = compute_histogram(session.displayed());
/// const redBins = hist.red();        // Uint32Array[256]
/// const max = hist.max_value;        // For normalization
/// hist.free();
/// ```
#[wasm_bindgen]
pub fn compute_histogram(image: &JsImage) -> Option<JsHistogram> {
    let img = image.to_image()?;
    Some(JsHistogram::from(&compute_histogram_core(&img)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_histogram_creation() {
        let img = JsImage::new(3, 1, vec![255, 0, 0, 0, 255, 0, 0, 0, 255]);
        let hist = compute_histogram(&img).unwrap();

        assert_eq!(hist.red().len(), 256);
        assert_eq!(hist.luminance().len(), 256);
        assert!(hist.has_highlight_clipping);
        assert!(hist.has_shadow_clipping);
    }

    #[test]
    fn test_js_histogram_max_value() {
        let img = JsImage::new(4, 1, vec![128, 128, 128, 128, 128, 128, 128, 128, 128, 200, 200, 200]);
        let hist = compute_histogram(&img).unwrap();

        assert_eq!(hist.max_value, 3);
        assert_eq!(hist.red()[128], 3);
        assert_eq!(hist.red()[200], 1);
    }

    #[test]
    fn test_js_histogram_bad_buffer() {
        let img = JsImage::new(2, 2, vec![0, 0, 0]);
        assert!(compute_histogram(&img).is_none());
    }
}
