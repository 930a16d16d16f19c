//! Editing session bindings.
//!
//! `JsSession` wraps the core session controller. Every control change
//! returns once the displayed image has been recomputed; rejected changes
//! throw a string error, leave the session untouched, and are echoed to the
//! browser console.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const session = JsSession.from_config({ rotation_filter: 'Lanczos3' });
//! session.load_bytes(new Uint8Array(await file.arrayBuffer()));
//! session.set_gamma(1.4);
//! session.rotate('45');
//! draw(session.displayed());
//! ```

use std::fmt::Display;

use js_sys::Array;
use retouch_core::{
    Anchor, EngineConfig, FileProvider, ImageLoadError, ParameterSet, SampleImage, Session,
};
use wasm_bindgen::prelude::*;
use web_sys::console;

use crate::histogram::JsHistogram;
use crate::types::JsImage;

/// Log a rejected operation to the console and turn it into a JS error.
fn reject(err: impl Display) -> JsValue {
    let message = err.to_string();
    console::warn_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

/// An editing session for JavaScript.
#[wasm_bindgen]
pub struct JsSession {
    inner: Session<FileProvider>,
}

#[wasm_bindgen]
impl JsSession {
    /// Create a session with default settings.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a session from a settings object. `undefined` uses defaults.
    pub fn from_config(config: JsValue) -> Result<JsSession, JsValue> {
        if config.is_undefined() || config.is_null() {
            return Ok(Self::new());
        }
        let config: EngineConfig =
            serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::with_config(config))
    }

    // ===== Base image =====

    /// Decode an encoded image (JPEG or PNG) and make it the base image.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        let image = FileProvider::decode_bytes(bytes).map_err(reject)?;
        self.inner.install(image).map_err(reject)
    }

    /// Make already decoded RGB pixels the base image.
    pub fn load_image(&mut self, image: &JsImage) -> Result<(), JsValue> {
        let image = image.to_image().ok_or_else(|| {
            reject(ImageLoadError::Decode(
                "pixel buffer does not match dimensions".to_string(),
            ))
        })?;
        self.inner.install(image).map_err(reject)
    }

    /// Discard all edits on the current image.
    pub fn reload(&mut self) -> Result<(), JsValue> {
        self.inner.reload().map_err(reject)
    }

    /// Base image size as `"<width>x<height>"`, to pre-fill the resize box.
    #[wasm_bindgen(getter)]
    pub fn base_size(&self) -> Option<String> {
        self.inner.base_size_text()
    }

    // ===== Controls =====

    pub fn set_gamma(&mut self, value: f64) -> Result<(), JsValue> {
        self.inner.set_gamma(value).map_err(reject)
    }

    pub fn set_hue(&mut self, value: f64) -> Result<(), JsValue> {
        self.inner.set_hue(value).map_err(reject)
    }

    pub fn set_saturation(&mut self, value: f64) -> Result<(), JsValue> {
        self.inner.set_saturation(value).map_err(reject)
    }

    pub fn set_sharpen(&mut self, value: f64) -> Result<(), JsValue> {
        self.inner.set_sharpen(value).map_err(reject)
    }

    pub fn set_blur_radius(&mut self, value: i32) -> Result<(), JsValue> {
        self.inner.set_blur_radius(value).map_err(reject)
    }

    pub fn set_posterize_levels(&mut self, value: i32) -> Result<(), JsValue> {
        self.inner.set_posterize_levels(value).map_err(reject)
    }

    pub fn set_solarize_threshold(&mut self, value: i32) -> Result<(), JsValue> {
        self.inner.set_solarize_threshold(value).map_err(reject)
    }

    pub fn set_edges_enabled(&mut self, enabled: bool) -> Result<(), JsValue> {
        self.inner.set_edges_enabled(enabled).map_err(reject)
    }

    pub fn set_edges_low_threshold(&mut self, value: i32) -> Result<(), JsValue> {
        self.inner.set_edges_low_threshold(value).map_err(reject)
    }

    pub fn set_emboss_enabled(&mut self, enabled: bool) -> Result<(), JsValue> {
        self.inner.set_emboss_enabled(enabled).map_err(reject)
    }

    pub fn set_emboss_bias(&mut self, value: i32) -> Result<(), JsValue> {
        self.inner.set_emboss_bias(value).map_err(reject)
    }

    pub fn toggle_flip_horizontal(&mut self) -> Result<bool, JsValue> {
        self.inner.toggle_flip_horizontal().map_err(reject)
    }

    pub fn toggle_flip_vertical(&mut self) -> Result<bool, JsValue> {
        self.inner.toggle_flip_vertical().map_err(reject)
    }

    /// Resize to `"<width>x<height>"`; returns the accepted size.
    pub fn request_resize(&mut self, input: &str) -> Result<String, JsValue> {
        self.inner
            .request_resize(input)
            .map(|target| target.to_string())
            .map_err(reject)
    }

    /// Serialize the current controls for storage.
    pub fn params_to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.params())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Restore controls saved with `params_to_json`.
    pub fn params_from_json(&mut self, value: JsValue) -> Result<(), JsValue> {
        let params: ParameterSet =
            serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.inner.apply_params(params).map_err(reject)
    }

    // ===== Rotation =====

    /// Add a rotation increment in degrees. Returns whether the view is
    /// rotated afterwards.
    pub fn rotate(&mut self, increment: &str) -> Result<bool, JsValue> {
        self.inner.rotate(increment).map_err(reject)
    }

    pub fn set_anchor(&mut self, name: &str) -> Result<(), JsValue> {
        let anchor: Anchor = name.parse().map_err(reject)?;
        self.inner.set_anchor(anchor);
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn anchor(&self) -> String {
        self.inner.rotation().anchor().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn angle(&self) -> f64 {
        self.inner.rotation().angle()
    }

    #[wasm_bindgen(getter)]
    pub fn is_rotated(&self) -> bool {
        self.inner.rotation().is_active()
    }

    // ===== Presentation =====

    pub fn toggle_axis(&mut self) -> bool {
        self.inner.toggle_axis()
    }

    #[wasm_bindgen(getter)]
    pub fn axis_visible(&self) -> bool {
        self.inner.axis_visible()
    }

    /// `"None"`, `"Resized"` or `"Rotated"`.
    #[wasm_bindgen(getter)]
    pub fn last_action(&self) -> String {
        format!("{:?}", self.inner.last_action())
    }

    /// The image to draw, or `undefined` before any image is loaded.
    pub fn displayed(&self) -> Option<JsImage> {
        self.inner.displayed().map(JsImage::from_image)
    }

    /// Histogram of the displayed image; `undefined` while edges are shown.
    pub fn histogram(&self) -> Option<JsHistogram> {
        self.inner.histogram().as_ref().map(JsHistogram::from)
    }
}

impl Default for JsSession {
    fn default() -> Self {
        Self::new()
    }
}

impl JsSession {
    pub(crate) fn with_config(config: EngineConfig) -> Self {
        Self {
            inner: Session::with_config(config),
        }
    }
}

/// Names of the rotation anchors, for the anchor picker.
#[wasm_bindgen]
pub fn anchor_names() -> Array {
    Anchor::ALL
        .into_iter()
        .map(|anchor| JsValue::from_str(anchor.name()))
        .collect()
}

/// Names of the built-in samples, for the sample picker.
#[wasm_bindgen]
pub fn sample_names() -> Array {
    SampleImage::ALL
        .into_iter()
        .map(|sample| JsValue::from_str(sample.name()))
        .collect()
}

/// File stem a sample is stored under, e.g. `"black_cat"` for `"Black Cat"`.
#[wasm_bindgen]
pub fn sample_file_stem(name: &str) -> String {
    SampleImage::from_name(name).file_stem().to_string()
}


/// Tests for paths that build a `JsValue`.
///
/// These only run on wasm32 targets. Use `wasm-pack test` to run them.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn loaded_session() -> JsSession {
        let mut session = JsSession::new();
        let img = retouch_core::Image::from_fn(8, 8, |x, y| [x as u8 * 30, y as u8 * 30, 60]);
        session.load_image(&JsImage::from_image(&img)).unwrap();
        session
    }

    #[wasm_bindgen_test]
    fn test_from_config_undefined_uses_defaults() {
        let session = JsSession::from_config(JsValue::UNDEFINED).unwrap();
        assert!(session.displayed().is_none());
    }

    #[wasm_bindgen_test]
    fn test_rejected_resize_keeps_image() {
        let mut session = loaded_session();
        assert!(session.request_resize("100x").is_err());
        assert!(session.request_resize("4294967295x4294967295").is_err());
        let shown = session.displayed().unwrap();
        assert_eq!((shown.width(), shown.height()), (8, 8));
        assert_eq!(session.last_action(), "None");
    }

    #[wasm_bindgen_test]
    fn test_out_of_range_control_is_rejected() {
        let mut session = loaded_session();
        assert!(session.set_blur_radius(3).is_err());
        assert!(session.set_posterize_levels(0).is_err());
        assert!(session.rotate("abc").is_err());
        assert!(!session.is_rotated());
    }

    #[wasm_bindgen_test]
    fn test_unknown_anchor_is_rejected() {
        let mut session = loaded_session();
        assert!(session.set_anchor("Middle").is_err());
        assert_eq!(session.anchor(), "Center");
    }

    #[wasm_bindgen_test]
    fn test_params_json_round_trip() {
        let mut session = loaded_session();
        session.set_gamma(1.5).unwrap();
        session.set_emboss_enabled(true).unwrap();
        let saved = session.params_to_json().unwrap();

        let mut restored = loaded_session();
        restored.params_from_json(saved).unwrap();
        let expected = session.displayed().unwrap().pixels();
        assert_eq!(restored.displayed().unwrap().pixels(), expected);
    }

    #[wasm_bindgen_test]
    fn test_picker_lists() {
        assert_eq!(anchor_names().length(), 9);
        assert_eq!(sample_names().length(), 9);
    }
}
