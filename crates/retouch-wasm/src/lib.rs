//! Retouch WASM - WebAssembly bindings for Retouch
//!
//! This crate exposes the retouch-core editing session to JavaScript/TypeScript.
//! Widgets, canvas drawing and file pickers live on the JavaScript side; this
//! crate only owns the session state and the pixels.
//!
//! # Module Structure
//!
//! - `session` - `JsSession`, the editing session wrapper
//! - `types` - WASM-compatible wrapper types for image data
//! - `histogram` - Histogram bindings
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsSession, anchor_names } from '@retouch/wasm';
//!
//! await init();
//!
//! const session = new JsSession();
//! session.load_bytes(new Uint8Array(await file.arrayBuffer()));
//! session.set_posterize_levels(3);
//! const shown = session.displayed();
//! console.log(`Showing ${shown.width}x${shown.height}`);
//! ```

use wasm_bindgen::prelude::*;

mod histogram;
mod session;
mod types;

pub use histogram::{compute_histogram, JsHistogram};
pub use session::{anchor_names, sample_file_stem, sample_names, JsSession};
pub use types::JsImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
