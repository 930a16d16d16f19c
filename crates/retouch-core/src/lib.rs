//! Retouch Core - interactive image editing engine
//!
//! This crate provides the editing engine behind Retouch: a fixed-order
//! pipeline of parameterized effects, a cumulative rotation state machine,
//! a validated parameter store, and the session controller that ties them
//! to a base image.
//!
//! # Module Structure
//!
//! - `raster` - The RGB [`Image`] buffer
//! - `effects` - Pure effect functions (color, convolution, tone, edges, geometry, rotation)
//! - `params` - [`ParameterSet`] with range-checked setters
//! - `pipeline` - [`render`] and the [`PipelineEngine`] cache
//! - `rotation` - [`RotationState`] and [`Anchor`]
//! - `session` - [`Session`], the controller a UI drives
//! - `provider` - Base-image loading from samples or files
//! - `histogram` - Per-channel histograms of the displayed image
//! - `config` - [`EngineConfig`]
//!
//! # Logging
//!
//! Operations emit `tracing` events and spans. No subscriber is installed
//! by this crate.

pub mod config;
pub mod effects;
pub mod error;
pub mod histogram;
pub mod params;
pub mod pipeline;
pub mod provider;
pub mod raster;
pub mod rotation;
pub mod session;

pub use config::EngineConfig;
pub use effects::geometry::FilterType;
pub use effects::InterpolationFilter;
pub use error::{EditError, EffectError, ImageLoadError, TransformError, ValidationError};
pub use histogram::{compute_histogram, Histogram};
pub use params::{Control, ParameterSet, ResizeTarget};
pub use pipeline::{planned_steps, render, PipelineEngine, PipelineStep};
pub use provider::{FileProvider, ImageProvider, ImageSource, SampleImage};
pub use raster::{ColorModel, Image};
pub use rotation::{Anchor, RotationState};
pub use session::{LastAction, Session};
