//! Editing session controller.
//!
//! A [`Session`] owns the base image, the current [`ParameterSet`] and
//! [`RotationState`], and the cached composed and rotated images. Every
//! control change runs the full pipeline from the base image before it is
//! committed; if validation or rendering fails, nothing changes.
//!
//! Installing a new base image is the only operation that resets the
//! controls.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::EngineConfig;
use crate::error::{EditError, ValidationError};
use crate::histogram::{compute_histogram, Histogram};
use crate::params::{ParameterSet, ResizeTarget};
use crate::pipeline::PipelineEngine;
use crate::provider::{FileProvider, ImageProvider, ImageSource};
use crate::raster::Image;
use crate::rotation::{parse_increment, Anchor, RotationState};

/// The last geometry action taken, for highlighting the matching control.
///
/// Carries no meaning for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LastAction {
    #[default]
    None,
    Resized,
    Rotated,
}

/// One editing session over a single base image at a time.
#[derive(Debug)]
pub struct Session<P: ImageProvider = FileProvider> {
    provider: P,
    config: EngineConfig,
    source: Option<ImageSource>,
    base: Option<Image>,
    params: ParameterSet,
    rotation: RotationState,
    engine: PipelineEngine,
    rotated: Option<Image>,
    last_action: LastAction,
    axis_visible: bool,
}

impl Session<FileProvider> {
    /// A session reading images from disk, with samples taken from
    /// `config.samples_dir`.
    pub fn with_config(config: EngineConfig) -> Self {
        let provider = FileProvider::from_config(&config);
        Self::new(provider, config)
    }
}

impl<P: ImageProvider> Session<P> {
    pub fn new(provider: P, config: EngineConfig) -> Self {
        Self {
            provider,
            config,
            source: None,
            base: None,
            params: ParameterSet::default(),
            rotation: RotationState::default(),
            engine: PipelineEngine::new(),
            rotated: None,
            last_action: LastAction::None,
            axis_visible: false,
        }
    }

    // ===== Base image =====

    /// Load `source` through the provider and install it.
    ///
    /// If loading fails the previous image and every control are kept.
    #[instrument(skip_all, fields(source = %source))]
    pub fn open(&mut self, source: ImageSource) -> Result<(), EditError> {
        let image = match self.provider.load(&source) {
            Ok(image) => image,
            Err(e) => {
                warn!(error = %e, "keeping previous image");
                return Err(e.into());
            }
        };
        self.install(image)?;
        self.source = Some(source);
        Ok(())
    }

    /// Make `image` the base image and reset every control.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn install(&mut self, image: Image) -> Result<(), EditError> {
        let params = ParameterSet::default();
        let mut engine = PipelineEngine::new();
        engine.recompute(&image, &params, &self.config)?;

        self.engine = engine;
        self.params = params;
        self.rotation = RotationState::default();
        self.rotated = None;
        self.last_action = LastAction::None;
        self.base = Some(image);
        info!("installed base image");
        Ok(())
    }

    /// Re-install the current base image, discarding all edits.
    ///
    /// Does nothing when no image is installed.
    pub fn reload(&mut self) -> Result<(), EditError> {
        match self.base.clone() {
            Some(image) => self.install(image),
            None => Ok(()),
        }
    }

    // ===== Controls =====

    pub fn set_gamma(&mut self, value: f64) -> Result<(), EditError> {
        self.update("gamma", |p| p.set_gamma(value))
    }

    pub fn set_hue(&mut self, value: f64) -> Result<(), EditError> {
        self.update("hue", |p| p.set_hue(value))
    }

    pub fn set_saturation(&mut self, value: f64) -> Result<(), EditError> {
        self.update("saturation", |p| p.set_saturation(value))
    }

    pub fn set_sharpen(&mut self, value: f64) -> Result<(), EditError> {
        self.update("sharpen", |p| p.set_sharpen(value))
    }

    pub fn set_blur_radius(&mut self, value: i32) -> Result<(), EditError> {
        self.update("blur radius", |p| p.set_blur_radius(value))
    }

    pub fn set_posterize_levels(&mut self, value: i32) -> Result<(), EditError> {
        self.update("posterize levels", |p| p.set_posterize_levels(value))
    }

    pub fn set_solarize_threshold(&mut self, value: i32) -> Result<(), EditError> {
        self.update("solarize threshold", |p| p.set_solarize_threshold(value))
    }

    /// Turn edge detection on or off. Turning it on turns emboss off.
    pub fn set_edges_enabled(&mut self, enabled: bool) -> Result<(), EditError> {
        self.update("edges", |p| {
            p.set_edges_enabled(enabled);
            Ok(())
        })
    }

    pub fn set_edges_low_threshold(&mut self, value: i32) -> Result<(), EditError> {
        self.update("edges low threshold", |p| p.set_edges_low_threshold(value))
    }

    /// Turn emboss on or off. Turning it on turns edge detection off.
    pub fn set_emboss_enabled(&mut self, enabled: bool) -> Result<(), EditError> {
        self.update("emboss", |p| {
            p.set_emboss_enabled(enabled);
            Ok(())
        })
    }

    pub fn set_emboss_bias(&mut self, value: i32) -> Result<(), EditError> {
        self.update("emboss bias", |p| p.set_emboss_bias(value))
    }

    pub fn set_flip_horizontal(&mut self, enabled: bool) -> Result<(), EditError> {
        self.update("horizontal flip", |p| {
            p.set_flip_horizontal(enabled);
            Ok(())
        })
    }

    pub fn set_flip_vertical(&mut self, enabled: bool) -> Result<(), EditError> {
        self.update("vertical flip", |p| {
            p.set_flip_vertical(enabled);
            Ok(())
        })
    }

    /// Toggle the horizontal flip, returning the new state.
    pub fn toggle_flip_horizontal(&mut self) -> Result<bool, EditError> {
        let enabled = !self.params.flip_horizontal();
        self.set_flip_horizontal(enabled)?;
        Ok(enabled)
    }

    /// Toggle the vertical flip, returning the new state.
    pub fn toggle_flip_vertical(&mut self) -> Result<bool, EditError> {
        let enabled = !self.params.flip_vertical();
        self.set_flip_vertical(enabled)?;
        Ok(enabled)
    }

    /// Resize the composed image to `"<width>x<height>"`.
    #[instrument(skip(self))]
    pub fn request_resize(&mut self, input: &str) -> Result<ResizeTarget, EditError> {
        let target = self.update("resize", |p| p.request_resize(input))?;
        self.last_action = LastAction::Resized;
        Ok(target)
    }

    /// Replace every control at once, as when restoring saved settings.
    ///
    /// The set is validated as a whole before anything is rendered.
    pub fn apply_params(&mut self, params: ParameterSet) -> Result<(), EditError> {
        self.update("all", move |p| {
            params.validate()?;
            *p = params;
            Ok(())
        })
    }

    // ===== Rotation =====

    /// Add a rotation increment given as text, in degrees.
    ///
    /// An empty string resets the rotation. Returns whether the view is
    /// rotated afterwards.
    #[instrument(skip(self))]
    pub fn rotate(&mut self, input: &str) -> Result<bool, EditError> {
        let delta = match parse_increment(input) {
            Ok(delta) => delta,
            Err(e) => {
                warn!(error = %e, "rejected rotation");
                return Err(e.into());
            }
        };
        let active = self.rotation.rotate_by(delta);
        self.last_action = LastAction::Rotated;
        self.reapply_rotation();
        Ok(active)
    }

    /// Change the rotation pivot, re-rendering if rotated.
    #[instrument(skip(self))]
    pub fn set_anchor(&mut self, anchor: Anchor) {
        self.rotation.set_anchor(anchor);
        self.reapply_rotation();
    }

    // ===== Presentation =====

    /// Toggle the axis overlay, returning the new state.
    pub fn toggle_axis(&mut self) -> bool {
        self.axis_visible = !self.axis_visible;
        self.axis_visible
    }

    pub fn axis_visible(&self) -> bool {
        self.axis_visible
    }

    pub fn last_action(&self) -> LastAction {
        self.last_action
    }

    // ===== Accessors =====

    /// The image to show: the rotated view while rotated, otherwise the
    /// composed image.
    pub fn displayed(&self) -> Option<&Image> {
        if self.rotation.is_active() {
            if let Some(rotated) = &self.rotated {
                return Some(rotated);
            }
        }
        self.composed()
    }

    /// The pipeline output before rotation.
    pub fn composed(&self) -> Option<&Image> {
        self.engine.last_composed().or(self.base.as_ref())
    }

    pub fn base(&self) -> Option<&Image> {
        self.base.as_ref()
    }

    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Histogram of the displayed image, unavailable while edge detection
    /// is on.
    pub fn histogram(&self) -> Option<Histogram> {
        if self.params.edges_enabled() {
            return None;
        }
        self.displayed().map(compute_histogram)
    }

    /// Size of the base image as `"<width>x<height>"`.
    pub fn base_size_text(&self) -> Option<String> {
        self.base
            .as_ref()
            .map(|img| format!("{}x{}", img.width(), img.height()))
    }

    // ===== Internals =====

    /// Apply `edit` to a copy of the parameters, re-render, and commit both
    /// only if everything succeeded.
    fn update<T>(
        &mut self,
        control: &'static str,
        edit: impl FnOnce(&mut ParameterSet) -> Result<T, ValidationError>,
    ) -> Result<T, EditError> {
        let mut next = self.params.clone();
        let output = match edit(&mut next) {
            Ok(output) => output,
            Err(e) => {
                warn!(control, error = %e, "rejected control change");
                return Err(e.into());
            }
        };

        if let Some(base) = &self.base {
            if let Err(e) = self.engine.recompute(base, &next, &self.config) {
                warn!(control, error = %e, "render failed, keeping previous image");
                return Err(e.into());
            }
        }

        self.params = next;
        debug!(control, "control updated");
        self.reapply_rotation();
        Ok(output)
    }

    /// Render the rotated view from the composed image, with anchors placed
    /// on the base image's dimensions.
    fn reapply_rotation(&mut self) {
        self.rotated = match (&self.base, self.rotation.is_active()) {
            (Some(base), true) => {
                let composed = self.engine.last_composed().unwrap_or(base);
                Some(self.rotation.render(composed, base.dimensions(), &self.config))
            }
            _ => None,
        };
    }
}
