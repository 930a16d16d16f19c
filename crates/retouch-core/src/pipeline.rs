//! The fixed-order effect pipeline.
//!
//! [`render`] turns a base image and a [`ParameterSet`] into the composed
//! (non-rotated) image. The step order never depends on the order in which
//! controls were changed, and every recompute starts again from the base
//! image.
//!
//! # Pipeline Order
//!
//! 1. Resize (when a target is set)
//! 2. Hue, saturation, gamma (always applied)
//! 3. Sharpen, blur, posterize, solarize (skipped at their no-op sentinels)
//! 4. Edge map, or else emboss
//! 5. Horizontal flip, vertical flip

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::EngineConfig;
use crate::effects;
use crate::error::{EffectError, TransformError};
use crate::params::{
    ParameterSet, DEFAULT_POSTERIZE_LEVELS, DEFAULT_SHARPEN, DEFAULT_SOLARIZE_THRESHOLD,
};
use crate::raster::Image;

/// Blur radii at or below this value leave the image untouched.
const BLUR_NOOP_MAX: u32 = 1;

/// One stage of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStep {
    Resize,
    Hue,
    Saturation,
    Gamma,
    Sharpen,
    Blur,
    Posterize,
    Solarize,
    Edges,
    Emboss,
    FlipHorizontal,
    FlipVertical,
}

impl PipelineStep {
    /// Every step in the order the pipeline runs them.
    pub const ORDER: [PipelineStep; 12] = [
        PipelineStep::Resize,
        PipelineStep::Hue,
        PipelineStep::Saturation,
        PipelineStep::Gamma,
        PipelineStep::Sharpen,
        PipelineStep::Blur,
        PipelineStep::Posterize,
        PipelineStep::Solarize,
        PipelineStep::Edges,
        PipelineStep::Emboss,
        PipelineStep::FlipHorizontal,
        PipelineStep::FlipVertical,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PipelineStep::Resize => "resize",
            PipelineStep::Hue => "hue",
            PipelineStep::Saturation => "saturation",
            PipelineStep::Gamma => "gamma",
            PipelineStep::Sharpen => "sharpen",
            PipelineStep::Blur => "blur",
            PipelineStep::Posterize => "posterize",
            PipelineStep::Solarize => "solarize",
            PipelineStep::Edges => "edges",
            PipelineStep::Emboss => "emboss",
            PipelineStep::FlipHorizontal => "horizontal flip",
            PipelineStep::FlipVertical => "vertical flip",
        }
    }

    /// Whether this step does anything under `params`.
    pub fn is_active(self, params: &ParameterSet) -> bool {
        match self {
            PipelineStep::Resize => params.resize_enabled(),
            PipelineStep::Hue | PipelineStep::Saturation | PipelineStep::Gamma => true,
            // Exact comparison: the sentinel is the slider's resting value.
            PipelineStep::Sharpen => params.sharpen() != DEFAULT_SHARPEN,
            PipelineStep::Blur => params.blur_radius() > BLUR_NOOP_MAX,
            PipelineStep::Posterize => params.posterize_levels() < DEFAULT_POSTERIZE_LEVELS,
            PipelineStep::Solarize => params.solarize_threshold() < DEFAULT_SOLARIZE_THRESHOLD,
            PipelineStep::Edges => params.edges_enabled(),
            PipelineStep::Emboss => !params.edges_enabled() && params.emboss_enabled(),
            PipelineStep::FlipHorizontal => params.flip_horizontal(),
            PipelineStep::FlipVertical => params.flip_vertical(),
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The steps that will run for `params`, in order.
pub fn planned_steps(params: &ParameterSet) -> Vec<PipelineStep> {
    PipelineStep::ORDER
        .into_iter()
        .filter(|step| step.is_active(params))
        .collect()
}

/// Compose `base` under `params`.
///
/// # Errors
///
/// Returns a [`TransformError`] naming the first step whose effect rejected
/// the image, for example a blur kernel larger than a resized image.
#[instrument(skip_all, fields(width = base.width(), height = base.height()))]
pub fn render(
    base: &Image,
    params: &ParameterSet,
    config: &EngineConfig,
) -> Result<Image, TransformError> {
    let mut current = base.clone();

    for step in planned_steps(params) {
        current = apply_step(step, &current, params, config)
            .map_err(|source| TransformError::new(step, source))?;
        debug!(
            step = step.name(),
            width = current.width(),
            height = current.height(),
            "applied pipeline step"
        );
    }

    Ok(current)
}

fn apply_step(
    step: PipelineStep,
    image: &Image,
    params: &ParameterSet,
    config: &EngineConfig,
) -> Result<Image, EffectError> {
    match step {
        PipelineStep::Resize => match params.resize_target() {
            Some(target) => {
                effects::resize_exact(image, target.width, target.height, config.resize_filter)
            }
            None => Ok(image.clone()),
        },
        PipelineStep::Hue => Ok(effects::adjust_hue(image, params.hue())),
        PipelineStep::Saturation => Ok(effects::adjust_saturation(image, params.saturation())),
        PipelineStep::Gamma => Ok(effects::adjust_gamma(image, params.gamma())),
        PipelineStep::Sharpen => effects::sharpen(image, params.sharpen()),
        PipelineStep::Blur => effects::gaussian_blur(image, params.blur_radius() + 1),
        PipelineStep::Posterize => effects::posterize(image, params.posterize_levels()),
        PipelineStep::Solarize => Ok(effects::solarize(image, params.solarize_threshold())),
        PipelineStep::Edges => {
            let low = params.edges_low_threshold() as f32;
            effects::edge_map(image, low, 2.0 * low)
        }
        PipelineStep::Emboss => effects::emboss(image, params.emboss_bias()),
        PipelineStep::FlipHorizontal => effects::flip_horizontal(image),
        PipelineStep::FlipVertical => effects::flip_vertical(image),
    }
}

/// Caches the last successfully composed image.
#[derive(Debug, Clone, Default)]
pub struct PipelineEngine {
    last_composed: Option<Image>,
}

impl PipelineEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-render from `base` and cache the result.
    ///
    /// On failure the previous composed image stays cached.
    pub fn recompute(
        &mut self,
        base: &Image,
        params: &ParameterSet,
        config: &EngineConfig,
    ) -> Result<&Image, TransformError> {
        let composed = render(base, params, config)?;
        Ok(&*self.last_composed.insert(composed))
    }

    pub fn last_composed(&self) -> Option<&Image> {
        self.last_composed.as_ref()
    }

    /// Drop the cached image, as when the base image changes.
    pub fn clear(&mut self) {
        self.last_composed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> Image {
        Image::from_fn(width, height, |x, y| {
            [(x * 13 % 256) as u8, (y * 29 % 256) as u8, ((x + y) * 7 % 256) as u8]
        })
    }

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_default_plan_is_color_only() {
        let steps = planned_steps(&ParameterSet::default());
        assert_eq!(
            steps,
            vec![PipelineStep::Hue, PipelineStep::Saturation, PipelineStep::Gamma]
        );
    }

    #[test]
    fn test_default_params_are_identity() {
        let img = gradient(16, 12);
        let out = render(&img, &ParameterSet::default(), &config()).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_plan_follows_fixed_order() {
        let mut params = ParameterSet::default();
        params.set_flip_vertical(true);
        params.set_solarize_threshold(100).unwrap();
        params.set_blur_radius(4).unwrap();
        params.request_resize("10x10").unwrap();

        assert_eq!(
            planned_steps(&params),
            vec![
                PipelineStep::Resize,
                PipelineStep::Hue,
                PipelineStep::Saturation,
                PipelineStep::Gamma,
                PipelineStep::Blur,
                PipelineStep::Solarize,
                PipelineStep::FlipVertical,
            ]
        );
    }

    #[test]
    fn test_sharpen_sentinel_is_exact() {
        let mut params = ParameterSet::default();
        params.set_sharpen(8.9).unwrap();
        assert!(!PipelineStep::Sharpen.is_active(&params));
        params.set_sharpen(8.900001).unwrap();
        assert!(PipelineStep::Sharpen.is_active(&params));
    }

    #[test]
    fn test_blur_threshold() {
        let mut params = ParameterSet::default();
        assert!(!PipelineStep::Blur.is_active(&params));
        params.set_blur_radius(2).unwrap();
        assert!(PipelineStep::Blur.is_active(&params));
    }

    #[test]
    fn test_resize_is_exact() {
        let mut params = ParameterSet::default();
        params.request_resize("7x30").unwrap();
        let out = render(&gradient(20, 10), &params, &config()).unwrap();
        assert_eq!(out.dimensions(), (7, 30));
    }

    #[test]
    fn test_flips_compose() {
        let img = gradient(5, 4);
        let mut params = ParameterSet::default();
        params.set_flip_horizontal(true);
        params.set_flip_vertical(true);
        let out = render(&img, &params, &config()).unwrap();
        assert_eq!(out.pixel(0, 0), img.pixel(4, 3));
        assert_eq!(out.pixel(4, 0), img.pixel(0, 3));
    }

    #[test]
    fn test_edges_short_circuit_emboss() {
        let mut params = ParameterSet::default();
        params.set_emboss_enabled(true);
        assert!(PipelineStep::Emboss.is_active(&params));
        params.set_edges_enabled(true);
        let steps = planned_steps(&params);
        assert!(steps.contains(&PipelineStep::Edges));
        assert!(!steps.contains(&PipelineStep::Emboss));
    }

    #[test]
    fn test_edges_output_is_binary() {
        let img = Image::from_fn(24, 24, |x, _| if x < 12 { [0; 3] } else { [255; 3] });
        let mut params = ParameterSet::default();
        params.set_edges_enabled(true);
        let out = render(&img, &params, &config()).unwrap();
        assert!(out.pixels().iter().all(|&v| v == 0 || v == 255));
    }

    #[test]
    fn test_emboss_flat_image_is_bias() {
        let img = Image::from_fn(8, 8, |_, _| [90, 90, 90]);
        let mut params = ParameterSet::default();
        params.set_emboss_enabled(true);
        params.set_emboss_bias(100).unwrap();
        let out = render(&img, &params, &config()).unwrap();
        assert!(out.pixels().iter().all(|&v| v == 100));
    }

    #[test]
    fn test_blur_failure_names_step() {
        let mut params = ParameterSet::default();
        params.request_resize("3x3").unwrap();
        params.set_blur_radius(10).unwrap();
        let err = render(&gradient(20, 20), &params, &config()).unwrap_err();
        assert_eq!(err.step, PipelineStep::Blur);
        assert!(matches!(err.source, EffectError::KernelTooLarge { .. }));
    }

    #[test]
    fn test_engine_keeps_last_good_image() {
        let img = gradient(20, 20);
        let mut engine = PipelineEngine::new();
        assert!(engine.last_composed().is_none());

        let mut params = ParameterSet::default();
        params.set_solarize_threshold(10).unwrap();
        let good = engine.recompute(&img, &params, &config()).unwrap().clone();

        params.request_resize("3x3").unwrap();
        params.set_blur_radius(10).unwrap();
        assert!(engine.recompute(&img, &params, &config()).is_err());
        assert_eq!(engine.last_composed(), Some(&good));

        engine.clear();
        assert!(engine.last_composed().is_none());
    }

    #[test]
    fn test_step_display() {
        assert_eq!(PipelineStep::Blur.to_string(), "blur");
        assert_eq!(PipelineStep::FlipHorizontal.to_string(), "horizontal flip");
    }
}
