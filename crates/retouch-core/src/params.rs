//! The parameter store: every adjustment value plus its validation rules.
//!
//! Values only change through the validated setters below. A setter that
//! rejects its input leaves every field untouched. The only cross-field side
//! effect is edges/emboss exclusivity: enabling one disables the other.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Default gamma (no-op).
pub const DEFAULT_GAMMA: f64 = 1.0;
/// Default hue shift (no-op).
pub const DEFAULT_HUE: f64 = 0.0;
/// Default saturation factor (no-op).
pub const DEFAULT_SATURATION: f64 = 1.0;
/// Sharpen strength at which no sharpening is applied. Compared exactly.
pub const DEFAULT_SHARPEN: f64 = 8.9;
/// Default blur radius. Any radius of 1 or below skips the blur.
pub const DEFAULT_BLUR_RADIUS: u32 = 0;
/// Posterize levels at which no quantization is applied.
pub const DEFAULT_POSTERIZE_LEVELS: u8 = 6;
/// Solarize threshold at which no pixels are inverted.
pub const DEFAULT_SOLARIZE_THRESHOLD: u8 = 255;
/// Default edge detection low threshold.
pub const DEFAULT_EDGES_LOW_THRESHOLD: u8 = 50;
/// Default emboss bias.
pub const DEFAULT_EMBOSS_BIAS: u8 = 114;

/// Blur radius slider step.
pub const BLUR_RADIUS_STEP: i32 = 2;

/// Largest output area, in pixels, a resize may request.
pub const MAX_RESIZE_PIXELS: u64 = 100_000_000;

/// A user-facing adjustment control with a numeric range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    Gamma,
    Hue,
    Saturation,
    Sharpen,
    BlurRadius,
    PosterizeLevels,
    SolarizeThreshold,
    EdgesLowThreshold,
    EmbossBias,
}

impl Control {
    /// Every ranged control, in pipeline order.
    pub const ALL: [Control; 9] = [
        Control::Hue,
        Control::Saturation,
        Control::Gamma,
        Control::Sharpen,
        Control::BlurRadius,
        Control::PosterizeLevels,
        Control::SolarizeThreshold,
        Control::EdgesLowThreshold,
        Control::EmbossBias,
    ];

    /// Inclusive `(min, max)` range accepted by the control's setter.
    pub fn range(self) -> (f64, f64) {
        match self {
            Control::Gamma => (0.0, 2.0),
            Control::Hue => (-0.5, 0.5),
            Control::Saturation => (0.0, 2.0),
            Control::Sharpen => (7.9, 9.9),
            Control::BlurRadius => (0.0, 10.0),
            Control::PosterizeLevels => (1.0, 6.0),
            Control::SolarizeThreshold => (0.0, 255.0),
            Control::EdgesLowThreshold => (0.0, 100.0),
            Control::EmbossBias => (99.0, 128.0),
        }
    }

    /// Value the control takes after a reset.
    pub fn default_value(self) -> f64 {
        match self {
            Control::Gamma => DEFAULT_GAMMA,
            Control::Hue => DEFAULT_HUE,
            Control::Saturation => DEFAULT_SATURATION,
            Control::Sharpen => DEFAULT_SHARPEN,
            Control::BlurRadius => DEFAULT_BLUR_RADIUS as f64,
            Control::PosterizeLevels => DEFAULT_POSTERIZE_LEVELS as f64,
            Control::SolarizeThreshold => DEFAULT_SOLARIZE_THRESHOLD as f64,
            Control::EdgesLowThreshold => DEFAULT_EDGES_LOW_THRESHOLD as f64,
            Control::EmbossBias => DEFAULT_EMBOSS_BIAS as f64,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Control::Gamma => "gamma",
            Control::Hue => "hue",
            Control::Saturation => "saturation",
            Control::Sharpen => "sharpen",
            Control::BlurRadius => "blur radius",
            Control::PosterizeLevels => "posterize levels",
            Control::SolarizeThreshold => "solarize threshold",
            Control::EdgesLowThreshold => "edges threshold",
            Control::EmbossBias => "emboss bias",
        }
    }

    fn check_real(self, value: f64) -> Result<f64, ValidationError> {
        let (min, max) = self.range();
        if !value.is_finite() || value < min || value > max {
            return Err(ValidationError::OutOfRange {
                control: self,
                value,
                min,
                max,
            });
        }
        Ok(value)
    }

    fn check_int(self, value: i32) -> Result<i32, ValidationError> {
        self.check_real(value as f64)?;
        Ok(value)
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Exact output size requested through the resize control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeTarget {
    pub width: u32,
    pub height: u32,
}

impl ResizeTarget {
    /// Parse `"<width>x<height>"`.
    ///
    /// Spaces are ignored. The input must contain exactly one `x` and both
    /// components must be positive integers whose product stays within
    /// [`MAX_RESIZE_PIXELS`].
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let malformed = || ValidationError::MalformedResize(input.to_string());

        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.matches('x').count() != 1 {
            return Err(malformed());
        }
        let (w, h) = compact.split_once('x').ok_or_else(malformed)?;

        let width: u32 = w.parse().map_err(|_| malformed())?;
        let height: u32 = h.parse().map_err(|_| malformed())?;
        if width == 0 || height == 0 {
            return Err(malformed());
        }

        Self { width, height }.check_area()
    }

    /// Number of output pixels.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    fn check_area(self) -> Result<Self, ValidationError> {
        if self.area() > MAX_RESIZE_PIXELS {
            return Err(ValidationError::ResizeTooLarge {
                width: self.width,
                height: self.height,
                max_pixels: MAX_RESIZE_PIXELS,
            });
        }
        Ok(self)
    }
}

impl fmt::Display for ResizeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Current value of every adjustment.
///
/// Fields are private so the edges/emboss invariant cannot be broken from
/// outside. Deserialized sets should be checked with [`ParameterSet::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    gamma: f64,
    hue: f64,
    saturation: f64,
    sharpen: f64,
    blur_radius: u32,
    posterize_levels: u8,
    solarize_threshold: u8,
    edges_enabled: bool,
    edges_low_threshold: u8,
    emboss_enabled: bool,
    emboss_bias: u8,
    flip_horizontal: bool,
    flip_vertical: bool,
    resize: Option<ResizeTarget>,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            gamma: DEFAULT_GAMMA,
            hue: DEFAULT_HUE,
            saturation: DEFAULT_SATURATION,
            sharpen: DEFAULT_SHARPEN,
            blur_radius: DEFAULT_BLUR_RADIUS,
            posterize_levels: DEFAULT_POSTERIZE_LEVELS,
            solarize_threshold: DEFAULT_SOLARIZE_THRESHOLD,
            edges_enabled: false,
            edges_low_threshold: DEFAULT_EDGES_LOW_THRESHOLD,
            emboss_enabled: false,
            emboss_bias: DEFAULT_EMBOSS_BIAS,
            flip_horizontal: false,
            flip_vertical: false,
            resize: None,
        }
    }
}

impl ParameterSet {
    /// Create a parameter set with every control at its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Re-check every invariant. Used for sets that did not come through
    /// the setters, such as deserialized ones.
    pub fn validate(&self) -> Result<(), ValidationError> {
        Control::Gamma.check_real(self.gamma)?;
        Control::Hue.check_real(self.hue)?;
        Control::Saturation.check_real(self.saturation)?;
        Control::Sharpen.check_real(self.sharpen)?;
        check_blur_radius(self.blur_radius as i32)?;
        Control::PosterizeLevels.check_int(self.posterize_levels as i32)?;
        Control::SolarizeThreshold.check_int(self.solarize_threshold as i32)?;
        Control::EdgesLowThreshold.check_int(self.edges_low_threshold as i32)?;
        Control::EmbossBias.check_int(self.emboss_bias as i32)?;
        if self.edges_enabled && self.emboss_enabled {
            return Err(ValidationError::ConflictingEffects);
        }
        if let Some(target) = self.resize {
            if target.width == 0 || target.height == 0 {
                return Err(ValidationError::MalformedResize(target.to_string()));
            }
            target.check_area()?;
        }
        Ok(())
    }

    // ===== Color =====

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn set_gamma(&mut self, value: f64) -> Result<(), ValidationError> {
        self.gamma = Control::Gamma.check_real(value)?;
        Ok(())
    }

    pub fn hue(&self) -> f64 {
        self.hue
    }

    pub fn set_hue(&mut self, value: f64) -> Result<(), ValidationError> {
        self.hue = Control::Hue.check_real(value)?;
        Ok(())
    }

    pub fn saturation(&self) -> f64 {
        self.saturation
    }

    pub fn set_saturation(&mut self, value: f64) -> Result<(), ValidationError> {
        self.saturation = Control::Saturation.check_real(value)?;
        Ok(())
    }

    // ===== Detail =====

    pub fn sharpen(&self) -> f64 {
        self.sharpen
    }

    pub fn set_sharpen(&mut self, value: f64) -> Result<(), ValidationError> {
        self.sharpen = Control::Sharpen.check_real(value)?;
        Ok(())
    }

    pub fn blur_radius(&self) -> u32 {
        self.blur_radius
    }

    /// Set the blur radius. Must lie in `[0, 10]` on a step of 2.
    pub fn set_blur_radius(&mut self, value: i32) -> Result<(), ValidationError> {
        self.blur_radius = check_blur_radius(value)? as u32;
        Ok(())
    }

    // ===== Tone =====

    pub fn posterize_levels(&self) -> u8 {
        self.posterize_levels
    }

    pub fn set_posterize_levels(&mut self, value: i32) -> Result<(), ValidationError> {
        self.posterize_levels = Control::PosterizeLevels.check_int(value)? as u8;
        Ok(())
    }

    pub fn solarize_threshold(&self) -> u8 {
        self.solarize_threshold
    }

    pub fn set_solarize_threshold(&mut self, value: i32) -> Result<(), ValidationError> {
        self.solarize_threshold = Control::SolarizeThreshold.check_int(value)? as u8;
        Ok(())
    }

    // ===== Edges / emboss =====

    pub fn edges_enabled(&self) -> bool {
        self.edges_enabled
    }

    /// Toggle edge detection. Enabling it disables emboss.
    pub fn set_edges_enabled(&mut self, enabled: bool) {
        self.edges_enabled = enabled;
        if enabled {
            self.emboss_enabled = false;
        }
    }

    pub fn edges_low_threshold(&self) -> u8 {
        self.edges_low_threshold
    }

    pub fn set_edges_low_threshold(&mut self, value: i32) -> Result<(), ValidationError> {
        self.edges_low_threshold = Control::EdgesLowThreshold.check_int(value)? as u8;
        Ok(())
    }

    pub fn emboss_enabled(&self) -> bool {
        self.emboss_enabled
    }

    /// Toggle emboss. Enabling it disables edge detection.
    pub fn set_emboss_enabled(&mut self, enabled: bool) {
        self.emboss_enabled = enabled;
        if enabled {
            self.edges_enabled = false;
        }
    }

    pub fn emboss_bias(&self) -> u8 {
        self.emboss_bias
    }

    pub fn set_emboss_bias(&mut self, value: i32) -> Result<(), ValidationError> {
        self.emboss_bias = Control::EmbossBias.check_int(value)? as u8;
        Ok(())
    }

    // ===== Geometry =====

    pub fn flip_horizontal(&self) -> bool {
        self.flip_horizontal
    }

    pub fn set_flip_horizontal(&mut self, enabled: bool) {
        self.flip_horizontal = enabled;
    }

    pub fn toggle_flip_horizontal(&mut self) -> bool {
        self.flip_horizontal = !self.flip_horizontal;
        self.flip_horizontal
    }

    pub fn flip_vertical(&self) -> bool {
        self.flip_vertical
    }

    pub fn set_flip_vertical(&mut self, enabled: bool) {
        self.flip_vertical = enabled;
    }

    pub fn toggle_flip_vertical(&mut self) -> bool {
        self.flip_vertical = !self.flip_vertical;
        self.flip_vertical
    }

    pub fn resize_enabled(&self) -> bool {
        self.resize.is_some()
    }

    pub fn resize_target(&self) -> Option<ResizeTarget> {
        self.resize
    }

    /// Enable resizing from a `"<width>x<height>"` string.
    ///
    /// A malformed string is rejected without touching any field.
    pub fn request_resize(&mut self, input: &str) -> Result<ResizeTarget, ValidationError> {
        let target = ResizeTarget::parse(input)?;
        self.resize = Some(target);
        Ok(target)
    }
}

fn check_blur_radius(value: i32) -> Result<i32, ValidationError> {
    Control::BlurRadius.check_int(value)?;
    if value % BLUR_RADIUS_STEP != 0 {
        return Err(ValidationError::OffStep {
            control: Control::BlurRadius,
            value,
            step: BLUR_RADIUS_STEP,
        });
    }
    Ok(value)
}
