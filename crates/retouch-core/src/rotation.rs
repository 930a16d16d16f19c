//! Cumulative rotation with a selectable anchor.
//!
//! The state is either idle (angle 0) or rotated (angle strictly inside
//! `(-360, 360)` and non-zero). Increments accumulate; once the running
//! total leaves `[-360, 360]` it is folded back with a truncating modulo, so
//! the sign of the angle is preserved.
//!
//! The rotated view is always rendered from the composed image, never from
//! a previous rotated view.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::EngineConfig;
use crate::effects::rotate_about;
use crate::error::ValidationError;
use crate::raster::Image;

const FULL_TURN: f64 = 360.0;

/// Pivot used when rendering a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Anchor {
    #[default]
    Center,
    TopLeft,
    TopMiddle,
    TopRight,
    MiddleLeft,
    MiddleRight,
    BottomLeft,
    BottomMiddle,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::Center,
        Anchor::TopLeft,
        Anchor::TopMiddle,
        Anchor::TopRight,
        Anchor::MiddleLeft,
        Anchor::MiddleRight,
        Anchor::BottomLeft,
        Anchor::BottomMiddle,
        Anchor::BottomRight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Anchor::Center => "Center",
            Anchor::TopLeft => "TopLeft",
            Anchor::TopMiddle => "TopMiddle",
            Anchor::TopRight => "TopRight",
            Anchor::MiddleLeft => "MiddleLeft",
            Anchor::MiddleRight => "MiddleRight",
            Anchor::BottomLeft => "BottomLeft",
            Anchor::BottomMiddle => "BottomMiddle",
            Anchor::BottomRight => "BottomRight",
        }
    }

    /// Pixel coordinates of the pivot for an image of the given size.
    ///
    /// `Center` returns `None`, leaving the choice of center to the rotation
    /// routine. Midpoints use integer division.
    pub fn pivot(self, width: u32, height: u32) -> Option<(f64, f64)> {
        let (w, h) = (width, height);
        let (x, y) = match self {
            Anchor::Center => return None,
            Anchor::TopLeft => (0, 0),
            Anchor::TopMiddle => (w / 2, 0),
            Anchor::TopRight => (w, 0),
            Anchor::MiddleLeft => (0, h / 2),
            Anchor::MiddleRight => (w, h / 2),
            Anchor::BottomLeft => (0, h),
            Anchor::BottomMiddle => (w / 2, h),
            Anchor::BottomRight => (w, h),
        };
        Some((x as f64, y as f64))
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when an anchor name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown anchor {0:?}")]
pub struct UnknownAnchor(pub String);

impl FromStr for Anchor {
    type Err = UnknownAnchor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Anchor::ALL
            .into_iter()
            .find(|anchor| anchor.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownAnchor(s.to_string()))
    }
}

/// Parse a rotation increment in degrees. An empty string means 0.
pub fn parse_increment(input: &str) -> Result<f64, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    match trimmed.parse::<f64>() {
        Ok(delta) if delta.is_finite() => Ok(delta),
        _ => Err(ValidationError::MalformedAngle(input.to_string())),
    }
}

/// Cumulative rotation angle and anchor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RotationState {
    angle: f64,
    anchor: Anchor,
}

impl RotationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cumulative angle in degrees.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn set_anchor(&mut self, anchor: Anchor) {
        self.anchor = anchor;
    }

    /// True while a non-zero rotation is in effect.
    pub fn is_active(&self) -> bool {
        self.angle != 0.0
    }

    /// Back to idle. The anchor is kept.
    pub fn reset(&mut self) {
        self.angle = 0.0;
    }

    /// Parse `input` and apply it as an increment.
    ///
    /// A malformed increment leaves the state untouched. Returns whether the
    /// state is rotated afterwards.
    pub fn apply_increment(&mut self, input: &str) -> Result<bool, ValidationError> {
        let delta = parse_increment(input)?;
        Ok(self.rotate_by(delta))
    }

    /// Add `delta` degrees to the cumulative angle.
    ///
    /// A zero increment, or any whole number of turns, resets to idle.
    /// Returns whether the state is rotated afterwards.
    pub fn rotate_by(&mut self, delta: f64) -> bool {
        if delta == 0.0 || delta % FULL_TURN == 0.0 {
            self.angle = 0.0;
        } else {
            self.angle += delta;
            if self.angle.abs() > FULL_TURN {
                self.angle %= FULL_TURN;
            }
            if self.angle % FULL_TURN == 0.0 {
                self.angle = 0.0;
            }
        }
        debug!(delta, angle = self.angle, "rotation updated");
        self.is_active()
    }

    /// Rotate `composed` by the current angle about the current anchor.
    ///
    /// Edge and corner anchors are resolved against `anchor_size`, the size
    /// of the base image, even when `composed` has been resized. `Center`
    /// always pivots on the middle of `composed`.
    pub fn render(
        &self,
        composed: &Image,
        anchor_size: (u32, u32),
        config: &EngineConfig,
    ) -> Image {
        let pivot = self.anchor.pivot(anchor_size.0, anchor_size.1);
        rotate_about(
            composed,
            self.angle,
            pivot,
            config.rotation_filter,
            config.fill,
        )
    }
}
