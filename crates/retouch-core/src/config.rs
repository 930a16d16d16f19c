//! Engine configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::effects::geometry::FilterType;
use crate::effects::rotate::InterpolationFilter;

/// Settings that shape rendering but are not user adjustments.
///
/// Missing fields take their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Interpolation used when rendering the rotated view.
    pub rotation_filter: InterpolationFilter,
    /// Filter used by the resize step.
    pub resize_filter: FilterType,
    /// Color painted where rotation uncovers the canvas.
    pub fill: [u8; 3],
    /// Directory holding the built-in sample image files.
    pub samples_dir: Option<PathBuf>,
}

impl EngineConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory holding the sample image files.
    pub fn with_samples_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.samples_dir = Some(dir.into());
        self
    }
}
