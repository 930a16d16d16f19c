//! Histogram computation for the displayed image.
//!
//! Produces 256-bin red, green, blue and luminance histograms covering the
//! value range `[0, 256)`. The session only offers a histogram while edge
//! detection is off, since the edge map is effectively two-valued.

use crate::raster::Image;

/// ITU-R BT.709 luminance coefficients.
const LUMINANCE_R: f32 = 0.2126;
const LUMINANCE_G: f32 = 0.7152;
const LUMINANCE_B: f32 = 0.0722;

/// Histogram data for an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    /// Red channel histogram (256 bins)
    pub red: [u32; 256],
    /// Green channel histogram (256 bins)
    pub green: [u32; 256],
    /// Blue channel histogram (256 bins)
    pub blue: [u32; 256],
    /// Luminance histogram (256 bins)
    pub luminance: [u32; 256],
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            red: [0; 256],
            green: [0; 256],
            blue: [0; 256],
            luminance: [0; 256],
        }
    }
}

impl Histogram {
    /// Create a new empty histogram
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the maximum value across the RGB channels for normalization
    pub fn max_value(&self) -> u32 {
        let max_r = *self.red.iter().max().unwrap_or(&0);
        let max_g = *self.green.iter().max().unwrap_or(&0);
        let max_b = *self.blue.iter().max().unwrap_or(&0);
        max_r.max(max_g).max(max_b)
    }

    /// Total number of pixels counted.
    pub fn total(&self) -> u64 {
        self.red.iter().map(|&c| c as u64).sum()
    }

    /// Check for highlight clipping (values at 255)
    pub fn has_highlight_clipping(&self) -> bool {
        self.red[255] > 0 || self.green[255] > 0 || self.blue[255] > 0
    }

    /// Check for shadow clipping (values at 0)
    pub fn has_shadow_clipping(&self) -> bool {
        self.red[0] > 0 || self.green[0] > 0 || self.blue[0] > 0
    }
}

/// Compute RGB and luminance histograms of an image in a single pass.
pub fn compute_histogram(image: &Image) -> Histogram {
    let mut hist = Histogram::new();

    for chunk in image.pixels().chunks_exact(3) {
        hist.red[chunk[0] as usize] += 1;
        hist.green[chunk[1] as usize] += 1;
        hist.blue[chunk[2] as usize] += 1;

        let lum = calculate_luminance_u8(chunk[0], chunk[1], chunk[2]);
        hist.luminance[lum as usize] += 1;
    }

    hist
}

#[inline]
fn calculate_luminance_u8(r: u8, g: u8, b: u8) -> u8 {
    let lum = LUMINANCE_R * r as f32 + LUMINANCE_G * g as f32 + LUMINANCE_B * b as f32;
    lum.clamp(0.0, 255.0).round() as u8
}
