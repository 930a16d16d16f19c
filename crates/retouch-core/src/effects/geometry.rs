//! Geometric effects: exact resize and mirroring.

use serde::{Deserialize, Serialize};

use crate::error::EffectError;
use crate::params::MAX_RESIZE_PIXELS;
use crate::raster::Image;

/// Filter type for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterType {
    /// Nearest neighbor interpolation (fastest, lowest quality).
    Nearest,
    /// Bilinear interpolation (fast, acceptable quality).
    #[default]
    Bilinear,
    /// Lanczos3 interpolation (slower, highest quality).
    Lanczos3,
}

impl FilterType {
    /// Convert to the image crate's FilterType.
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// Resize an image to exact dimensions, ignoring the aspect ratio.
///
/// # Errors
///
/// Returns `EffectError::InvalidParameter` for a zero target dimension or one
/// larger than [`MAX_RESIZE_PIXELS`], and `EffectError::Buffer` if the source
/// cannot be handed to the `image` crate.
pub fn resize_exact(
    image: &Image,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<Image, EffectError> {
    if width == 0 || height == 0 {
        return Err(EffectError::InvalidParameter(format!(
            "cannot resize to {}x{}",
            width, height
        )));
    }
    if width as u64 * height as u64 > MAX_RESIZE_PIXELS {
        return Err(EffectError::InvalidParameter(format!(
            "{}x{} exceeds {} pixels",
            width, height, MAX_RESIZE_PIXELS
        )));
    }

    // Fast path: if dimensions match, just clone
    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }
    if image.is_empty() {
        return Err(EffectError::InvalidParameter(
            "cannot resize an empty image".to_string(),
        ));
    }

    let rgb_image = image
        .to_rgb_image()
        .ok_or_else(|| EffectError::Buffer("resize input".to_string()))?;
    let resized = image::imageops::resize(&rgb_image, width, height, filter.to_image_filter());

    Ok(Image::from_rgb_image(resized))
}

/// Mirror the image left to right.
pub fn flip_horizontal(image: &Image) -> Result<Image, EffectError> {
    let rgb_image = image
        .to_rgb_image()
        .ok_or_else(|| EffectError::Buffer("flip input".to_string()))?;
    Ok(Image::from_rgb_image(image::imageops::flip_horizontal(&rgb_image)))
}

/// Mirror the image top to bottom.
pub fn flip_vertical(image: &Image) -> Result<Image, EffectError> {
    let rgb_image = image
        .to_rgb_image()
        .ok_or_else(|| EffectError::Buffer("flip input".to_string()))?;
    Ok(Image::from_rgb_image(image::imageops::flip_vertical(&rgb_image)))
}
