//! Canny edge map.

use image::GrayImage;

use crate::error::EffectError;
use crate::raster::Image;

/// Replace the image with a binary Canny edge map.
///
/// The image is reduced to luma first. Gradients above `high` start an edge;
/// gradients above `low` extend edges they touch. Edge pixels are white on a
/// black background and the result is replicated across all three channels.
///
/// Gradient magnitude is measured on the single luma channel with an L2
/// norm. Detectors that take the strongest color channel with an L1 norm
/// (OpenCV's default on color input) find more edges at the same
/// thresholds, so threshold values do not carry over between the two.
pub fn edge_map(image: &Image, low: f32, high: f32) -> Result<Image, EffectError> {
    if low > high {
        return Err(EffectError::InvalidParameter(format!(
            "edge low threshold {} exceeds high threshold {}",
            low, high
        )));
    }
    if image.is_empty() {
        return Ok(image.clone());
    }

    let rgb = image
        .to_rgb_image()
        .ok_or_else(|| EffectError::Buffer("edge map input".to_string()))?;
    let gray: GrayImage = image::imageops::grayscale(&rgb);
    let edges = imageproc::edges::canny(&gray, low, high);

    let mut pixels = Vec::with_capacity(image.byte_size());
    for &v in edges.as_raw() {
        pixels.extend_from_slice(&[v, v, v]);
    }
    Ok(Image::new(image.width(), image.height(), pixels))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(width: u32, height: u32) -> Image {
        Image::from_fn(width, height, |x, _| {
            if x < width / 2 {
                [0, 0, 0]
            } else {
                [255, 255, 255]
            }
        })
    }

    #[test]
    fn test_flat_image_has_no_edges() {
        let img = Image::from_fn(16, 16, |_, _| [120, 40, 200]);
        let out = edge_map(&img, 50.0, 100.0).unwrap();
        assert!(out.pixels().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_step_produces_edge() {
        let img = split(32, 16);
        let out = edge_map(&img, 50.0, 100.0).unwrap();
        assert_eq!(out.dimensions(), (32, 16));
        assert!(out.pixels().iter().any(|&v| v == 255));
        // The left margin is far from the step.
        assert_eq!(out.pixel(2, 8), [0, 0, 0]);
    }

    #[test]
    fn test_output_is_binary_gray() {
        let out = edge_map(&split(20, 20), 10.0, 20.0).unwrap();
        for chunk in out.pixels().chunks_exact(3) {
            assert!(chunk[0] == 0 || chunk[0] == 255);
            assert_eq!(chunk[0], chunk[1]);
            assert_eq!(chunk[1], chunk[2]);
        }
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        assert!(edge_map(&split(8, 8), 100.0, 50.0).is_err());
    }
}
