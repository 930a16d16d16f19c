//! Image rotation about an arbitrary pivot on a fixed canvas.
//!
//! The output has the same dimensions as the input. Corners that rotate out
//! of the canvas are clipped and areas that rotate in from outside are
//! painted with a fill color.
//!
//! # Algorithm
//!
//! The rotation uses inverse mapping: for each pixel in the output image,
//! we calculate which source position lands on it and interpolate there.
//! With pivot `(px, py)` and angle θ (positive = counter-clockwise on
//! screen, with y pointing down):
//! ```text
//! src_x =  (dst_x - px) * cos θ - (dst_y - py) * sin θ + px
//! src_y =  (dst_x - px) * sin θ + (dst_y - py) * cos θ + py
//! ```

use serde::{Deserialize, Serialize};

use crate::raster::Image;

/// Tolerance for sample positions that land a hair outside the canvas.
const EDGE_EPSILON: f64 = 1e-6;

/// Interpolation filter for rotation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationFilter {
    /// Fast bilinear interpolation - good for interactive rendering.
    #[default]
    Bilinear,
    /// High-quality Lanczos3 interpolation.
    Lanczos3,
}

/// Rotate `image` by `angle_degrees` about `pivot`.
///
/// `pivot` is in pixel coordinates; `None` rotates about the image center
/// `(width / 2, height / 2)`. Angles that are exact multiples of 360 return
/// a copy of the input.
pub fn rotate_about(
    image: &Image,
    angle_degrees: f64,
    pivot: Option<(f64, f64)>,
    filter: InterpolationFilter,
    fill: [u8; 3],
) -> Image {
    if angle_degrees % 360.0 == 0.0 || image.is_empty() {
        return image.clone();
    }

    let (w, h) = image.dimensions();
    let (px, py) = pivot.unwrap_or((w as f64 / 2.0, h as f64 / 2.0));

    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos();
    let sin = angle_rad.sin();

    let mut output = Vec::with_capacity(image.byte_size());

    for dst_y in 0..h {
        for dst_x in 0..w {
            let dx = dst_x as f64 - px;
            let dy = dst_y as f64 - py;

            let src_x = dx * cos - dy * sin + px;
            let src_y = dx * sin + dy * cos + py;

            let pixel = match filter {
                InterpolationFilter::Bilinear => sample_bilinear(image, src_x, src_y, fill),
                InterpolationFilter::Lanczos3 => sample_lanczos3(image, src_x, src_y, fill),
            };
            output.extend_from_slice(&pixel);
        }
    }

    Image::new(w, h, output)
}

/// Get a pixel as [f64; 3] from an image at the given coordinates.
#[inline]
fn get_pixel_f64(image: &Image, px: usize, py: usize) -> [f64; 3] {
    let idx = (py * image.width() as usize + px) * 3;
    let pixels = image.pixels();
    [
        pixels[idx] as f64,
        pixels[idx + 1] as f64,
        pixels[idx + 2] as f64,
    ]
}

/// Sample a pixel using bilinear interpolation.
///
/// Positions outside the canvas return `fill`. Along the last row and
/// column the missing neighbor is replaced by the edge pixel.
fn sample_bilinear(image: &Image, x: f64, y: f64, fill: [u8; 3]) -> [u8; 3] {
    let max_x = (image.width() - 1) as f64;
    let max_y = (image.height() - 1) as f64;

    if x < -EDGE_EPSILON || x > max_x + EDGE_EPSILON || y < -EDGE_EPSILON || y > max_y + EDGE_EPSILON
    {
        return fill;
    }
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(image.width() as usize - 1);
    let y1 = (y0 + 1).min(image.height() as usize - 1);

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x1, y0);
    let p01 = get_pixel_f64(image, x0, y1);
    let p11 = get_pixel_f64(image, x1, y1);

    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    result
}

/// Sample a pixel using Lanczos3 interpolation.
///
/// Lanczos3 considers a 6x6 neighborhood of pixels; near the border it
/// falls back to bilinear sampling.
fn sample_lanczos3(image: &Image, x: f64, y: f64, fill: [u8; 3]) -> [u8; 3] {
    let (w, h) = (image.width() as i64, image.height() as i64);

    if x < 2.0 || x >= (w - 3) as f64 || y < 2.0 || y >= (h - 3) as f64 {
        return sample_bilinear(image, x, y, fill);
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 3];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;

            let weight = lanczos_weight(x - px as f64, 3.0) * lanczos_weight(y - py as f64, 3.0);
            let pixel = get_pixel_f64(image, px as usize, py as usize);
            sum[0] += pixel[0] * weight;
            sum[1] += pixel[1] * weight;
            sum[2] += pixel[2] * weight;
            weight_sum += weight;
        }
    }

    let mut result = [0u8; 3];
    if weight_sum > 0.0 {
        for i in 0..3 {
            result[i] = (sum[i] / weight_sum).clamp(0.0, 255.0).round() as u8;
        }
    }

    result
}

/// Lanczos kernel weight: `sinc(x) * sinc(x / a)` for `|x| < a`, else 0.
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;
    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: [u8; 3] = [0, 0, 0];

    /// Create a simple test image with a gradient pattern.
    fn test_image(width: u32, height: u32) -> Image {
        Image::from_fn(width, height, |x, y| {
            let v = ((x + y) * 8) as u8;
            [v, v, v]
        })
    }

    fn numbered(width: u32, height: u32) -> Image {
        Image::from_fn(width, height, |x, y| [x as u8 * 10, y as u8 * 10, 0])
    }

    #[test]
    fn test_full_turns_are_copies() {
        let img = test_image(20, 10);
        for angle in [0.0, 360.0, -720.0] {
            let out = rotate_about(&img, angle, None, InterpolationFilter::Bilinear, BLACK);
            assert_eq!(out, img);
        }
    }

    #[test]
    fn test_canvas_size_is_preserved() {
        let img = test_image(40, 20);
        let out = rotate_about(&img, 37.0, None, InterpolationFilter::Bilinear, BLACK);
        assert_eq!(out.dimensions(), (40, 20));
    }

    #[test]
    fn test_half_turn_about_pixel_center_is_point_reflection() {
        let img = numbered(5, 5);
        let out = rotate_about(&img, 180.0, Some((2.0, 2.0)), InterpolationFilter::Bilinear, BLACK);
        for y in 0..5 {
            for x in 0..5 {
                assert_eq!(out.pixel(x, y), img.pixel(4 - x, 4 - y));
            }
        }
    }

    #[test]
    fn test_quarter_turn_is_counter_clockwise() {
        // A marker to the right of the pivot ends up above it.
        let img = Image::from_fn(5, 5, |x, y| if x == 4 && y == 2 { [255; 3] } else { BLACK });
        let out = rotate_about(&img, 90.0, Some((2.0, 2.0)), InterpolationFilter::Bilinear, BLACK);
        assert_eq!(out.pixel(2, 0), [255, 255, 255]);
        assert_eq!(out.pixel(4, 2), BLACK);
    }

    #[test]
    fn test_corner_pivot_fills_uncovered_area() {
        let img = Image::from_fn(6, 6, |_, _| [200, 200, 200]);
        let fill = [1, 2, 3];
        let out = rotate_about(&img, 180.0, Some((0.0, 0.0)), InterpolationFilter::Bilinear, fill);
        // Everything rotates into negative coordinates except the pivot itself.
        assert_eq!(out.pixel(0, 0), [200, 200, 200]);
        assert_eq!(out.pixel(3, 3), fill);
        assert_eq!(out.pixel(5, 0), fill);
    }

    #[test]
    fn test_rotation_is_deterministic() {
        let img = test_image(16, 16);
        let once = rotate_about(&img, 45.0, None, InterpolationFilter::Bilinear, BLACK);
        assert_eq!(once, rotate_about(&img, 45.0, None, InterpolationFilter::Bilinear, BLACK));
        assert_ne!(once, img);
    }

    #[test]
    fn test_bilinear_vs_lanczos_dimensions() {
        let img = test_image(50, 50);
        let bilinear = rotate_about(&img, 15.0, None, InterpolationFilter::Bilinear, BLACK);
        let lanczos = rotate_about(&img, 15.0, None, InterpolationFilter::Lanczos3, BLACK);
        assert_eq!(bilinear.dimensions(), lanczos.dimensions());
    }

    #[test]
    fn test_single_pixel_image() {
        let img = Image::new(1, 1, vec![128, 128, 128]);
        let out = rotate_about(&img, 45.0, None, InterpolationFilter::Lanczos3, BLACK);
        assert_eq!(out.dimensions(), (1, 1));
    }

    #[test]
    fn test_thin_images_do_not_panic() {
        for (w, h) in [(100, 1), (1, 100), (2, 3)] {
            let img = test_image(w, h);
            let out = rotate_about(&img, 30.0, None, InterpolationFilter::Lanczos3, BLACK);
            assert_eq!(out.dimensions(), (w, h));
        }
    }

    #[test]
    fn test_lanczos_weight_at_zero() {
        let w = lanczos_weight(0.0, 3.0);
        assert!((w - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lanczos_weight_at_boundary() {
        let w = lanczos_weight(3.0, 3.0);
        assert!(w.abs() < f64::EPSILON);
    }

    #[test]
    fn test_lanczos_weight_symmetry() {
        let w1 = lanczos_weight(1.5, 3.0);
        let w2 = lanczos_weight(-1.5, 3.0);
        assert!((w1 - w2).abs() < 1e-10);
    }
}
