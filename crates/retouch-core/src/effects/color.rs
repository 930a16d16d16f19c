//! Color adjustments: hue shift, saturation and gamma.
//!
//! Hue and saturation work in HSV space on normalized channels. Gamma is a
//! 256-entry lookup table. Each function returns an unchanged copy when its
//! parameter is at the neutral value, so the default pipeline is exact.

use crate::raster::Image;

/// Shift the hue of every pixel by `shift` turns (`0.5` = 180°).
///
/// Hue wraps around, so `-0.5` and `0.5` give the same result.
pub fn adjust_hue(image: &Image, shift: f64) -> Image {
    if shift == 0.0 {
        return image.clone();
    }
    let shift = shift as f32;
    image.map_pixels(|[r, g, b]| {
        let (h, s, v) = rgb_to_hsv(r, g, b);
        hsv_to_rgb((h + shift).rem_euclid(1.0), s, v)
    })
}

/// Scale the saturation of every pixel by `factor`.
///
/// `0.0` produces grayscale, `1.0` leaves the image unchanged and values
/// above one intensify colors (clamped at full saturation).
pub fn adjust_saturation(image: &Image, factor: f64) -> Image {
    if factor == 1.0 {
        return image.clone();
    }
    let factor = factor as f32;
    image.map_pixels(|[r, g, b]| {
        let (h, s, v) = rgb_to_hsv(r, g, b);
        hsv_to_rgb(h, (s * factor).clamp(0.0, 1.0), v)
    })
}

/// Apply the power curve `out = 255 * (in / 255) ^ gamma`.
pub fn adjust_gamma(image: &Image, gamma: f64) -> Image {
    if gamma == 1.0 {
        return image.clone();
    }
    let lut = gamma_lut(gamma);
    image.map_channels(|c| lut[c as usize])
}

fn gamma_lut(gamma: f64) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        let v = (i as f64 / 255.0).powf(gamma) * 255.0;
        *entry = v.clamp(0.0, 255.0).round() as u8;
    }
    lut
}

/// Convert 8-bit RGB to HSV with every component in `[0, 1]`.
#[inline]
fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = max;
    let s = if max > 0.0 { delta / max } else { 0.0 };

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        ((g - b) / delta).rem_euclid(6.0) / 6.0
    } else if max == g {
        ((b - r) / delta + 2.0) / 6.0
    } else {
        ((r - g) / delta + 4.0) / 6.0
    };

    (h, s, v)
}

/// Convert HSV (components in `[0, 1]`) back to 8-bit RGB.
#[inline]
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [u8; 3] {
    let h6 = (h * 6.0).rem_euclid(6.0);
    let sector = h6.floor();
    let f = h6 - sector;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector as u8 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    [to_u8(r), to_u8(g), to_u8(b)]
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swatch() -> Image {
        Image::from_fn(4, 2, |x, y| match (x, y) {
            (0, 0) => [255, 0, 0],
            (1, 0) => [0, 255, 0],
            (2, 0) => [0, 0, 255],
            (3, 0) => [128, 128, 128],
            (0, 1) => [200, 100, 50],
            (1, 1) => [0, 0, 0],
            (2, 1) => [255, 255, 255],
            _ => [30, 60, 90],
        })
    }

    // ===== Identity Tests =====

    #[test]
    fn test_neutral_values_are_identity() {
        let img = swatch();
        assert_eq!(adjust_hue(&img, 0.0), img);
        assert_eq!(adjust_saturation(&img, 1.0), img);
        assert_eq!(adjust_gamma(&img, 1.0), img);
    }

    #[test]
    fn test_hsv_round_trip_primaries() {
        for rgb in [[255, 0, 0], [0, 255, 0], [0, 0, 255], [200, 100, 50], [7, 7, 7]] {
            let (h, s, v) = rgb_to_hsv(rgb[0], rgb[1], rgb[2]);
            assert_eq!(hsv_to_rgb(h, s, v), rgb);
        }
    }

    // ===== Hue =====

    #[test]
    fn test_hue_third_turn_cycles_primaries() {
        let img = swatch();
        let shifted = adjust_hue(&img, 1.0 / 3.0);
        assert_eq!(shifted.pixel(0, 0), [0, 255, 0]);
        assert_eq!(shifted.pixel(1, 0), [0, 0, 255]);
        assert_eq!(shifted.pixel(2, 0), [255, 0, 0]);
    }

    #[test]
    fn test_hue_leaves_grays() {
        let img = swatch();
        let shifted = adjust_hue(&img, 0.25);
        assert_eq!(shifted.pixel(3, 0), [128, 128, 128]);
        assert_eq!(shifted.pixel(1, 1), [0, 0, 0]);
        assert_eq!(shifted.pixel(2, 1), [255, 255, 255]);
    }

    #[test]
    fn test_hue_half_turn_gives_complement() {
        let img = swatch();
        assert_eq!(adjust_hue(&img, 0.5).pixel(0, 0), [0, 255, 255]);
        assert_eq!(adjust_hue(&img, -0.5).pixel(0, 0), [0, 255, 255]);
    }

    // ===== Saturation =====

    #[test]
    fn test_zero_saturation_is_gray() {
        let img = swatch();
        let gray = adjust_saturation(&img, 0.0);
        for chunk in gray.pixels().chunks_exact(3) {
            assert_eq!(chunk[0], chunk[1]);
            assert_eq!(chunk[1], chunk[2]);
        }
    }

    #[test]
    fn test_saturation_boost_increases_spread() {
        let img = Image::from_fn(1, 1, |_, _| [200, 150, 120]);
        let boosted = adjust_saturation(&img, 1.5);
        let [r, _, b] = boosted.pixel(0, 0);
        assert!(r as i32 - b as i32 > 80);
    }

    // ===== Gamma =====

    #[test]
    fn test_gamma_keeps_endpoints() {
        let img = swatch();
        for gamma in [0.5, 1.5, 2.0] {
            let out = adjust_gamma(&img, gamma);
            assert_eq!(out.pixel(1, 1), [0, 0, 0]);
            assert_eq!(out.pixel(2, 1), [255, 255, 255]);
        }
    }

    #[test]
    fn test_gamma_direction() {
        let img = Image::from_fn(1, 1, |_, _| [128, 128, 128]);
        assert!(adjust_gamma(&img, 0.5).pixel(0, 0)[0] > 128);
        assert!(adjust_gamma(&img, 2.0).pixel(0, 0)[0] < 128);
    }

    #[test]
    fn test_gamma_zero_saturates() {
        let img = Image::from_fn(1, 1, |_, _| [0, 10, 200]);
        assert_eq!(adjust_gamma(&img, 0.0).pixel(0, 0), [255, 255, 255]);
    }
}
