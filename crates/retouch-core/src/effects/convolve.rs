//! Neighborhood filters: 3x3 correlation (sharpen, emboss) and Gaussian blur.
//!
//! Borders are handled by mirroring without repeating the edge pixel
//! (`dcb|abcd|cba`), so a kernel of radius `r` needs at least `r + 1` pixels
//! on each axis. Smaller images are rejected with
//! [`EffectError::KernelTooLarge`].
//!
//! Kernels are applied as a correlation (not flipped), accumulated in `f32`
//! and rounded with saturation back to 8 bits.

use crate::error::EffectError;
use crate::raster::Image;

/// Standard deviation of the blur kernel, independent of its size.
pub const GAUSSIAN_SIGMA: f64 = 4.0;

/// Sharpen with a 3x3 kernel whose center weight is `strength` and whose
/// eight neighbors are `-1`.
///
/// Because the weights sum to `strength - 8`, values below 9 also darken the
/// image and values above 9 brighten it.
pub fn sharpen(image: &Image, strength: f64) -> Result<Image, EffectError> {
    let s = strength as f32;
    #[rustfmt::skip]
    let kernel = [
        -1.0, -1.0, -1.0,
        -1.0,    s, -1.0,
        -1.0, -1.0, -1.0,
    ];
    correlate3x3(image, &kernel, saturate)
}

/// Emboss with a vertical-gradient kernel, then lift every channel by `bias`.
///
/// The gradient is saturated to `[0, 255]` before the bias is added. The
/// addition wraps modulo 256, so strong gradients fold back to dark values.
pub fn emboss(image: &Image, bias: u8) -> Result<Image, EffectError> {
    #[rustfmt::skip]
    let kernel = [
        0.0,  1.0, 0.0,
        0.0,  0.0, 0.0,
        0.0, -1.0, 0.0,
    ];
    correlate3x3(image, &kernel, |v| saturate(v).wrapping_add(bias))
}

/// Gaussian blur with a square kernel of `kernel_size` pixels per side.
///
/// The kernel size must be odd. The standard deviation is always
/// [`GAUSSIAN_SIGMA`], so the size only controls how far the kernel reaches.
pub fn gaussian_blur(image: &Image, kernel_size: u32) -> Result<Image, EffectError> {
    if kernel_size % 2 == 0 {
        return Err(EffectError::EvenKernel(kernel_size));
    }
    if kernel_size == 1 {
        return Ok(image.clone());
    }
    check_fits(image, kernel_size)?;

    let kernel = gaussian_kernel(kernel_size);
    let tmp = horizontal_pass(image, &kernel);
    let out = vertical_pass(&tmp, image.width() as usize, image.height() as usize, &kernel);

    Ok(Image::new(
        image.width(),
        image.height(),
        out.into_iter().map(saturate).collect(),
    ))
}

/// Build a normalized 1-D Gaussian kernel of the given odd size.
pub(crate) fn gaussian_kernel(size: u32) -> Vec<f32> {
    let radius = (size / 2) as usize;
    let denom = 2.0 * GAUSSIAN_SIGMA * GAUSSIAN_SIGMA;
    let weights: Vec<f64> = (0..size as i64)
        .map(|i| {
            let x = (i - radius as i64) as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    weights.into_iter().map(|w| (w / sum) as f32).collect()
}

fn check_fits(image: &Image, kernel_size: u32) -> Result<(), EffectError> {
    let radius = kernel_size / 2;
    if image.width() <= radius || image.height() <= radius {
        return Err(EffectError::KernelTooLarge {
            kernel: kernel_size,
            width: image.width(),
            height: image.height(),
        });
    }
    Ok(())
}

/// Mirror an out-of-range index back inside `[0, n)` without repeating the
/// border sample. Only valid for overshoots smaller than `n`.
#[inline]
fn reflect_101(i: i64, n: i64) -> usize {
    if i < 0 {
        (-i) as usize
    } else if i >= n {
        (2 * (n - 1) - i) as usize
    } else {
        i as usize
    }
}

#[inline]
fn saturate(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

fn correlate3x3(
    image: &Image,
    kernel: &[f32; 9],
    store: impl Fn(f32) -> u8,
) -> Result<Image, EffectError> {
    check_fits(image, 3)?;

    let (w, h) = (image.width() as i64, image.height() as i64);
    let src = image.pixels();
    let mut out = Vec::with_capacity(src.len());

    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for ky in 0..3i64 {
                let sy = reflect_101(y + ky - 1, h);
                for kx in 0..3i64 {
                    let weight = kernel[(ky * 3 + kx) as usize];
                    if weight == 0.0 {
                        continue;
                    }
                    let sx = reflect_101(x + kx - 1, w);
                    let idx = (sy * w as usize + sx) * 3;
                    acc[0] += src[idx] as f32 * weight;
                    acc[1] += src[idx + 1] as f32 * weight;
                    acc[2] += src[idx + 2] as f32 * weight;
                }
            }
            out.extend(acc.iter().map(|&v| store(v)));
        }
    }

    Ok(Image::new(image.width(), image.height(), out))
}

fn horizontal_pass(image: &Image, kernel: &[f32]) -> Vec<f32> {
    let radius = (kernel.len() / 2) as i64;
    let (w, h) = (image.width() as i64, image.height() as i64);
    let src = image.pixels();
    let mut out = Vec::with_capacity(src.len());

    for y in 0..h {
        let row = (y * w) as usize;
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for (k, &weight) in kernel.iter().enumerate() {
                let sx = reflect_101(x + k as i64 - radius, w);
                let idx = (row + sx) * 3;
                acc[0] += src[idx] as f32 * weight;
                acc[1] += src[idx + 1] as f32 * weight;
                acc[2] += src[idx + 2] as f32 * weight;
            }
            out.extend_from_slice(&acc);
        }
    }
    out
}

fn vertical_pass(src: &[f32], width: usize, height: usize, kernel: &[f32]) -> Vec<f32> {
    let radius = (kernel.len() / 2) as i64;
    let h = height as i64;
    let mut out = Vec::with_capacity(src.len());

    for y in 0..h {
        for x in 0..width {
            let mut acc = [0.0f32; 3];
            for (k, &weight) in kernel.iter().enumerate() {
                let sy = reflect_101(y + k as i64 - radius, h);
                let idx = (sy * width + x) * 3;
                acc[0] += src[idx] * weight;
                acc[1] += src[idx + 1] * weight;
                acc[2] += src[idx + 2] * weight;
            }
            out.extend_from_slice(&acc);
        }
    }
    out
}
