//! Per-channel tone mapping: posterize and solarize.

use crate::error::EffectError;
use crate::raster::Image;

/// Quantize each channel by keeping only its `bits` most significant bits.
///
/// `bits` must be in `1..=8`; eight bits leaves the image unchanged and one
/// bit leaves two levels per channel.
pub fn posterize(image: &Image, bits: u8) -> Result<Image, EffectError> {
    if !(1..=8).contains(&bits) {
        return Err(EffectError::InvalidParameter(format!(
            "posterize needs 1 to 8 bits, got {}",
            bits
        )));
    }
    let mask = !((1u16 << (8 - bits)) - 1) as u8;
    Ok(image.map_channels(|c| c & mask))
}

/// Invert every channel value strictly above `threshold`.
pub fn solarize(image: &Image, threshold: u8) -> Image {
    image.map_channels(|c| if c > threshold { 255 - c } else { c })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Image {
        Image::from_fn(256, 1, |x, _| [x as u8, 255 - x as u8, 128])
    }

    #[test]
    fn test_posterize_eight_bits_identity() {
        let img = ramp();
        assert_eq!(posterize(&img, 8).unwrap(), img);
    }

    #[test]
    fn test_posterize_one_bit_two_levels() {
        let out = posterize(&ramp(), 1).unwrap();
        let mut levels: Vec<u8> = out.pixels().to_vec();
        levels.sort_unstable();
        levels.dedup();
        assert_eq!(levels, vec![0, 128]);
    }

    #[test]
    fn test_posterize_masks_low_bits() {
        let img = Image::from_fn(1, 1, |_, _| [0b1011_0111, 255, 3]);
        let out = posterize(&img, 3).unwrap();
        assert_eq!(out.pixel(0, 0), [0b1010_0000, 0b1110_0000, 0]);
    }

    #[test]
    fn test_posterize_rejects_zero_bits() {
        assert!(matches!(
            posterize(&ramp(), 0),
            Err(EffectError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_solarize_threshold_255_identity() {
        let img = ramp();
        assert_eq!(solarize(&img, 255), img);
    }

    #[test]
    fn test_solarize_inverts_above_threshold() {
        let img = Image::from_fn(1, 1, |_, _| [100, 101, 250]);
        assert_eq!(solarize(&img, 100).pixel(0, 0), [100, 154, 5]);
    }

    #[test]
    fn test_solarize_zero_inverts_all_but_black() {
        let img = Image::from_fn(1, 1, |_, _| [0, 1, 255]);
        assert_eq!(solarize(&img, 0).pixel(0, 0), [0, 254, 0]);
    }
}
