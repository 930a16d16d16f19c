//! Base-image provider.
//!
//! A session obtains its base image from an [`ImageProvider`], either by
//! naming one of the built-in samples or by giving a file path. The default
//! [`FileProvider`] reads from disk and corrects EXIF orientation.

use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::EngineConfig;
use crate::error::ImageLoadError;
use crate::raster::Image;

/// Extensions tried, in order, when resolving a sample file.
const SAMPLE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// The built-in sample images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SampleImage {
    Mountain,
    Sunrise,
    #[default]
    Island,
    Puppies,
    BlackCat,
    GoldFish,
    Bear,
    Camera,
    Guitar,
}

impl SampleImage {
    pub const ALL: [SampleImage; 9] = [
        SampleImage::Mountain,
        SampleImage::Sunrise,
        SampleImage::Island,
        SampleImage::Puppies,
        SampleImage::BlackCat,
        SampleImage::GoldFish,
        SampleImage::Bear,
        SampleImage::Camera,
        SampleImage::Guitar,
    ];

    /// Display name, as shown in the sample picker.
    pub fn name(self) -> &'static str {
        match self {
            SampleImage::Mountain => "Mountain",
            SampleImage::Sunrise => "Sunrise",
            SampleImage::Island => "Island",
            SampleImage::Puppies => "Puppies",
            SampleImage::BlackCat => "Black Cat",
            SampleImage::GoldFish => "Gold Fish",
            SampleImage::Bear => "Bear",
            SampleImage::Camera => "Camera",
            SampleImage::Guitar => "Guitar",
        }
    }

    /// File name without extension inside the samples directory.
    pub fn file_stem(self) -> &'static str {
        match self {
            SampleImage::Mountain => "mountain",
            SampleImage::Sunrise => "sunrise",
            SampleImage::Island => "island",
            SampleImage::Puppies => "puppies",
            SampleImage::BlackCat => "black_cat",
            SampleImage::GoldFish => "gold_fish",
            SampleImage::Bear => "bear",
            SampleImage::Camera => "camera",
            SampleImage::Guitar => "guitar",
        }
    }

    /// Look up a sample by display name, ignoring case.
    ///
    /// Unrecognized names select `Guitar`, the last entry of the picker.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|sample| sample.name().eq_ignore_ascii_case(name))
            .unwrap_or(SampleImage::Guitar)
    }
}

impl fmt::Display for SampleImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a base image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSource {
    Sample(SampleImage),
    File(PathBuf),
}

impl Default for ImageSource {
    fn default() -> Self {
        ImageSource::Sample(SampleImage::default())
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Sample(sample) => write!(f, "sample {}", sample),
            ImageSource::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

/// Supplies base images to a session.
pub trait ImageProvider {
    fn load(&self, source: &ImageSource) -> Result<Image, ImageLoadError>;
}

/// EXIF orientation values (tag 0x0112).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Orientation {
    #[default]
    Normal,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    Transpose,
    Rotate90CW,
    Transverse,
    Rotate270CW,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// Loads samples from a directory and arbitrary files from disk.
#[derive(Debug, Clone, Default)]
pub struct FileProvider {
    samples_dir: Option<PathBuf>,
}

impl FileProvider {
    pub fn new(samples_dir: Option<PathBuf>) -> Self {
        Self { samples_dir }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.samples_dir.clone())
    }

    /// Decode an encoded image held in memory, applying EXIF orientation.
    ///
    /// # Errors
    ///
    /// Returns `ImageLoadError::Decode` if the format is not recognized or
    /// the data is corrupt.
    pub fn decode_bytes(bytes: &[u8]) -> Result<Image, ImageLoadError> {
        let orientation = extract_orientation(bytes);

        let img = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ImageLoadError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| ImageLoadError::Decode(e.to_string()))?;

        let oriented = apply_orientation(img, orientation);
        Ok(Image::from_rgb_image(oriented.into_rgb8()))
    }

    fn sample_path(&self, sample: SampleImage) -> Result<PathBuf, ImageLoadError> {
        let dir = self
            .samples_dir
            .as_deref()
            .ok_or(ImageLoadError::SampleUnavailable(sample))?;
        SAMPLE_EXTENSIONS
            .iter()
            .map(|ext| dir.join(sample.file_stem()).with_extension(ext))
            .find(|path| path.is_file())
            .ok_or(ImageLoadError::SampleUnavailable(sample))
    }

    fn read_file(path: &Path) -> Result<Image, ImageLoadError> {
        let bytes = std::fs::read(path).map_err(|source| ImageLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode_bytes(&bytes)
    }
}

impl ImageProvider for FileProvider {
    #[instrument(skip_all, fields(source = %source))]
    fn load(&self, source: &ImageSource) -> Result<Image, ImageLoadError> {
        let path = match source {
            ImageSource::Sample(sample) => self.sample_path(*sample)?,
            // An empty path is what a dismissed file dialog hands back.
            ImageSource::File(path) if path.as_os_str().is_empty() => {
                return Err(ImageLoadError::Cancelled);
            }
            ImageSource::File(path) => path.clone(),
        };
        let image = Self::read_file(&path)?;
        debug!(width = image.width(), height = image.height(), "decoded base image");
        Ok(image)
    }
}

/// Read the EXIF orientation, defaulting to `Normal` when absent.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    Reader::new()
        .read_from_container(&mut cursor)
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .map(Orientation::from)
        .unwrap_or_default()
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([x as u8 * 40, y as u8 * 40, 7])
        });
        let mut out = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("retouch-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_sample_names() {
        assert_eq!(SampleImage::default(), SampleImage::Island);
        assert_eq!(SampleImage::from_name("Black Cat"), SampleImage::BlackCat);
        assert_eq!(SampleImage::from_name("gold fish"), SampleImage::GoldFish);
        assert_eq!(SampleImage::from_name("Unicorn"), SampleImage::Guitar);
        for sample in SampleImage::ALL {
            assert_eq!(SampleImage::from_name(sample.name()), sample);
        }
    }

    #[test]
    fn test_decode_png_bytes() {
        let img = FileProvider::decode_bytes(&png_bytes(5, 3)).unwrap();
        assert_eq!(img.dimensions(), (5, 3));
        assert_eq!(img.pixel(1, 2), [40, 80, 7]);
    }

    #[test]
    fn test_decode_invalid_bytes() {
        let result = FileProvider::decode_bytes(&[0x00, 0x01, 0x02, 0x03]);
        assert!(matches!(result, Err(ImageLoadError::Decode(_))));
        assert!(FileProvider::decode_bytes(&[]).is_err());
    }

    #[test]
    fn test_orientation_defaults_without_exif() {
        assert_eq!(extract_orientation(&png_bytes(2, 2)), Orientation::Normal);
        assert_eq!(Orientation::from(6), Orientation::Rotate90CW);
        assert_eq!(Orientation::from(42), Orientation::Normal);
    }

    #[test]
    fn test_apply_orientation_swaps_dimensions() {
        let img = DynamicImage::ImageRgb8(image::RgbImage::new(4, 2));
        let rotated = apply_orientation(img, Orientation::Rotate90CW);
        assert_eq!((rotated.width(), rotated.height()), (2, 4));
    }

    #[test]
    fn test_empty_path_is_cancelled() {
        let provider = FileProvider::default();
        let result = provider.load(&ImageSource::File(PathBuf::new()));
        assert!(matches!(result, Err(ImageLoadError::Cancelled)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let provider = FileProvider::default();
        let path = temp_dir("missing").join("nope.png");
        let result = provider.load(&ImageSource::File(path.clone()));
        match result {
            Err(ImageLoadError::Io { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_sample_without_directory_is_unavailable() {
        let provider = FileProvider::default();
        let result = provider.load(&ImageSource::Sample(SampleImage::Bear));
        assert!(matches!(
            result,
            Err(ImageLoadError::SampleUnavailable(SampleImage::Bear))
        ));
    }

    #[test]
    fn test_sample_resolved_from_directory() {
        let dir = temp_dir("samples");
        std::fs::write(dir.join("gold_fish.png"), png_bytes(3, 4)).unwrap();

        let provider =
            FileProvider::from_config(&EngineConfig::new().with_samples_dir(dir.clone()));
        let img = provider
            .load(&ImageSource::Sample(SampleImage::GoldFish))
            .unwrap();
        assert_eq!(img.dimensions(), (3, 4));

        std::fs::remove_dir_all(dir).unwrap();
    }
}
