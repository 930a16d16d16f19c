//! Effect functions: pure `Image × params -> Image` primitives.
//!
//! Every function borrows its input and returns a new [`Image`](crate::Image);
//! none of them mutates a buffer it did not allocate. Functions that cannot
//! fail for any input return `Image` directly, the rest return
//! `Result<Image, EffectError>`.
//!
//! The pipeline engine decides which of these run and in which order; see
//! [`crate::pipeline`].

pub mod color;
pub mod convolve;
pub mod edges;
pub mod geometry;
pub mod rotate;
pub mod tone;

pub use color::{adjust_gamma, adjust_hue, adjust_saturation};
pub use convolve::{emboss, gaussian_blur, sharpen};
pub use edges::edge_map;
pub use geometry::{flip_horizontal, flip_vertical, resize_exact};
pub use rotate::{rotate_about, InterpolationFilter};
pub use tone::{posterize, solarize};
