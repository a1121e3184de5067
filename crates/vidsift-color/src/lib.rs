//! vidsift color-grid signatures
//!
//! Samples the first, middle and last frame of a video, splits each into a
//! square grid and records per-cell color-channel histograms. Frames come
//! from any [`FrameSource`]; [`ImageSequence`] reads a directory of extracted
//! frame images.
//!
//! # Example
//!
//! ```
//! use image::{Rgb, RgbImage};
//! use vidsift_color::ColorGridHistogram;
//!
//! let frames = vec![RgbImage::from_pixel(64, 48, Rgb([200, 30, 30])); 12];
//! let signature = ColorGridHistogram::default().extract(&frames).unwrap();
//! assert_eq!(signature.len(), 1728);
//! ```

pub mod error;
pub mod frame;
pub mod grid;

pub use error::{ColorError, ColorResult};
pub use frame::{FrameSource, ImageSequence};
pub use grid::{ColorGridHistogram, CHANNELS, KEY_FRAMES};
