//! Color-grid signatures.
//!
//! Three key frames (first, middle, last) are each cut into an `R x R` grid.
//! Every cell contributes one histogram per channel (R, G, B) of `N` bins,
//! normalized to unit sum. Layout, outermost first: frame, cell (row-major),
//! channel, bin.
//!
//! Cells are `height / R` by `width / R` pixels; trailing rows and columns
//! that do not fill a whole cell are not counted.

use image::RgbImage;
use std::path::Path;

use vidsift_core::RetrievalConfig;

use crate::error::{ColorError, ColorResult};
use crate::frame::{FrameSource, ImageSequence};

/// Number of key frames sampled per video.
pub const KEY_FRAMES: usize = 3;

/// Color channels per pixel.
pub const CHANNELS: usize = 3;

/// Per-cell channel histograms over three key frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorGridHistogram {
    grid_size: usize,
    bins: usize,
}

impl Default for ColorGridHistogram {
    fn default() -> Self {
        Self {
            grid_size: 4,
            bins: 12,
        }
    }
}

impl ColorGridHistogram {
    pub fn new(grid_size: usize, bins: usize) -> ColorResult<Self> {
        if grid_size == 0 {
            return Err(ColorError::InvalidGrid("grid size must be at least 1".into()));
        }
        if bins == 0 || bins > 256 {
            return Err(ColorError::InvalidGrid(format!(
                "{} bins per channel; expected 1 to 256",
                bins
            )));
        }
        Ok(Self { grid_size, bins })
    }

    pub fn from_config(config: &RetrievalConfig) -> ColorResult<Self> {
        Self::new(config.grid_size, config.color_bins)
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Length of every signature this extractor produces.
    pub fn signature_len(&self) -> usize {
        KEY_FRAMES * self.frame_len()
    }

    fn frame_len(&self) -> usize {
        self.grid_size * self.grid_size * CHANNELS * self.bins
    }

    /// Indices of the first, middle and last frames, or `None` with no frames.
    pub fn key_frame_indices(frame_count: usize) -> Option<[usize; KEY_FRAMES]> {
        if frame_count == 0 {
            return None;
        }
        Some([0, frame_count / 2, frame_count - 1])
    }

    /// Computes the signature of a frame source.
    ///
    /// Returns `None` when the source has no frames or a key frame cannot be
    /// decoded.
    pub fn extract<S: FrameSource + ?Sized>(&self, source: &S) -> Option<Vec<f64>> {
        let indices = Self::key_frame_indices(source.frame_count())?;
        let mut signature = Vec::with_capacity(self.signature_len());

        for index in indices {
            match source.frame_at(index) {
                Ok(frame) => signature.extend(self.frame_histogram(&frame)),
                Err(e) => {
                    tracing::warn!(index, error = %e, "key frame unavailable");
                    return None;
                }
            }
        }
        Some(signature)
    }

    /// Reads a frame directory and returns its signature.
    pub fn signature(&self, dir: &Path) -> ColorResult<Vec<f64>> {
        let source = ImageSequence::open(dir)?;
        self.extract(&source)
            .ok_or_else(|| ColorError::NoSignature(dir.to_path_buf()))
    }

    /// Histograms of one frame: cells row-major, then channels, then bins.
    pub fn frame_histogram(&self, frame: &RgbImage) -> Vec<f64> {
        let r = self.grid_size;
        let cell_w = frame.width() as usize / r;
        let cell_h = frame.height() as usize / r;
        let mut out = Vec::with_capacity(self.frame_len());

        for row in 0..r {
            for col in 0..r {
                let mut counts = vec![0u64; CHANNELS * self.bins];
                for y in row * cell_h..(row + 1) * cell_h {
                    for x in col * cell_w..(col + 1) * cell_w {
                        let pixel = frame.get_pixel(x as u32, y as u32);
                        for (channel, value) in pixel.0.iter().enumerate() {
                            counts[channel * self.bins + self.bin_of(*value)] += 1;
                        }
                    }
                }

                let pixels = (cell_w * cell_h) as f64;
                out.extend(counts.into_iter().map(|c| {
                    if pixels == 0.0 {
                        0.0
                    } else {
                        c as f64 / pixels
                    }
                }));
            }
        }
        out
    }

    fn bin_of(&self, value: u8) -> usize {
        usize::from(value) * self.bins / 256
    }
}
