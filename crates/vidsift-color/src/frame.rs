//! Random-access frame sources.

use image::RgbImage;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ColorError, ColorResult};

/// Frame file extensions recognized in a frame directory.
const FRAME_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// A decoded video that can be read at arbitrary frame indices.
pub trait FrameSource {
    fn frame_count(&self) -> usize;

    /// Decodes the frame at `index` (0-based).
    fn frame_at(&self, index: usize) -> ColorResult<RgbImage>;
}

impl FrameSource for [RgbImage] {
    fn frame_count(&self) -> usize {
        self.len()
    }

    fn frame_at(&self, index: usize) -> ColorResult<RgbImage> {
        self.get(index)
            .cloned()
            .ok_or(ColorError::FrameOutOfRange {
                index,
                count: self.len(),
            })
    }
}

impl FrameSource for Vec<RgbImage> {
    fn frame_count(&self) -> usize {
        self.as_slice().frame_count()
    }

    fn frame_at(&self, index: usize) -> ColorResult<RgbImage> {
        self.as_slice().frame_at(index)
    }
}

/// A video stored as a directory of extracted frame images, ordered by file name.
#[derive(Debug, Clone)]
pub struct ImageSequence {
    frames: Vec<PathBuf>,
}

impl ImageSequence {
    /// Lists the PNG/JPEG files directly inside `dir`. Frames are only decoded
    /// when requested.
    pub fn open(dir: &Path) -> ColorResult<Self> {
        if !dir.is_dir() {
            return Err(ColorError::NotADirectory(dir.to_path_buf()));
        }

        let mut frames: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                e.path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .map(|e| e.path().to_path_buf())
            .collect();

        // Sort for deterministic frame order
        frames.sort();

        tracing::debug!(dir = %dir.display(), frames = frames.len(), "opened frame directory");
        Ok(Self { frames })
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.frames
    }
}

impl FrameSource for ImageSequence {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame_at(&self, index: usize) -> ColorResult<RgbImage> {
        let path = self.frames.get(index).ok_or(ColorError::FrameOutOfRange {
            index,
            count: self.frames.len(),
        })?;
        let image = image::open(path).map_err(|e| ColorError::Decode {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(image.to_rgb8())
    }
}
