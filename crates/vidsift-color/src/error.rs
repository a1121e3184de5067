//! Error types for color-grid extraction.

use std::path::PathBuf;
use thiserror::Error;
use vidsift_core::CodedError;

/// Result type for color operations.
pub type ColorResult<T> = Result<T, ColorError>;

/// Errors that can occur while reading frames or computing color signatures.
#[derive(Debug, Error)]
pub enum ColorError {
    /// A frame image could not be decoded.
    #[error("failed to decode frame {path}: {message}")]
    Decode {
        /// Frame file.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },

    /// A frame index past the end of the source was requested.
    #[error("frame {index} out of range for a source of {count} frames")]
    FrameOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of frames available.
        count: usize,
    },

    /// The input is not a directory of frames.
    #[error("not a frame directory: {0}")]
    NotADirectory(PathBuf),

    /// The source produced no signature (no frames, or a key frame failed to decode).
    #[error("no color signature for {0}")]
    NoSignature(PathBuf),

    /// Grid size or bin count is unusable.
    #[error("invalid color grid: {0}")]
    InvalidGrid(String),
}

impl CodedError for ColorError {
    fn code(&self) -> &'static str {
        match self {
            ColorError::Decode { .. } => "COLOR_001",
            ColorError::FrameOutOfRange { .. } => "COLOR_002",
            ColorError::NotADirectory(_) => "COLOR_003",
            ColorError::NoSignature(_) => "COLOR_004",
            ColorError::InvalidGrid(_) => "COLOR_005",
        }
    }

    fn category(&self) -> &'static str {
        "color"
    }
}
