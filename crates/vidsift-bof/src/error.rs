//! Error types for bag-of-features extraction.

use std::path::PathBuf;
use thiserror::Error;
use vidsift_core::CodedError;

/// Result type for bag-of-features operations.
pub type BofResult<T> = Result<T, BofError>;

/// Errors that can occur while reading descriptors or codebooks.
#[derive(Debug, Error)]
pub enum BofError {
    /// A descriptor file could not be read or held no usable rows.
    #[error("failed to parse descriptors in {path}: {message}")]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// A descriptor row was too short or held a non-numeric field.
    #[error("malformed descriptor at line {line}: {message}")]
    MalformedRecord {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// A codebook table violated its layout.
    #[error("malformed codebook {path}: {message}")]
    MalformedCodebook {
        /// Offending file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// A codebook required by the configuration was not given.
    #[error("no {family} codebook configured")]
    MissingCodebook {
        /// Descriptor family ("hog" or "hof").
        family: &'static str,
    },
}

impl BofError {
    /// Creates a parse error for a descriptor file.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a malformed record error.
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            message: message.into(),
        }
    }

    /// Creates a malformed codebook error.
    pub fn codebook(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MalformedCodebook {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl CodedError for BofError {
    fn code(&self) -> &'static str {
        match self {
            BofError::Parse { .. } => "BOF_001",
            BofError::MalformedRecord { .. } => "BOF_002",
            BofError::MalformedCodebook { .. } => "BOF_003",
            BofError::MissingCodebook { .. } => "BOF_004",
        }
    }

    fn category(&self) -> &'static str {
        "bof"
    }
}
