//! Error types shared across the retrieval pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Common trait for pipeline errors.
///
/// Every crate in the workspace implements this for its error enum so the CLI
/// can report failures with stable codes regardless of where they originated.
///
/// # Example
///
/// ```ignore
/// use vidsift_core::error::CodedError;
///
/// fn report<E: CodedError>(err: E) {
///     eprintln!("[{}] {}", err.code(), err.message());
/// }
/// ```
pub trait CodedError: std::error::Error {
    /// Stable error code such as `CORE_003` or `BOF_002`.
    fn code(&self) -> &'static str;

    /// Human-readable message. Defaults to the `Display` output.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Error category used for grouping ("core", "bof", "color").
    fn category(&self) -> &'static str;
}

/// Errors raised by distance functions, search, corpus tables and configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A file could not be parsed at all.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Offending file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// A single record in a table was malformed.
    #[error("malformed record at line {line}: {message}")]
    MalformedRecord {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// Two vectors that must have equal length do not.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        found: usize,
    },

    /// A vector with zero norm was passed to cosine distance.
    #[error("degenerate vector: {0} has zero norm")]
    DegenerateVector(&'static str),

    /// A vector could not be reshaped into 3-D points.
    #[error("cannot reshape vector of length {len} into 3-D points")]
    InvalidShape {
        /// Vector length.
        len: usize,
    },

    /// Search was asked for neighbors in an empty corpus.
    #[error("reference corpus is empty")]
    EmptyCorpus,

    /// An identifier appeared twice in a reference corpus.
    #[error("duplicate identifier in reference corpus: {0}")]
    DuplicateIdentifier(String),

    /// An identifier was looked up but is not in the corpus.
    #[error("identifier not found in reference corpus: {0}")]
    UnknownIdentifier(String),

    /// An unknown model name was requested.
    #[error("unknown model '{0}'")]
    UnknownModel(String),

    /// An unknown distance metric name was requested.
    #[error("unknown distance metric '{0}'")]
    UnknownMetric(String),

    /// The assignment solver received a cost it cannot handle.
    #[error("assignment solver failed: {0}")]
    Assignment(String),

    /// A captured activation was missing or had the wrong shape.
    #[error("activation error: {0}")]
    Activation(String),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Creates a parse error for a file.
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

    /// Creates a dimension mismatch error.
    pub fn mismatch(expected: usize, found: usize) -> Self {
        Self::DimensionMismatch { expected, found }
    }
}

impl CodedError for CoreError {
    fn code(&self) -> &'static str {
        match self {
            CoreError::Parse { .. } => "CORE_001",
            CoreError::MalformedRecord { .. } => "CORE_002",
            CoreError::DimensionMismatch { .. } => "CORE_003",
            CoreError::DegenerateVector(_) => "CORE_004",
            CoreError::InvalidShape { .. } => "CORE_005",
            CoreError::EmptyCorpus => "CORE_006",
            CoreError::DuplicateIdentifier(_) => "CORE_007",
            CoreError::UnknownIdentifier(_) => "CORE_008",
            CoreError::UnknownModel(_) => "CORE_009",
            CoreError::UnknownMetric(_) => "CORE_010",
            CoreError::Assignment(_) => "CORE_011",
            CoreError::Activation(_) => "CORE_012",
            CoreError::Config(_) => "CORE_013",
            CoreError::Json(_) => "CORE_014",
            CoreError::Io(_) => "CORE_015",
        }
    }

    fn category(&self) -> &'static str {
        "core"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_helper() {
        let err = CoreError::mismatch(960, 480);
        assert_eq!(err.to_string(), "dimension mismatch: expected 960, found 480");
        assert_eq!(err.code(), "CORE_003");
    }

    #[test]
    fn test_malformed_helper() {
        let err = CoreError::malformed(7, "expected 170 fields, found 12");
        assert!(err.to_string().contains("line 7"));
        assert!(err.to_string().contains("170 fields"));
    }

    #[test]
    fn test_category() {
        assert_eq!(CoreError::EmptyCorpus.category(), "core");
        assert_eq!(CoreError::EmptyCorpus.message(), "reference corpus is empty");
    }
}
