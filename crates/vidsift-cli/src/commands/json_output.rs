//! JSON output types for machine-readable CLI output.
//!
//! Every command that accepts `--json` prints exactly one of these documents
//! to stdout. Failures carry stable error codes: `CLI_xxx` for command-level
//! problems, or the code of the library error that caused them.

use serde::{Deserialize, Serialize};

use vidsift_core::{BatchFailure, CodedError};

/// Error codes for CLI operations.
pub mod error_codes {
    /// Configuration could not be resolved
    pub const CONFIG: &str = "CLI_001";
    /// Input path missing or of the wrong kind
    pub const INPUT: &str = "CLI_002";
    /// Reference table could not be read
    pub const TABLE_READ: &str = "CLI_003";
    /// Reference table could not be written
    pub const TABLE_WRITE: &str = "CLI_004";
    /// Query arguments were inconsistent
    pub const QUERY: &str = "CLI_005";
    /// No input in a batch produced a signature
    pub const EMPTY_BATCH: &str = "CLI_006";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "CLI_002", "BOF_003")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Source file path (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl JsonError {
    /// Creates a new error with code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            file: None,
        }
    }

    /// Wraps a library error, keeping its code.
    pub fn from_coded<E: CodedError>(err: &E) -> Self {
        Self::new(err.code(), err.message())
    }

    /// Sets the file path for this error.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Envelope shared by every JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOutput<T> {
    /// Whether the command succeeded
    pub success: bool,
    /// Errors encountered
    pub errors: Vec<JsonError>,
    /// Command result (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T> CommandOutput<T> {
    /// Creates a successful output.
    pub fn success(result: T) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            result: Some(result),
        }
    }

    /// Creates a failed output.
    pub fn failure(errors: Vec<JsonError>) -> Self {
        Self {
            success: false,
            errors,
            result: None,
        }
    }
}

/// One row of `models`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub metric: String,
    pub signature: String,
    /// Stored signature length, when fixed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_len: Option<usize>,
}

/// Result of `signature`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureResult {
    pub model: String,
    pub input: String,
    /// BLAKE3 hash of the input file (absent for frame directories)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_hash: Option<String>,
    pub length: usize,
    pub signature: Vec<f64>,
}

/// Result of `index`.
#[derive(Debug, Clone, Serialize)]
pub struct IndexResult {
    pub model: String,
    pub output: String,
    pub inputs: usize,
    pub entries: usize,
    pub failures: Vec<BatchFailure>,
}

/// One ranked hit of `search`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedNeighbor {
    /// 1-based rank
    pub rank: usize,
    pub identifier: String,
    pub distance: f64,
}

/// Result of `search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub model: String,
    pub metric: String,
    pub table: String,
    /// Query input path or corpus identifier
    pub query: String,
    pub k: usize,
    pub neighbors: Vec<RankedNeighbor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidsift_core::CoreError;

    #[test]
    fn test_failure_omits_result() {
        let output: CommandOutput<SearchResult> =
            CommandOutput::failure(vec![JsonError::new(error_codes::INPUT, "missing")]);
        let json = serde_json::to_string(&output).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("CLI_002"));
        assert!(!json.contains("result"));
        assert!(!json.contains("file"));
    }

    #[test]
    fn test_from_coded_keeps_library_code() {
        let err = JsonError::from_coded(&CoreError::EmptyCorpus).with_file("table.csv");
        assert_eq!(err.code, "CORE_006");
        assert_eq!(err.file.as_deref(), Some("table.csv"));
    }
}
