//! Per-model signature extraction and input discovery.
//!
//! The meaning of an input path depends on the model:
//!
//! | model family | input                                   |
//! |--------------|-----------------------------------------|
//! | `BOF-*`      | descriptor text file                    |
//! | `COL-HIST*`  | directory of extracted frame images     |
//! | `R3D18-*`    | captured activation bundle (`.json`)    |

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use vidsift_bof::{BofError, BofExtractor};
use vidsift_color::{ColorError, ColorGridHistogram};
use vidsift_core::{
    CapturedActivations, CodedError, CoreError, DeepLayer, FeatureExtractor, Model,
    RetrievalConfig, SignatureKind,
};

/// Failure to compute one signature.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Bof(#[from] BofError),
    #[error(transparent)]
    Color(#[from] ColorError),
}

impl CodedError for ExtractError {
    fn code(&self) -> &'static str {
        match self {
            ExtractError::Core(e) => e.code(),
            ExtractError::Bof(e) => e.code(),
            ExtractError::Color(e) => e.code(),
        }
    }

    fn category(&self) -> &'static str {
        match self {
            ExtractError::Core(e) => e.category(),
            ExtractError::Bof(e) => e.category(),
            ExtractError::Color(e) => e.category(),
        }
    }
}

/// A configured signature extractor for one model.
#[derive(Debug, Clone)]
pub enum SignatureExtractor {
    Bof(BofExtractor),
    Color(ColorGridHistogram),
    Deep(DeepLayer),
}

impl SignatureExtractor {
    /// Prepares the extractor `model` needs, loading codebooks if required.
    pub fn for_model(model: Model, config: &RetrievalConfig) -> Result<Self, ExtractError> {
        Ok(match model.signature_kind() {
            SignatureKind::BagOfFeatures => Self::Bof(BofExtractor::from_config(config)?),
            SignatureKind::ColorGrid => Self::Color(ColorGridHistogram::from_config(config)?),
            SignatureKind::Deep(layer) => Self::Deep(layer),
        })
    }

    /// Computes the stored signature of one input.
    pub fn signature(&self, input: &Path) -> Result<Vec<f64>, ExtractError> {
        match self {
            Self::Bof(extractor) => Ok(extractor.signature(input)?),
            Self::Color(grid) => Ok(grid.signature(input)?),
            Self::Deep(layer) => {
                let bundle = CapturedActivations.extract(input)?;
                Ok(layer.pool(&bundle)?)
            }
        }
    }

    /// Lists the inputs inside `dir` this extractor understands, sorted.
    pub fn discover_inputs(&self, dir: &Path) -> Vec<PathBuf> {
        let mut inputs: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| match self {
                Self::Color(_) => e.file_type().is_dir(),
                Self::Deep(_) => {
                    e.file_type().is_file()
                        && e.path()
                            .extension()
                            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
                }
                Self::Bof(_) => e.file_type().is_file(),
            })
            .map(|e| e.path().to_path_buf())
            .collect();

        // Sort for deterministic table order
        inputs.sort();
        inputs
    }
}
