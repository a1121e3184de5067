//! Descriptor file to stored signature, with configured policy and codebook.

use std::path::Path;

use vidsift_core::{ConfidencePolicy, RetrievalConfig};

use crate::codebook::ClusterCodebook;
use crate::descriptor::DescriptorStore;
use crate::error::{BofError, BofResult};
use crate::histogram::{BofSignature, HistogramAssembler};

/// Computes bag-of-features signatures for descriptor files.
#[derive(Debug, Clone)]
pub struct BofExtractor {
    codebook: ClusterCodebook,
    policy: ConfidencePolicy,
    top_n: usize,
    confidence_column: usize,
}

impl BofExtractor {
    pub fn new(codebook: ClusterCodebook, config: &RetrievalConfig) -> Self {
        Self {
            codebook,
            policy: config.confidence_policy,
            top_n: config.top_n,
            confidence_column: config.confidence_column,
        }
    }

    /// Loads the codebooks named by `config`.
    pub fn from_config(config: &RetrievalConfig) -> BofResult<Self> {
        let hog = config
            .hog_codebook
            .as_deref()
            .ok_or(BofError::MissingCodebook { family: "hog" })?;
        let hof = config
            .hof_codebook
            .as_deref()
            .ok_or(BofError::MissingCodebook { family: "hof" })?;
        let codebook = ClusterCodebook::load(hog, hof)?;
        Ok(Self::new(codebook, config))
    }

    /// Signature of an already parsed descriptor set.
    pub fn signature_of(&self, store: &DescriptorStore) -> BofSignature {
        let selected = store.select(self.policy, self.top_n);
        tracing::debug!(
            descriptors = store.len(),
            selected = selected.len(),
            policy = ?self.policy,
            "quantizing descriptors"
        );
        HistogramAssembler::new(&self.codebook).assemble(selected)
    }

    /// Reads a descriptor file and returns its 960-value signature.
    pub fn signature(&self, path: &Path) -> BofResult<Vec<f64>> {
        let store = DescriptorStore::load(path, self.confidence_column)?;
        Ok(self.signature_of(&store).to_vec())
    }
}
