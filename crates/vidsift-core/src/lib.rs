//! vidsift core library
//!
//! Signature types, distance functions and nearest-neighbor search for
//! content-based video retrieval.
//!
//! # Overview
//!
//! A video is represented by a fixed-length **signature** vector produced by
//! one of several extractors (bag-of-features histograms, color-grid
//! histograms, pooled deep activations). Each [`Model`] fixes which signature
//! it reads and which [`DistanceMetric`] scores it. A [`ReferenceCorpus`]
//! holds precomputed signatures, and [`retrieval::search`] ranks it against a
//! query.
//!
//! # Example
//!
//! ```
//! use vidsift_core::retrieval::search;
//! use vidsift_core::{CorpusEntry, Model, Query, ReferenceCorpus};
//!
//! let corpus = ReferenceCorpus::new(vec![
//!     CorpusEntry::new("a.avi", "videos/a.avi", vec![1.0; 512]),
//!     CorpusEntry::new("b.avi", "videos/b.avi", (0..512).map(|i| i as f64).collect()),
//! ])
//! .unwrap();
//!
//! let hits = search(Query::Reference("b.avi"), Model::R3d18AvgPool, &corpus, 2).unwrap();
//! assert_eq!(hits[0].identifier, "b.avi");
//! assert_eq!(hits.len(), 2);
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error type and stable error codes
//! - [`distance`]: Distance metrics and the exact assignment solver behind EMD
//! - [`search`]: Top-k ranking with stable tie-breaking
//! - [`corpus`]: Reference tables and their text format
//! - [`deep`]: Pooling of captured network activations
//! - [`model`]: The model registry
//! - [`config`]: Retrieval configuration
//! - [`batch`]: Parallel corpus construction
//! - [`retrieval`]: The query surface

pub mod batch;
pub mod config;
pub mod corpus;
pub mod deep;
pub mod distance;
pub mod error;
pub mod model;
pub mod retrieval;
pub mod search;

// Re-export commonly used types at the crate root
pub use batch::{identifier_for, run_batch, BatchFailure, BatchReport};
pub use config::{ConfidencePolicy, RetrievalConfig};
pub use corpus::{CorpusEntry, ReferenceCorpus};
pub use deep::{
    ActivationBundle, ActivationTensor, CapturedActivations, DeepLayer, FeatureExtractor,
    DEEP_SIGNATURE_LEN,
};
pub use distance::DistanceMetric;
pub use error::{CodedError, CoreError, CoreResult};
pub use model::{
    Model, SignatureKind, BOF_BINS, BOF_FAMILY_LEN, BOF_SIGNATURE_LEN, BOF_STRATA,
};
pub use retrieval::Query;
pub use search::{top_k, NeighborResult};
