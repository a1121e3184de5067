//! vidsift bag-of-features signatures
//!
//! Turns per-file spatiotemporal interest-point descriptors into a fixed
//! 960-value signature by nearest-center quantization against a precomputed
//! codebook, stratified over twelve (sigma, tau) scale pairs and two
//! descriptor families.
//!
//! # Modules
//!
//! - [`descriptor`]: Descriptor files and confidence selection
//! - [`codebook`]: Cluster-center tables and nearest-center lookup
//! - [`histogram`]: Per-stratum histograms and signature assembly
//! - [`extractor`]: File-to-signature entry point driven by configuration

pub mod codebook;
pub mod descriptor;
pub mod error;
pub mod extractor;
pub mod histogram;

pub use codebook::{nearest_center, ClusterCodebook};
pub use descriptor::{Descriptor, DescriptorStore, Family, Stratum, MIN_FIELDS, SIGMAS, TAUS};
pub use error::{BofError, BofResult};
pub use extractor::BofExtractor;
pub use histogram::{BofSignature, HistogramAssembler};
