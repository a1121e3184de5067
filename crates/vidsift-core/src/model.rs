//! Model registry: fixed pairings of signature extractor and distance metric.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::deep::{DeepLayer, DEEP_SIGNATURE_LEN};
use crate::distance::DistanceMetric;
use crate::error::{CoreError, CoreResult};

/// Bins per stratum histogram.
pub const BOF_BINS: usize = 40;

/// Number of (sigma, tau) strata.
pub const BOF_STRATA: usize = 12;

/// Length of one descriptor family's half of a BoF signature.
pub const BOF_FAMILY_LEN: usize = BOF_STRATA * BOF_BINS;

/// Length of a full BoF signature (both families).
pub const BOF_SIGNATURE_LEN: usize = 2 * BOF_FAMILY_LEN;

/// How a model turns a video into a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "layer")]
pub enum SignatureKind {
    /// Per-cell color histograms of three key frames.
    ColorGrid,
    /// Stratified bag-of-features histogram over both descriptor families.
    BagOfFeatures,
    /// Pooled activation of one network layer.
    Deep(DeepLayer),
}

/// A selectable retrieval model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Model {
    ColorHist,
    ColorHistIntersection,
    ColorHistBhattacharyya,
    BofHog480,
    BofHof480,
    Bof960,
    R3d18Layer3,
    R3d18Layer4,
    R3d18AvgPool,
}

impl Model {
    pub const ALL: [Model; 9] = [
        Model::ColorHist,
        Model::ColorHistIntersection,
        Model::ColorHistBhattacharyya,
        Model::BofHog480,
        Model::BofHof480,
        Model::Bof960,
        Model::R3d18Layer3,
        Model::R3d18Layer4,
        Model::R3d18AvgPool,
    ];

    /// Canonical model name.
    pub fn name(&self) -> &'static str {
        match self {
            Model::ColorHist => "COL-HIST",
            Model::ColorHistIntersection => "COL-HIST-INTERSECTION",
            Model::ColorHistBhattacharyya => "COL-HIST-BHATTACHARYYA",
            Model::BofHog480 => "BOF-HOG-480",
            Model::BofHof480 => "BOF-HOF-480",
            Model::Bof960 => "BOF-960",
            Model::R3d18Layer3 => "R3D18-Layer3-512",
            Model::R3d18Layer4 => "R3D18-Layer4-512",
            Model::R3d18AvgPool => "R3D18-AvgPool-512",
        }
    }

    pub fn metric(&self) -> DistanceMetric {
        match self {
            Model::ColorHist => DistanceMetric::EarthMovers,
            Model::ColorHistIntersection => DistanceMetric::Intersection,
            Model::ColorHistBhattacharyya => DistanceMetric::Bhattacharyya,
            Model::BofHog480 | Model::BofHof480 | Model::Bof960 => DistanceMetric::Euclidean,
            Model::R3d18Layer3 | Model::R3d18Layer4 | Model::R3d18AvgPool => {
                DistanceMetric::Cosine
            }
        }
    }

    pub fn signature_kind(&self) -> SignatureKind {
        match self {
            Model::ColorHist | Model::ColorHistIntersection | Model::ColorHistBhattacharyya => {
                SignatureKind::ColorGrid
            }
            Model::BofHog480 | Model::BofHof480 | Model::Bof960 => SignatureKind::BagOfFeatures,
            Model::R3d18Layer3 => SignatureKind::Deep(DeepLayer::Layer3),
            Model::R3d18Layer4 => SignatureKind::Deep(DeepLayer::Layer4),
            Model::R3d18AvgPool => SignatureKind::Deep(DeepLayer::AvgPool),
        }
    }

    /// Length of the signature stored in a reference table for this model.
    ///
    /// `None` for color-grid models, whose length follows the configured grid.
    pub fn stored_len(&self) -> Option<usize> {
        match self.signature_kind() {
            SignatureKind::ColorGrid => None,
            SignatureKind::BagOfFeatures => Some(BOF_SIGNATURE_LEN),
            SignatureKind::Deep(_) => Some(DEEP_SIGNATURE_LEN),
        }
    }

    /// The part of a stored signature this model scores.
    pub fn project<'a>(&self, signature: &'a [f64]) -> CoreResult<&'a [f64]> {
        match self {
            Model::BofHog480 | Model::BofHof480 => {
                if signature.len() != BOF_SIGNATURE_LEN {
                    return Err(CoreError::mismatch(BOF_SIGNATURE_LEN, signature.len()));
                }
                let (hog, hof) = signature.split_at(BOF_FAMILY_LEN);
                Ok(if *self == Model::BofHog480 { hog } else { hof })
            }
            _ => Ok(signature),
        }
    }

    /// Distance between two stored signatures under this model.
    ///
    /// Histogram metrics compare unit-mass copies of the projected operands.
    pub fn distance(&self, query: &[f64], reference: &[f64]) -> CoreResult<f64> {
        let q = self.project(query)?;
        let r = self.project(reference)?;
        let metric = self.metric();
        if metric.is_histogram_metric() {
            let q = crate::distance::normalize_unit_mass(q);
            let r = crate::distance::normalize_unit_mass(r);
            metric.distance(&q, &r)
        } else {
            metric.distance(q, r)
        }
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Model {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownModel(s.to_string()))
    }
}
