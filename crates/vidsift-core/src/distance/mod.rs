//! Vector and histogram distance functions.
//!
//! Every function here is pure: it takes two equal-length slices and returns a
//! non-negative score where smaller means more similar (Bhattacharyya may go
//! slightly negative for overlapping unit-mass histograms because of the
//! stabilizing epsilon).
//!
//! | metric          | formula                                     |
//! |-----------------|---------------------------------------------|
//! | cosine          | `1 - (u·v) / (|u| |v|)`                     |
//! | euclidean       | `sqrt(Σ (u_i - v_i)²)`                      |
//! | intersection    | `1 - Σ min(u_i, v_i)`                       |
//! | bhattacharyya   | `-ln(Σ sqrt(u_i v_i) + 1e-10)`              |
//! | earth movers    | optimal matching cost between 3-D point sets |

pub mod assignment;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use assignment::CostMatrix;

/// Added inside the logarithm of the Bhattacharyya distance.
pub const BHATTACHARYYA_EPSILON: f64 = 1e-10;

/// Coordinates per point when a vector is read as a 3-D point set.
pub const POINT_DIM: usize = 3;

/// Selectable distance function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    Cosine,
    Euclidean,
    Intersection,
    Bhattacharyya,
    EarthMovers,
}

impl DistanceMetric {
    /// All metrics, in display order.
    pub const ALL: [DistanceMetric; 5] = [
        DistanceMetric::Cosine,
        DistanceMetric::Euclidean,
        DistanceMetric::Intersection,
        DistanceMetric::Bhattacharyya,
        DistanceMetric::EarthMovers,
    ];

    /// Short identifier used on the command line and in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Intersection => "intersection",
            DistanceMetric::Bhattacharyya => "bhattacharyya",
            DistanceMetric::EarthMovers => "emd",
        }
    }

    /// Descriptive name for tables.
    pub fn display_name(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "Cosine Distance",
            DistanceMetric::Euclidean => "Euclidean Distance",
            DistanceMetric::Intersection => "Histogram Intersection",
            DistanceMetric::Bhattacharyya => "Bhattacharyya Distance",
            DistanceMetric::EarthMovers => "Earth Mover's Distance",
        }
    }

    /// Whether the metric treats its operands as probability histograms.
    pub fn is_histogram_metric(&self) -> bool {
        matches!(self, DistanceMetric::Intersection | DistanceMetric::Bhattacharyya)
    }

    /// Evaluates the metric.
    pub fn distance(&self, u: &[f64], v: &[f64]) -> CoreResult<f64> {
        match self {
            DistanceMetric::Cosine => cosine(u, v),
            DistanceMetric::Euclidean => euclidean(u, v),
            DistanceMetric::Intersection => intersection(u, v),
            DistanceMetric::Bhattacharyya => bhattacharyya(u, v),
            DistanceMetric::EarthMovers => earth_movers(u, v),
        }
    }
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            "intersection" => Ok(DistanceMetric::Intersection),
            "bhattacharyya" => Ok(DistanceMetric::Bhattacharyya),
            "emd" | "earth_movers" => Ok(DistanceMetric::EarthMovers),
            _ => Err(CoreError::UnknownMetric(s.to_string())),
        }
    }
}

fn check_dims(u: &[f64], v: &[f64]) -> CoreResult<()> {
    if u.len() != v.len() {
        return Err(CoreError::mismatch(u.len(), v.len()));
    }
    Ok(())
}

/// Cosine distance. Fails with `DegenerateVector` when either norm is zero.
pub fn cosine(u: &[f64], v: &[f64]) -> CoreResult<f64> {
    check_dims(u, v)?;

    let mut dot = 0.0;
    let mut norm_u = 0.0;
    let mut norm_v = 0.0;
    for (a, b) in u.iter().zip(v) {
        dot += a * b;
        norm_u += a * a;
        norm_v += b * b;
    }

    if norm_u == 0.0 {
        return Err(CoreError::DegenerateVector("first operand"));
    }
    if norm_v == 0.0 {
        return Err(CoreError::DegenerateVector("second operand"));
    }

    // sqrt of the product keeps u == v at exactly 1.0
    let similarity = (dot / (norm_u * norm_v).sqrt()).clamp(-1.0, 1.0);
    Ok(1.0 - similarity)
}

/// Euclidean (L2) distance.
pub fn euclidean(u: &[f64], v: &[f64]) -> CoreResult<f64> {
    check_dims(u, v)?;
    Ok(squared_euclidean(u, v).sqrt())
}

/// Sum of squared differences, the ranking form of [`euclidean`].
///
/// Callers must ensure equal lengths; extra trailing values are ignored.
#[inline]
pub fn squared_euclidean(u: &[f64], v: &[f64]) -> f64 {
    u.iter().zip(v).map(|(a, b)| (a - b) * (a - b)).sum()
}

/// Histogram intersection distance. Operands are expected to be non-negative.
pub fn intersection(u: &[f64], v: &[f64]) -> CoreResult<f64> {
    check_dims(u, v)?;
    let overlap: f64 = u.iter().zip(v).map(|(a, b)| a.min(*b)).sum();
    Ok(1.0 - overlap)
}

/// Bhattacharyya distance with a stabilizing epsilon inside the logarithm.
pub fn bhattacharyya(u: &[f64], v: &[f64]) -> CoreResult<f64> {
    check_dims(u, v)?;
    let coefficient: f64 = u.iter().zip(v).map(|(a, b)| (a * b).sqrt()).sum();
    Ok(-(coefficient + BHATTACHARYYA_EPSILON).ln())
}

/// Earth Mover's Distance between two vectors read as 3-D point sets.
///
/// Builds the full pairwise Euclidean cost matrix and returns the cost of the
/// exact minimum-cost perfect matching.
pub fn earth_movers(u: &[f64], v: &[f64]) -> CoreResult<f64> {
    check_dims(u, v)?;
    if u.len() % POINT_DIM != 0 {
        return Err(CoreError::InvalidShape { len: u.len() });
    }

    let points_u: Vec<&[f64]> = u.chunks_exact(POINT_DIM).collect();
    let points_v: Vec<&[f64]> = v.chunks_exact(POINT_DIM).collect();
    let n = points_u.len();

    let costs = CostMatrix::from_fn(n, n, |r, c| {
        squared_euclidean(points_u[r], points_v[c]).sqrt()
    });
    let result = assignment::solve(&costs)?;
    Ok(result.cost)
}

/// Returns a copy of `v` scaled to unit sum. All-zero input is returned unchanged.
pub fn normalize_unit_mass(v: &[f64]) -> Vec<f64> {
    let total: f64 = v.iter().sum();
    if total == 0.0 {
        return v.to_vec();
    }
    v.iter().map(|x| x / total).collect()
}
