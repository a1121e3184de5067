//! Spatiotemporal interest-point descriptors and confidence selection.
//!
//! ## Row layout
//!
//! Descriptor files hold one whitespace-separated row per interest point with
//! at least 170 numeric fields:
//!
//! | offset    | field                     |
//! |-----------|---------------------------|
//! | 4         | spatial scale `sigma`     |
//! | 5         | temporal scale `tau`      |
//! | 7..79     | HOG descriptor (72)       |
//! | 79..170   | HOF descriptor (91)       |
//!
//! The confidence offset is configurable. Lines starting with `#` are comments.

use serde::Serialize;
use std::fs;
use std::ops::Range;
use std::path::Path;

use vidsift_core::ConfidencePolicy;

use crate::error::{BofError, BofResult};

/// Spatial scales, in canonical stratum order.
pub const SIGMAS: [u32; 6] = [4, 8, 16, 32, 64, 128];

/// Temporal scales, in canonical stratum order.
pub const TAUS: [u32; 2] = [2, 4];

/// Minimum number of fields in a descriptor row.
pub const MIN_FIELDS: usize = 170;

const SIGMA_COLUMN: usize = 4;
const TAU_COLUMN: usize = 5;
const HOG_COLUMNS: Range<usize> = 7..79;
const HOF_COLUMNS: Range<usize> = 79..170;

/// Tolerance when matching a scale value to a canonical scale.
const SCALE_TOLERANCE: f64 = 1e-6;

/// Descriptor family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// Histogram of oriented gradients.
    Hog,
    /// Histogram of optical flow.
    Hof,
}

impl Family {
    /// Families in signature order.
    pub const ALL: [Family; 2] = [Family::Hog, Family::Hof];

    pub fn dim(&self) -> usize {
        match self {
            Family::Hog => HOG_COLUMNS.len(),
            Family::Hof => HOF_COLUMNS.len(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Family::Hog => "hog",
            Family::Hof => "hof",
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A (sigma, tau) scale bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Stratum {
    pub sigma: u32,
    pub tau: u32,
}

impl Stratum {
    pub fn new(sigma: u32, tau: u32) -> Self {
        Self { sigma, tau }
    }

    /// All twelve strata: sigma ascending, tau ascending within each sigma.
    pub fn all() -> impl Iterator<Item = Stratum> {
        SIGMAS
            .into_iter()
            .flat_map(|sigma| TAUS.into_iter().map(move |tau| Stratum { sigma, tau }))
    }

    /// Maps raw scale values onto a canonical stratum.
    pub fn from_scales(sigma: f64, tau: f64) -> Option<Stratum> {
        let sigma = SIGMAS
            .into_iter()
            .find(|s| (sigma - f64::from(*s)).abs() < SCALE_TOLERANCE)?;
        let tau = TAUS
            .into_iter()
            .find(|t| (tau - f64::from(*t)).abs() < SCALE_TOLERANCE)?;
        Some(Stratum { sigma, tau })
    }
}

impl std::fmt::Display for Stratum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(sigma={}, tau={})", self.sigma, self.tau)
    }
}

/// One interest point.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    pub sigma: f64,
    pub tau: f64,
    pub confidence: f64,
    pub hog: Vec<f64>,
    pub hof: Vec<f64>,
}

impl Descriptor {
    /// The canonical stratum, or `None` for scales outside the grid.
    pub fn stratum(&self) -> Option<Stratum> {
        Stratum::from_scales(self.sigma, self.tau)
    }

    pub fn features(&self, family: Family) -> &[f64] {
        match family {
            Family::Hog => &self.hog,
            Family::Hof => &self.hof,
        }
    }

    fn from_fields(fields: &[f64], confidence_column: usize) -> Self {
        Self {
            sigma: fields[SIGMA_COLUMN],
            tau: fields[TAU_COLUMN],
            confidence: fields[confidence_column],
            hog: fields[HOG_COLUMNS].to_vec(),
            hof: fields[HOF_COLUMNS].to_vec(),
        }
    }
}

/// Descriptors of one file, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptorStore {
    descriptors: Vec<Descriptor>,
}

impl DescriptorStore {
    pub fn new(descriptors: Vec<Descriptor>) -> Self {
        Self { descriptors }
    }

    /// Reads a descriptor file.
    pub fn load(path: &Path, confidence_column: usize) -> BofResult<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| BofError::parse(path, format!("cannot read file: {}", e)))?;
        Self::parse_text(&text, confidence_column, path)
    }

    /// Parses descriptor text.
    pub fn parse(text: &str, confidence_column: usize) -> BofResult<Self> {
        Self::parse_text(text, confidence_column, Path::new("<memory>"))
    }

    fn parse_text(text: &str, confidence_column: usize, origin: &Path) -> BofResult<Self> {
        let mut descriptors = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields = trimmed
                .split_whitespace()
                .enumerate()
                .map(|(col, raw)| {
                    raw.parse::<f64>().map_err(|_| {
                        BofError::malformed(
                            line_no,
                            format!("field {} is not numeric: '{}'", col, raw),
                        )
                    })
                })
                .collect::<BofResult<Vec<f64>>>()?;

            if fields.len() < MIN_FIELDS {
                return Err(BofError::malformed(
                    line_no,
                    format!(
                        "expected at least {} fields, found {}",
                        MIN_FIELDS,
                        fields.len()
                    ),
                ));
            }
            if confidence_column >= fields.len() {
                return Err(BofError::malformed(
                    line_no,
                    format!(
                        "confidence column {} is beyond the {} fields of the row",
                        confidence_column,
                        fields.len()
                    ),
                ));
            }

            descriptors.push(Descriptor::from_fields(&fields, confidence_column));
        }

        if descriptors.is_empty() {
            return Err(BofError::parse(origin, "no descriptor rows"));
        }
        Ok(Self { descriptors })
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptors belonging to `stratum`, in file order.
    pub fn in_stratum(&self, stratum: Stratum) -> Vec<&Descriptor> {
        self.descriptors
            .iter()
            .filter(|d| d.stratum() == Some(stratum))
            .collect()
    }

    /// Applies a confidence policy and returns the kept descriptors.
    ///
    /// Selection sorts by descending confidence; equal confidences keep file
    /// order. With [`ConfidencePolicy::PerStratum`], descriptors outside the
    /// canonical strata are never selected.
    pub fn select(&self, policy: ConfidencePolicy, top_n: usize) -> Vec<&Descriptor> {
        match policy {
            ConfidencePolicy::Global => most_confident(self.descriptors.iter().collect(), top_n),
            ConfidencePolicy::PerStratum => Stratum::all()
                .flat_map(|stratum| most_confident(self.in_stratum(stratum), top_n))
                .collect(),
        }
    }
}

fn most_confident(mut descriptors: Vec<&Descriptor>, top_n: usize) -> Vec<&Descriptor> {
    descriptors.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    descriptors.truncate(top_n);
    descriptors
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// A 170-field row with the given scales and confidence.
    fn row(sigma: u32, tau: u32, confidence: f64, fill: f64) -> String {
        let mut fields = vec![0.0; MIN_FIELDS];
        fields[SIGMA_COLUMN] = f64::from(sigma);
        fields[TAU_COLUMN] = f64::from(tau);
        fields[6] = confidence;
        for v in &mut fields[7..] {
            *v = fill;
        }
        fields
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_parse_layout() {
        let mut fields: Vec<f64> = (0..MIN_FIELDS).map(|i| i as f64).collect();
        fields[SIGMA_COLUMN] = 16.0;
        fields[TAU_COLUMN] = 4.0;
        let text = fields
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("\t");

        let store = DescriptorStore::parse(&text, 6).unwrap();
        let d = &store.descriptors()[0];
        assert_eq!(d.stratum(), Some(Stratum::new(16, 4)));
        assert_eq!(d.confidence, 6.0);
        assert_eq!(d.hog.len(), 72);
        assert_eq!(d.hof.len(), 91);
        assert_eq!(d.hog[0], 7.0);
        assert_eq!(d.hof[0], 79.0);
        assert_eq!(d.hof[90], 169.0);
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let text = format!("# point-type x y t sigma tau ...\n\n{}\n", row(4, 2, 1.0, 0.5));
        let store = DescriptorStore::parse(&text, 6).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_short_row_fails_whole_load() {
        let text = format!("{}\n1 2 3 4 5 6\n{}\n", row(4, 2, 1.0, 0.0), row(4, 2, 1.0, 0.0));
        let err = DescriptorStore::parse(&text, 6).unwrap_err();
        assert!(matches!(err, BofError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn test_non_numeric_field() {
        let text = row(4, 2, 1.0, 0.0).replacen("0", "abc", 1);
        let err = DescriptorStore::parse(&text, 6).unwrap_err();
        assert!(matches!(err, BofError::MalformedRecord { line: 1, .. }));
    }

    #[test]
    fn test_only_comments_is_parse_error() {
        let err = DescriptorStore::parse("# header only\n", 6).unwrap_err();
        assert!(matches!(err, BofError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_parse_error() {
        let err = DescriptorStore::load(Path::new("/nonexistent/clip.txt"), 6).unwrap_err();
        assert!(matches!(err, BofError::Parse { .. }));
    }

    #[test]
    fn test_confidence_column_out_of_range() {
        let err = DescriptorStore::parse(&row(4, 2, 1.0, 0.0), 500).unwrap_err();
        assert!(matches!(err, BofError::MalformedRecord { .. }));
    }

    #[test]
    fn test_strata_enumeration_order() {
        let strata: Vec<Stratum> = Stratum::all().collect();
        assert_eq!(strata.len(), 12);
        assert_eq!(strata[0], Stratum::new(4, 2));
        assert_eq!(strata[1], Stratum::new(4, 4));
        assert_eq!(strata[2], Stratum::new(8, 2));
        assert_eq!(strata[11], Stratum::new(128, 4));
    }

    #[test]
    fn test_off_grid_scales_have_no_stratum() {
        assert_eq!(Stratum::from_scales(5.0, 2.0), None);
        assert_eq!(Stratum::from_scales(4.0, 3.0), None);
        assert_eq!(Stratum::from_scales(64.0, 2.0), Some(Stratum::new(64, 2)));
    }

    #[test]
    fn test_global_policy_keeps_most_confident() {
        let text = [
            row(4, 2, 0.1, 1.0),
            row(8, 2, 0.9, 2.0),
            row(4, 2, 0.5, 3.0),
            row(16, 4, 0.9, 4.0),
        ]
        .join("\n");
        let store = DescriptorStore::parse(&text, 6).unwrap();
        let kept = store.select(ConfidencePolicy::Global, 3);
        let fills: Vec<f64> = kept.iter().map(|d| d.hog[0]).collect();
        assert_eq!(fills, vec![2.0, 4.0, 3.0]);
    }

    #[test]
    fn test_per_stratum_policy_limits_each_stratum() {
        let text = [
            row(4, 2, 0.1, 1.0),
            row(4, 2, 0.3, 2.0),
            row(4, 2, 0.2, 3.0),
            row(8, 4, 0.0, 4.0),
            row(5, 2, 1.0, 5.0),
        ]
        .join("\n");
        let store = DescriptorStore::parse(&text, 6).unwrap();
        let kept = store.select(ConfidencePolicy::PerStratum, 2);
        let fills: Vec<f64> = kept.iter().map(|d| d.hog[0]).collect();
        assert_eq!(fills, vec![2.0, 3.0, 4.0]);

        // The global policy may spend its budget on off-grid points.
        let kept = store.select(ConfidencePolicy::Global, 2);
        let fills: Vec<f64> = kept.iter().map(|d| d.hog[0]).collect();
        assert_eq!(fills, vec![5.0, 2.0]);
    }

    #[test]
    fn test_fewer_rows_than_top_n() {
        let text = vec![row(4, 2, 1.0, 0.0); 30].join("\n");
        let store = DescriptorStore::parse(&text, 6).unwrap();
        assert_eq!(store.select(ConfidencePolicy::Global, 400).len(), 30);
        assert_eq!(store.select(ConfidencePolicy::PerStratum, 400).len(), 30);
    }
}
