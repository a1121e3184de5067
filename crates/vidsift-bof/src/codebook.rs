//! Precomputed cluster centers, one bank per (family, stratum).
//!
//! ## Table format
//!
//! One comma-separated file per descriptor family, header row optional:
//!
//! ```text
//! label,sigma,tau,dim_0,...,dim_{d-1}
//! s4t2,4,2,0.013,0.002,...
//! ```
//!
//! `d` is the family dimension (72 for HOG, 91 for HOF). A stratum that
//! appears must have exactly 40 rows; strata may be absent.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use vidsift_core::distance::squared_euclidean;
use vidsift_core::BOF_BINS;

use crate::descriptor::{Family, Stratum};
use crate::error::{BofError, BofResult};

/// Centers of one stratum, in table order.
pub type CenterBank = Vec<Vec<f64>>;

/// Cluster centers for both descriptor families.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterCodebook {
    hog: BTreeMap<Stratum, CenterBank>,
    hof: BTreeMap<Stratum, CenterBank>,
}

impl ClusterCodebook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads both family tables.
    pub fn load(hog_path: &Path, hof_path: &Path) -> BofResult<Self> {
        let mut codebook = Self::new();
        codebook.hog = load_family(Family::Hog, hog_path)?;
        codebook.hof = load_family(Family::Hof, hof_path)?;
        Ok(codebook)
    }

    /// Parses the tables of both families from text.
    pub fn parse(hog_text: &str, hof_text: &str) -> BofResult<Self> {
        let origin = Path::new("<memory>");
        Ok(Self {
            hog: parse_family(Family::Hog, hog_text, origin)?,
            hof: parse_family(Family::Hof, hof_text, origin)?,
        })
    }

    /// Adds or replaces one stratum's centers.
    pub fn insert(
        &mut self,
        family: Family,
        stratum: Stratum,
        centers: CenterBank,
    ) -> BofResult<()> {
        check_bank(family, stratum, &centers, Path::new("<memory>"))?;
        self.banks_mut(family).insert(stratum, centers);
        Ok(())
    }

    /// The 40 centers of a stratum, or an empty slice when it is absent.
    pub fn centers_for(&self, family: Family, sigma: u32, tau: u32) -> &[Vec<f64>] {
        self.banks(family)
            .get(&Stratum::new(sigma, tau))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn banks(&self, family: Family) -> &BTreeMap<Stratum, CenterBank> {
        match family {
            Family::Hog => &self.hog,
            Family::Hof => &self.hof,
        }
    }

    fn banks_mut(&mut self, family: Family) -> &mut BTreeMap<Stratum, CenterBank> {
        match family {
            Family::Hog => &mut self.hog,
            Family::Hof => &mut self.hof,
        }
    }
}

/// Index of the center closest to `features` in Euclidean distance.
///
/// Ties go to the lowest index. `None` when `centers` is empty.
pub fn nearest_center(centers: &[Vec<f64>], features: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, center) in centers.iter().enumerate() {
        let d = squared_euclidean(center, features);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((index, d)),
        }
    }
    best.map(|(index, _)| index)
}

fn load_family(family: Family, path: &Path) -> BofResult<BTreeMap<Stratum, CenterBank>> {
    let text = fs::read_to_string(path)
        .map_err(|e| BofError::codebook(path, format!("cannot read file: {}", e)))?;
    parse_family(family, &text, path)
}

fn parse_family(
    family: Family,
    text: &str,
    origin: &Path,
) -> BofResult<BTreeMap<Stratum, CenterBank>> {
    let expected_fields = 3 + family.dim();
    let mut banks: BTreeMap<Stratum, CenterBank> = BTreeMap::new();
    let mut seen_data = false;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();

        if !seen_data && fields.get(1).map_or(true, |f| f.parse::<f64>().is_err()) {
            // header row
            seen_data = true;
            continue;
        }
        seen_data = true;

        if fields.len() != expected_fields {
            return Err(BofError::codebook(
                origin,
                format!(
                    "line {}: expected {} fields for {} centers, found {}",
                    line_no,
                    expected_fields,
                    family,
                    fields.len()
                ),
            ));
        }

        let numbers = fields[1..]
            .iter()
            .map(|raw| {
                raw.parse::<f64>().map_err(|_| {
                    BofError::codebook(
                        origin,
                        format!("line {}: '{}' is not numeric", line_no, raw),
                    )
                })
            })
            .collect::<BofResult<Vec<f64>>>()?;

        let stratum = Stratum::from_scales(numbers[0], numbers[1]).ok_or_else(|| {
            BofError::codebook(
                origin,
                format!(
                    "line {}: sigma {} / tau {} is not a known stratum",
                    line_no, numbers[0], numbers[1]
                ),
            )
        })?;

        banks
            .entry(stratum)
            .or_default()
            .push(numbers[2..].to_vec());
    }

    for (stratum, centers) in &banks {
        check_bank(family, *stratum, centers, origin)?;
    }
    Ok(banks)
}

fn check_bank(
    family: Family,
    stratum: Stratum,
    centers: &[Vec<f64>],
    origin: &Path,
) -> BofResult<()> {
    if centers.len() != BOF_BINS {
        return Err(BofError::codebook(
            origin,
            format!(
                "{} stratum {} has {} centers, expected {}",
                family,
                stratum,
                centers.len(),
                BOF_BINS
            ),
        ));
    }
    if let Some(bad) = centers.iter().find(|c| c.len() != family.dim()) {
        return Err(BofError::codebook(
            origin,
            format!(
                "{} stratum {} has a center of dimension {}, expected {}",
                family,
                stratum,
                bad.len(),
                family.dim()
            ),
        ));
    }
    Ok(())
}
