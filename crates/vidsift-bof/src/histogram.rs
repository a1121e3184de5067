//! Stratified bag-of-features histograms.
//!
//! For every family, the twelve strata are visited in canonical order. Each
//! descriptor of a stratum votes for its nearest center, giving a 40-bin count
//! histogram. A stratum without descriptors or without centers contributes
//! 40 zeros, so every signature has the same layout:
//!
//! ```text
//! [ HOG (4,2) | HOG (4,4) | ... | HOG (128,4) | HOF (4,2) | ... | HOF (128,4) ]
//!     40          40                 40           40                  40
//! ```

use serde::Serialize;

use vidsift_core::{BOF_BINS, BOF_FAMILY_LEN, BOF_SIGNATURE_LEN};

use crate::codebook::{nearest_center, ClusterCodebook};
use crate::descriptor::{Descriptor, Family, Stratum};

/// A bag-of-features signature split by family.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BofSignature {
    pub hog: Vec<f64>,
    pub hof: Vec<f64>,
}

impl BofSignature {
    pub fn zeros() -> Self {
        Self {
            hog: vec![0.0; BOF_FAMILY_LEN],
            hof: vec![0.0; BOF_FAMILY_LEN],
        }
    }

    pub fn family(&self, family: Family) -> &[f64] {
        match family {
            Family::Hog => &self.hog,
            Family::Hof => &self.hof,
        }
    }

    /// The 960-value vector stored in reference tables: HOG half then HOF half.
    pub fn to_vec(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(BOF_SIGNATURE_LEN);
        out.extend_from_slice(&self.hog);
        out.extend_from_slice(&self.hof);
        out
    }
}

/// Quantizes descriptors against a codebook.
#[derive(Debug, Clone, Copy)]
pub struct HistogramAssembler<'a> {
    codebook: &'a ClusterCodebook,
}

impl<'a> HistogramAssembler<'a> {
    pub fn new(codebook: &'a ClusterCodebook) -> Self {
        Self { codebook }
    }

    /// Builds the signature of a descriptor set. The result does not depend on
    /// the order of `descriptors`.
    pub fn assemble<'d, I>(&self, descriptors: I) -> BofSignature
    where
        I: IntoIterator<Item = &'d Descriptor>,
    {
        let descriptors: Vec<&Descriptor> = descriptors.into_iter().collect();
        BofSignature {
            hog: self.family_histogram(Family::Hog, &descriptors),
            hof: self.family_histogram(Family::Hof, &descriptors),
        }
    }

    /// Concatenated per-stratum histograms of one family (480 values).
    pub fn family_histogram(&self, family: Family, descriptors: &[&Descriptor]) -> Vec<f64> {
        let mut out = Vec::with_capacity(BOF_FAMILY_LEN);

        for stratum in Stratum::all() {
            let members: Vec<&Descriptor> = descriptors
                .iter()
                .copied()
                .filter(|d| d.stratum() == Some(stratum))
                .collect();
            let centers = self
                .codebook
                .centers_for(family, stratum.sigma, stratum.tau);

            if centers.is_empty() {
                if !members.is_empty() {
                    tracing::warn!(
                        %family,
                        sigma = stratum.sigma,
                        tau = stratum.tau,
                        descriptors = members.len(),
                        "codebook has no centers for stratum, zero-filling"
                    );
                }
                out.extend(std::iter::repeat(0.0).take(BOF_BINS));
                continue;
            }

            out.extend(stratum_histogram(centers, family, &members));
        }

        enforce_family_len(out, family)
    }
}

fn stratum_histogram(
    centers: &[Vec<f64>],
    family: Family,
    members: &[&Descriptor],
) -> Vec<f64> {
    let mut bins = vec![0.0; BOF_BINS];
    for descriptor in members {
        if let Some(index) = nearest_center(centers, descriptor.features(family)) {
            if let Some(bin) = bins.get_mut(index) {
                *bin += 1.0;
            }
        }
    }
    bins
}

/// Replaces a family histogram of the wrong length with zeros.
pub fn enforce_family_len(histogram: Vec<f64>, family: Family) -> Vec<f64> {
    if histogram.len() == BOF_FAMILY_LEN {
        return histogram;
    }
    tracing::warn!(
        %family,
        found = histogram.len(),
        expected = BOF_FAMILY_LEN,
        "histogram has the wrong length, replacing with zeros"
    );
    vec![0.0; BOF_FAMILY_LEN]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn descriptor(sigma: u32, tau: u32, hog: f64, hof: f64) -> Descriptor {
        Descriptor {
            sigma: f64::from(sigma),
            tau: f64::from(tau),
            confidence: 1.0,
            hog: vec![hog; 72],
            hof: vec![hof; 91],
        }
    }

    /// Center `k` is the constant vector `k`.
    fn ramp_bank(dim: usize) -> Vec<Vec<f64>> {
        (0..BOF_BINS).map(|k| vec![k as f64; dim]).collect()
    }

    fn codebook(strata: &[Stratum]) -> ClusterCodebook {
        let mut codebook = ClusterCodebook::new();
        for stratum in strata {
            codebook.insert(Family::Hog, *stratum, ramp_bank(72)).unwrap();
            codebook.insert(Family::Hof, *stratum, ramp_bank(91)).unwrap();
        }
        codebook
    }

    #[test]
    fn test_votes_land_in_nearest_bin() {
        let codebook = codebook(&Stratum::all().collect::<Vec<_>>());
        let descriptors = vec![
            descriptor(4, 2, 3.1, 0.0),
            descriptor(4, 2, 2.9, 39.0),
            descriptor(8, 4, 10.0, 5.0),
        ];
        let sig = HistogramAssembler::new(&codebook).assemble(&descriptors);

        assert_eq!(sig.hog.len(), 480);
        assert_eq!(sig.hog[3], 2.0);
        // (8, 4) is the fourth stratum.
        assert_eq!(sig.hog[3 * 40 + 10], 1.0);
        assert_eq!(sig.hog.iter().sum::<f64>(), 3.0);
        assert_eq!(sig.hof[0], 1.0);
        assert_eq!(sig.hof[39], 1.0);
        assert_eq!(sig.hof[3 * 40 + 5], 1.0);
    }

    #[test]
    fn test_equidistant_descriptor_takes_lower_center() {
        let codebook = codebook(&[Stratum::new(4, 2)]);
        let sig = HistogramAssembler::new(&codebook).assemble(&[descriptor(4, 2, 2.5, 0.5)]);
        assert_eq!(sig.hog[2], 1.0);
        assert_eq!(sig.hof[0], 1.0);
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let codebook = codebook(&[Stratum::new(4, 2)]);
        let sig = HistogramAssembler::new(&codebook).assemble(&[]);
        assert_eq!(sig, BofSignature::zeros());
        assert_eq!(sig.to_vec().len(), 960);
    }

    #[test]
    fn test_missing_stratum_is_zero_filled() {
        let codebook = codebook(&[Stratum::new(4, 2)]);
        let sig = HistogramAssembler::new(&codebook)
            .assemble(&[descriptor(4, 2, 1.0, 1.0), descriptor(16, 2, 1.0, 1.0)]);
        assert_eq!(sig.hog.iter().sum::<f64>(), 1.0);
        assert!(sig.hog[4 * 40..5 * 40].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_off_grid_descriptors_are_ignored() {
        let codebook = codebook(&[Stratum::new(4, 2)]);
        let sig = HistogramAssembler::new(&codebook).assemble(&[descriptor(6, 2, 1.0, 1.0)]);
        assert_eq!(sig, BofSignature::zeros());
    }

    #[test]
    fn test_to_vec_puts_hog_first() {
        let mut sig = BofSignature::zeros();
        sig.hog[0] = 1.0;
        sig.hof[0] = 2.0;
        let v = sig.to_vec();
        assert_eq!(v[0], 1.0);
        assert_eq!(v[480], 2.0);
    }

    #[test]
    fn test_enforce_family_len_fallback() {
        assert_eq!(enforce_family_len(vec![1.0; 479], Family::Hog), vec![0.0; 480]);
        assert_eq!(enforce_family_len(vec![1.0; 480], Family::Hof), vec![1.0; 480]);
    }
}
