//! Property-based tests for distance functions and neighbor search.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p vidsift-core --test properties
//! ```

use proptest::prelude::*;

use vidsift_core::distance::{self, assignment, DistanceMetric};
use vidsift_core::{top_k, CorpusEntry, ReferenceCorpus};

/// Non-negative vectors whose length is a multiple of three.
fn point_vector(max_points: usize) -> impl Strategy<Value = Vec<f64>> {
    (1..=max_points).prop_flat_map(|n| prop::collection::vec(0.0f64..256.0, n * 3))
}

/// Two point vectors of the same length.
fn point_pair(max_points: usize) -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (1..=max_points).prop_flat_map(|n| {
        (
            prop::collection::vec(0.0f64..256.0, n * 3),
            prop::collection::vec(0.0f64..256.0, n * 3),
        )
    })
}

/// Cheapest total cost over every permutation of columns.
fn brute_force_cost(costs: &assignment::CostMatrix, n: usize) -> f64 {
    fn permute(
        row: usize,
        cols: &mut Vec<usize>,
        costs: &assignment::CostMatrix,
        best: &mut f64,
    ) {
        if row == cols.len() {
            let total: f64 = cols.iter().enumerate().map(|(r, &c)| costs.get(r, c)).sum();
            *best = best.min(total);
            return;
        }
        for i in row..cols.len() {
            cols.swap(row, i);
            permute(row + 1, cols, costs, best);
            cols.swap(row, i);
        }
    }

    let mut cols: Vec<usize> = (0..n).collect();
    let mut best = f64::INFINITY;
    permute(0, &mut cols, costs, &mut best);
    best
}

// ============================================================================
// 1. Distance Functions
// ============================================================================

proptest! {
    /// Every vector is at distance zero from itself.
    #[test]
    fn self_distance_is_zero(v in point_vector(12)) {
        prop_assert_eq!(distance::euclidean(&v, &v).unwrap(), 0.0);
        prop_assert!(distance::earth_movers(&v, &v).unwrap().abs() < 1e-9);
        if v.iter().any(|x| *x != 0.0) {
            prop_assert!(distance::cosine(&v, &v).unwrap().abs() < 1e-12);
            let h = distance::normalize_unit_mass(&v);
            prop_assert!(distance::intersection(&h, &h).unwrap().abs() < 1e-9);
            prop_assert!(distance::bhattacharyya(&h, &h).unwrap().abs() < 1e-9);
        }
    }

    /// EMD does not depend on operand order.
    #[test]
    fn emd_is_symmetric((a, b) in point_pair(10)) {
        let ab = distance::earth_movers(&a, &b).unwrap();
        let ba = distance::earth_movers(&b, &a).unwrap();
        prop_assert!((ab - ba).abs() < 1e-6 * (1.0 + ab), "{} vs {}", ab, ba);
    }

    /// EMD never exceeds the cost of matching points in their given order.
    #[test]
    fn emd_bounded_by_identity_matching((a, b) in point_pair(10)) {
        let emd = distance::earth_movers(&a, &b).unwrap();
        let identity: f64 = a
            .chunks_exact(3)
            .zip(b.chunks_exact(3))
            .map(|(p, q)| distance::euclidean(p, q).unwrap())
            .sum();
        prop_assert!(emd <= identity * (1.0 + 1e-9) + 1e-9);
    }

    /// The solver returns a permutation whose cost matches the reported total.
    #[test]
    fn assignment_is_a_permutation(
        n in 1usize..8,
        seed in prop::collection::vec(0.0f64..100.0, 64)
    ) {
        let costs = assignment::CostMatrix::from_fn(n, n, |r, c| seed[r * 8 + c]);
        let result = assignment::solve(&costs).unwrap();
        let mut cols = result.row_to_col.clone();
        cols.sort_unstable();
        prop_assert_eq!(cols, (0..n).collect::<Vec<_>>());
        let total: f64 = result
            .row_to_col
            .iter()
            .enumerate()
            .map(|(r, &c)| costs.get(r, c))
            .sum();
        prop_assert!((total - result.cost).abs() < 1e-9);
    }

    /// The solver finds the cheapest matching, including on costs full of ties.
    #[test]
    fn assignment_is_optimal(
        n in 1usize..8,
        seed in prop::collection::vec(0u8..4, 64),
        jitter in prop::collection::vec(0.0f64..1.0, 64),
        tied in any::<bool>()
    ) {
        let costs = assignment::CostMatrix::from_fn(n, n, |r, c| {
            let i = r * 8 + c;
            if tied {
                seed[i] as f64
            } else {
                seed[i] as f64 * 10.0 + jitter[i]
            }
        });
        let result = assignment::solve(&costs).unwrap();
        let best = brute_force_cost(&costs, n);
        prop_assert!((result.cost - best).abs() < 1e-9, "{} vs {}", result.cost, best);
    }

    /// Every metric rejects operands of different lengths.
    #[test]
    fn unequal_lengths_rejected(a in point_vector(4), extra in 1usize..4) {
        let mut b = a.clone();
        b.extend(std::iter::repeat(1.0).take(extra));
        for metric in DistanceMetric::ALL {
            prop_assert!(metric.distance(&a, &b).is_err());
        }
    }
}

// ============================================================================
// 2. Neighbor Search
// ============================================================================

proptest! {
    /// Results are sorted, truncated to k and keep corpus order on ties.
    #[test]
    fn top_k_sorted_and_stable(
        values in prop::collection::vec(0u8..5, 1..40),
        k in 0usize..50
    ) {
        let corpus: Vec<(String, Vec<f64>)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("v{:02}", i), vec![*v as f64]))
            .collect();
        let results = top_k(
            &[0.0],
            corpus.iter().map(|(id, s)| (id.as_str(), s.as_slice())),
            distance::euclidean,
            k,
        )
        .unwrap();

        prop_assert_eq!(results.len(), k.min(values.len()));
        for pair in results.windows(2) {
            prop_assert!(pair[0].distance <= pair[1].distance);
            if pair[0].distance == pair[1].distance {
                prop_assert!(pair[0].identifier < pair[1].identifier);
            }
        }
    }

    /// Reference tables survive a write and read unchanged.
    #[test]
    fn corpus_table_text_is_lossless(
        rows in prop::collection::vec(prop::collection::vec(-1e6f64..1e6, 3), 1..10)
    ) {
        let entries = rows
            .into_iter()
            .enumerate()
            .map(|(i, sig)| {
                CorpusEntry::new(format!("clip {}, take", i), format!("v/{}.avi", i), sig)
            })
            .collect();
        let corpus = ReferenceCorpus::new(entries).unwrap();
        let parsed = ReferenceCorpus::parse(&corpus.to_csv()).unwrap();
        prop_assert_eq!(parsed, corpus);
    }
}
