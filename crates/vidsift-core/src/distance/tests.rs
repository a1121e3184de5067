//! Unit tests for distance functions.

use super::*;

fn ramp(len: usize) -> Vec<f64> {
    (0..len).map(|i| ((i * 37) % 101) as f64 / 101.0).collect()
}

#[test]
fn test_identical_signatures_cosine_and_euclidean_zero() {
    let v = ramp(1728);
    assert_eq!(cosine(&v, &v).unwrap(), 0.0);
    assert_eq!(euclidean(&v, &v).unwrap(), 0.0);
}

#[test]
fn test_cosine_orthogonal_and_opposite() {
    assert!((cosine(&[1.0, 0.0], &[0.0, 1.0]).unwrap() - 1.0).abs() < 1e-12);
    assert!((cosine(&[1.0, 2.0], &[-1.0, -2.0]).unwrap() - 2.0).abs() < 1e-12);
}

#[test]
fn test_cosine_scale_invariant() {
    let d = cosine(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
    assert!(d.abs() < 1e-12, "got {}", d);
}

#[test]
fn test_cosine_zero_norm_is_degenerate() {
    let err = cosine(&[0.0, 0.0], &[1.0, 1.0]).unwrap_err();
    assert!(matches!(err, CoreError::DegenerateVector("first operand")));
    let err = cosine(&[1.0, 1.0], &[0.0, 0.0]).unwrap_err();
    assert!(matches!(err, CoreError::DegenerateVector("second operand")));
}

#[test]
fn test_euclidean_known_value() {
    assert_eq!(euclidean(&[0.0, 0.0], &[3.0, 4.0]).unwrap(), 5.0);
}

#[test]
fn test_dimension_mismatch_for_every_metric() {
    for metric in DistanceMetric::ALL {
        let err = metric.distance(&[1.0, 2.0, 3.0], &[1.0, 2.0]).unwrap_err();
        assert!(
            matches!(err, CoreError::DimensionMismatch { expected: 3, found: 2 }),
            "{} returned {:?}",
            metric,
            err
        );
    }
}

#[test]
fn test_intersection_unit_mass() {
    let u = [0.5, 0.25, 0.25];
    assert!(intersection(&u, &u).unwrap().abs() < 1e-12);
    let v = [0.0, 0.5, 0.5];
    assert!((intersection(&u, &v).unwrap() - 0.5).abs() < 1e-12);
}

#[test]
fn test_intersection_disjoint() {
    assert_eq!(intersection(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 1.0);
}

#[test]
fn test_bhattacharyya_identical_is_epsilon_only() {
    let u = [0.25, 0.25, 0.5];
    let d = bhattacharyya(&u, &u).unwrap();
    assert!(d.abs() < 1e-9, "got {}", d);
}

#[test]
fn test_bhattacharyya_disjoint_is_large_but_finite() {
    let d = bhattacharyya(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
    assert!((d - -(BHATTACHARYYA_EPSILON.ln())).abs() < 1e-9);
    assert!(d.is_finite());
}

#[test]
fn test_emd_identity_and_known_value() {
    let a = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0];
    assert_eq!(earth_movers(&a, &a).unwrap(), 0.0);

    // Same points, swapped order: the matching undoes the permutation.
    let b = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
    assert_eq!(earth_movers(&a, &b).unwrap(), 0.0);

    // One point moved by (0, 3, 4).
    let c = [0.0, 3.0, 4.0, 1.0, 0.0, 0.0];
    assert!((earth_movers(&a, &c).unwrap() - 5.0).abs() < 1e-12);
}

#[test]
fn test_emd_symmetric() {
    let a = ramp(30);
    let b: Vec<f64> = ramp(30).iter().rev().map(|x| x * 0.7 + 0.1).collect();
    let ab = earth_movers(&a, &b).unwrap();
    let ba = earth_movers(&b, &a).unwrap();
    assert!((ab - ba).abs() < 1e-9, "{} vs {}", ab, ba);
}

#[test]
fn test_emd_requires_triplets() {
    let err = earth_movers(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 4.0]).unwrap_err();
    assert!(matches!(err, CoreError::InvalidShape { len: 4 }));
}

#[test]
fn test_metric_parse_roundtrip() {
    for metric in DistanceMetric::ALL {
        assert_eq!(metric.as_str().parse::<DistanceMetric>().unwrap(), metric);
    }
    assert_eq!("EMD".parse::<DistanceMetric>().unwrap(), DistanceMetric::EarthMovers);
    assert!(matches!(
        "manhattan".parse::<DistanceMetric>(),
        Err(CoreError::UnknownMetric(_))
    ));
}

#[test]
fn test_histogram_metric_flag() {
    assert!(DistanceMetric::Intersection.is_histogram_metric());
    assert!(DistanceMetric::Bhattacharyya.is_histogram_metric());
    assert!(!DistanceMetric::EarthMovers.is_histogram_metric());
    assert!(!DistanceMetric::Cosine.is_histogram_metric());
}

#[test]
fn test_normalize_unit_mass() {
    let n = normalize_unit_mass(&[2.0, 2.0, 4.0]);
    assert_eq!(n, vec![0.25, 0.25, 0.5]);
    assert_eq!(normalize_unit_mass(&[0.0, 0.0]), vec![0.0, 0.0]);
}
