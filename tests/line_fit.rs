//! Integration tests for the straight-line estimator

mod helpers;

use nalgebra::Vector3;

use helpers::assertions::{assert_scalar_close, assert_unestimated};
use helpers::candidates::{hits_from_points, Helix};
use track_quality::{EstimatorConfig, LineFit3DEstimator, Measurement, QualityEstimator, SensorId};

fn estimator() -> LineFit3DEstimator {
    LineFit3DEstimator::new(EstimatorConfig::default()).unwrap()
}

/// Beam along x, five planes 10 cm apart
fn beam_track(dy: f64, dz: f64) -> Vec<Measurement> {
    (0..5)
        .map(|i| {
            let x = 10.0 * i as f64;
            Measurement::from_xyz(x, 0.3 + dy * x, -0.1 + dz * x, SensorId::new(i + 1))
                .with_sigma(Vector3::new(1.0, 0.002, 0.004))
        })
        .collect()
}

#[test]
fn test_exact_line() {
    let result = estimator().estimate_quality_and_properties(&beam_track(0.01, -0.02));
    assert!(result.chi_squared.unwrap() < 1e-12);
    assert_scalar_close(result.quality_indicator, 1.0, 1e-9, "quality");
    assert!(result.pt.is_none());
    assert!(result.p_mag.is_none());
    assert!(result.curvature_sign.is_none());
}

#[test]
fn test_displacement_in_units_of_sigma() {
    let estimator = estimator();
    let mut previous = 1.0;
    for pulls in [0.5, 1.0, 2.0, 4.0] {
        let mut hits = beam_track(0.01, -0.02);
        hits[2].position.y += pulls * 0.002;
        let quality = estimator.estimate_quality(&hits);
        assert!(quality < previous, "{} sigma", pulls);
        previous = quality;
    }
}

#[test]
fn test_curved_track_is_rejected_by_quality() {
    let hits: Vec<Measurement> = Helix::new(5.0, 2.0)
        .hits(&[0.1, 0.4, 0.8, 1.1, 1.5])
        .into_iter()
        .map(|hit| hit.with_sigma(Vector3::new(0.01, 0.01, 0.01)))
        .collect();
    let quality = estimator().estimate_quality(&hits);
    assert!(quality < 1e-6);
}

#[test]
fn test_fewer_than_three_hits() {
    let estimator = estimator();
    let all = hits_from_points(&[[0.0, 0.0, 0.0], [1.0, 1.0, 0.0]]);
    for n in 0..=2 {
        assert_eq!(estimator.estimate_quality(&all[..n]), 0.0);
        assert_unestimated(
            &estimator.estimate_quality_and_properties(&all[..n]),
            &format!("{} hits", n),
        );
    }
}
