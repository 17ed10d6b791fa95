//! Assertion functions for numerical comparisons with tolerance

use track_quality::QualityEstimationResult;

/// Compare scalar values with tolerance
pub fn assert_scalar_close(actual: f64, expected: f64, tolerance: f64, field_name: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{}: expected {}, got {} (diff: {}, tolerance: {})",
        field_name,
        expected,
        actual,
        diff,
        tolerance
    );
}

/// Assert that a result carries no estimate at all
pub fn assert_unestimated(result: &QualityEstimationResult, context: &str) {
    assert_eq!(result.quality_indicator, 0.0, "{}: quality", context);
    assert!(result.chi_squared.is_none(), "{}: chi_squared set", context);
    assert!(result.pt.is_none(), "{}: pt set", context);
    assert!(result.p_mag.is_none(), "{}: p_mag set", context);
    assert!(result.curvature_sign.is_none(), "{}: curvature_sign set", context);
}
