//! Chi-squared statistics
//!
//! Converts a chi-squared value into the upper-tail probability of the
//! chi-squared distribution, `Q(dof / 2, chi2 / 2)`.

use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Probability that a chi-squared distributed variable with `dof` degrees
/// of freedom exceeds `chi2`.
///
/// Conventions:
/// - `dof <= 0` returns 0 (nothing can be tested)
/// - `chi2 == 0` returns 1, negative `chi2` returns 0
/// - NaN propagates
pub fn chi_squared_probability(chi2: f64, dof: i32) -> f64 {
    if dof <= 0 {
        return 0.0;
    }
    if chi2.is_nan() {
        return f64::NAN;
    }
    if chi2 < 0.0 {
        return 0.0;
    }
    if chi2 == 0.0 {
        return 1.0;
    }
    if chi2.is_infinite() {
        return 0.0;
    }

    ChiSquared::new(f64::from(dof)).map_or(0.0, |distribution| distribution.sf(chi2).clamp(0.0, 1.0))
}
