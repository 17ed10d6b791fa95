//! Weighted straight-line regression

/// Weighted least squares `v = intercept + slope · u`
///
/// Returns `(intercept, slope, chi2)` or `None` if `u` has no spread.
pub fn weighted_line_fit(u: &[f64], v: &[f64], weights: &[f64]) -> Option<(f64, f64, f64)> {
    let (mut sw, mut swu, mut swv, mut swuu, mut swuv) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for ((&u, &v), &w) in u.iter().zip(v).zip(weights) {
        sw += w;
        swu += w * u;
        swv += w * v;
        swuu += w * u * u;
        swuv += w * u * v;
    }

    let determinant = sw * swuu - swu * swu;
    if determinant == 0.0 || !determinant.is_finite() {
        return None;
    }

    let slope = (sw * swuv - swu * swv) / determinant;
    let intercept = (swuu * swv - swu * swuv) / determinant;
    let chi_squared: f64 = u
        .iter()
        .zip(v)
        .zip(weights)
        .map(|((&u, &v), &w)| w * (v - intercept - slope * u).powi(2))
        .sum();

    Some((intercept, slope, chi_squared))
}
