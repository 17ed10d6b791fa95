//! Riemann helix fit quality estimator
//!
//! After R. Frühwirth, A. Strandlie, W. Waltenberger, "Helix fitting by an
//! extended Riemann fit", NIM A490 (2002) 366. The transverse projections
//! are mapped onto the paraboloid `(x, y, x² + y²)`, where circles become
//! planes; the plane normal is the eigenvector of the smallest eigenvalue of
//! the weighted scatter matrix. The longitudinal motion is a weighted
//! straight-line fit of `z` against the arc length along that circle.

use nalgebra::{Matrix3, Vector2, Vector3};

use super::triplet_fit::quality_from_chi_squared;
use super::QualityEstimator;
use crate::common::kinematics::{curvature_sign, pt_from_radius};
use crate::common::regression::weighted_line_fit;
use crate::config::EstimatorConfig;
use crate::errors::EstimatorError;
use crate::types::{Measurement, QualityEstimationResult};

/// Weight used for hits whose uncertainty gives a non-finite weight
const FALLBACK_WEIGHT: f64 = 1e-6;

/// Below this z-component the fitted plane is vertical and the track a
/// straight line in the transverse plane (cm scale)
const STRAIGHT_LINE_NORMAL_Z: f64 = 1e-6;

/// Helix parameters from the extended Riemann fit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiemannFit {
    /// Centre of the transverse circle
    pub center: Vector2<f64>,
    /// Radius of the transverse circle
    pub radius: f64,
    /// `dz / ds` along the direction of travel
    pub tan_lambda: f64,
    /// Fitted z at the first hit
    pub z0: f64,
    /// Weighted squared transverse distances of the hits from the circle
    pub circle_chi_squared: f64,
    /// Weighted squared z residuals of the line fit
    pub line_chi_squared: f64,
}

impl RiemannFit {
    /// Fit a helix through `hits`
    ///
    /// Returns `None` for fewer than 3 hits, for hits on a straight line in
    /// the transverse plane and for hits without arc-length spread.
    pub fn fit(hits: &[Measurement]) -> Option<Self> {
        if hits.len() < 3 {
            return None;
        }

        let (transverse_weights, z_weights): (Vec<f64>, Vec<f64>) = hits
            .iter()
            .map(|hit| {
                let transverse = usable_weight(1.0 / hit.transverse_sigma().powi(2), hit);
                let longitudinal = usable_weight(1.0 / (hit.sigma.z * hit.sigma.z), hit);
                (transverse, longitudinal)
            })
            .unzip();

        let mapped: Vec<Vector3<f64>> = hits
            .iter()
            .map(|hit| {
                let (x, y) = (hit.position.x, hit.position.y);
                Vector3::new(x, y, x * x + y * y)
            })
            .collect();

        // Weighted mean and scatter matrix of the mapped points
        let sum_weights: f64 = transverse_weights.iter().sum();
        let mean: Vector3<f64> = mapped
            .iter()
            .zip(&transverse_weights)
            .fold(Vector3::zeros(), |acc, (p, w)| acc + p * *w)
            / sum_weights;
        let scatter: Matrix3<f64> = mapped
            .iter()
            .zip(&transverse_weights)
            .fold(Matrix3::zeros(), |acc, (p, w)| {
                let d = p - mean;
                acc + d * d.transpose() * *w
            });

        let eigen = scatter.symmetric_eigen();
        let normal: Vector3<f64> = eigen.eigenvectors.column(eigen.eigenvalues.imin()).into_owned();
        if normal.z.abs() < STRAIGHT_LINE_NORMAL_Z {
            log::debug!("Riemann fit: plane normal {:?} is transverse, hits form a straight line", normal);
            return None;
        }

        // Plane: c + n · (x, y, r²) = 0
        let c = -normal.dot(&mean);
        let center = Vector2::new(-0.5 * normal.x / normal.z, -0.5 * normal.y / normal.z);
        let radius = ((1.0 - normal.z * (normal.z + 4.0 * c)) / (4.0 * normal.z * normal.z)).sqrt();
        if !radius.is_finite() {
            log::debug!("Riemann fit: no real circle for plane normal {:?}", normal);
            return None;
        }

        let offsets: Vec<Vector2<f64>> = hits.iter().map(|hit| hit.position.xy() - center).collect();

        let circle_chi_squared: f64 = offsets
            .iter()
            .zip(&transverse_weights)
            .map(|(offset, w)| w * (offset.norm() - radius).powi(2))
            .sum();

        // Unwrapped turning angle from the first hit, positive along the path
        let mut turning = Vec::with_capacity(offsets.len());
        turning.push(0.0);
        for pair in offsets.windows(2) {
            let step = pair[0].perp(&pair[1]).atan2(pair[0].dot(&pair[1]));
            let previous = turning.last().copied().unwrap_or(0.0);
            turning.push(previous + step);
        }
        let orientation = turning.last().copied().unwrap_or(0.0).signum();
        let arc_lengths: Vec<f64> = turning.iter().map(|t| radius * orientation * t).collect();

        let (z0, tan_lambda, line_chi_squared) = weighted_line_fit(
            &arc_lengths,
            &hits.iter().map(|hit| hit.position.z).collect::<Vec<_>>(),
            &z_weights,
        )?;

        Some(Self {
            center,
            radius,
            tan_lambda,
            z0,
            circle_chi_squared,
            line_chi_squared,
        })
    }

    /// Sum of the transverse and longitudinal chi-squared
    #[inline]
    pub fn chi_squared(&self) -> f64 {
        self.circle_chi_squared + self.line_chi_squared
    }
}

fn usable_weight(weight: f64, hit: &Measurement) -> f64 {
    if weight.is_finite() {
        weight
    } else {
        log::debug!(
            "Riemann fit: unusable hit uncertainty {:?}, using weight {}",
            hit.sigma,
            FALLBACK_WEIGHT
        );
        FALLBACK_WEIGHT
    }
}

/// Quality estimator based on the extended Riemann helix fit
///
/// The circle contributes `N - 3` and the line `N - 2` degrees of freedom,
/// so the combined chi-squared is evaluated with `2N - 5`, the same count
/// as the triplet fit.
#[derive(Debug, Clone)]
pub struct RiemannHelixFitEstimator {
    config: EstimatorConfig,
}

impl RiemannHelixFitEstimator {
    /// Create a Riemann helix fit estimator
    pub fn new(config: EstimatorConfig) -> Result<Self, EstimatorError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration the estimator was built with
    #[inline]
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    fn fit(&self, hits: &[Measurement]) -> Option<RiemannFit> {
        if hits.len() < 3 {
            log::debug!("Skipping candidate with {} hits (at least 3 required)", hits.len());
            return None;
        }
        RiemannFit::fit(hits)
    }
}

impl QualityEstimator for RiemannHelixFitEstimator {
    fn estimate_quality(&self, hits: &[Measurement]) -> f64 {
        self.fit(hits).map_or(0.0, |fit| {
            quality_from_chi_squared(fit.chi_squared(), 2 * hits.len() as i32 - 5)
        })
    }

    fn estimate_quality_and_properties(&self, hits: &[Measurement]) -> QualityEstimationResult {
        let Some(fit) = self.fit(hits) else {
            return QualityEstimationResult::unestimated();
        };

        let chi_squared = fit.chi_squared();
        let pt = pt_from_radius(fit.radius, self.config.magnetic_field_z);
        QualityEstimationResult {
            quality_indicator: quality_from_chi_squared(chi_squared, 2 * hits.len() as i32 - 5),
            chi_squared: Some(chi_squared),
            pt: Some(pt),
            p_mag: Some(pt * fit.tan_lambda.hypot(1.0)),
            curvature_sign: Some(curvature_sign(hits)),
        }
    }

    fn name(&self) -> &'static str {
        "helixFit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SensorId;

    fn helix_hits(cx: f64, cy: f64, radius: f64, pitch: f64, phis: &[f64]) -> Vec<Measurement> {
        phis.iter()
            .map(|&p| Measurement::from_xyz(cx + radius * p.cos(), cy + radius * p.sin(), pitch * p, SensorId::NONE))
            .collect()
    }

    #[test]
    fn test_exact_helix() {
        let hits = helix_hits(0.0, 0.0, 5.0, 2.0, &[0.1, 0.4, 0.8, 1.1, 1.5]);
        let fit = RiemannFit::fit(&hits).unwrap();
        assert!((fit.radius - 5.0).abs() < 1e-9);
        assert!(fit.center.norm() < 1e-9);
        assert!((fit.tan_lambda - 0.4).abs() < 1e-9);
        assert!((fit.z0 - 0.2).abs() < 1e-9);
        assert!(fit.chi_squared() < 1e-18);
    }

    #[test]
    fn test_arc_length_unwraps_past_half_turn() {
        // Nearly a full turn around the origin
        let hits = helix_hits(0.0, 0.0, 4.0, 1.0, &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let fit = RiemannFit::fit(&hits).unwrap();
        assert!((fit.radius - 4.0).abs() < 1e-9);
        assert!((fit.tan_lambda - 0.25).abs() < 1e-9);
        assert!(fit.line_chi_squared < 1e-18);
    }

    #[test]
    fn test_clockwise_rising_track_has_positive_slope() {
        // Clockwise in phi while z increases
        let phis: Vec<f64> = (0..6).map(|i| 0.3 - 0.2 * i as f64).collect();
        let hits = helix_hits(2.0, -1.0, 12.0, -3.0, &phis);
        let fit = RiemannFit::fit(&hits).unwrap();
        assert!((fit.center - Vector2::new(2.0, -1.0)).norm() < 1e-9);
        assert!((fit.tan_lambda - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_z_offset_only_affects_line_fit() {
        let mut hits = helix_hits(0.0, 0.0, 5.0, 2.0, &[0.1, 0.4, 0.8, 1.1, 1.5]);
        hits[2].position.z += 0.05;
        let fit = RiemannFit::fit(&hits).unwrap();
        assert!(fit.circle_chi_squared < 1e-18);
        assert!((fit.line_chi_squared - 0.001_999_185_667_752_41).abs() < 1e-9);
    }

    #[test]
    fn test_straight_line_is_rejected() {
        let hits: Vec<Measurement> = (0..4)
            .map(|i| Measurement::from_xyz(i as f64, 2.0 * i as f64, 0.5 * i as f64, SensorId::NONE))
            .collect();
        assert!(RiemannFit::fit(&hits).is_none());
    }
}
