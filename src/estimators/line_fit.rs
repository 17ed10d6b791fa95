//! Straight-line quality estimator
//!
//! For tracks without (or with negligible) bending, such as test-beam
//! setups where the beam runs along x and the sensors measure y and z. The
//! track is modelled as two independent weighted lines `y = a·x + b` and
//! `z = c·x + d` whose chi-squared values add up.

use nalgebra::Vector3;

use super::triplet_fit::quality_from_chi_squared;
use super::QualityEstimator;
use crate::common::regression::weighted_line_fit;
use crate::config::EstimatorConfig;
use crate::errors::EstimatorError;
use crate::types::{Measurement, QualityEstimationResult};

/// Weight used for hits whose uncertainty gives a non-finite weight
const FALLBACK_WEIGHT: f64 = 1e-6;

/// Parameters of the two projected line fits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit3D {
    pub slope_y: f64,
    pub intercept_y: f64,
    pub slope_z: f64,
    pub intercept_z: f64,
    /// Sum of the chi-squared of both projections
    pub chi_squared: f64,
}

impl LineFit3D {
    /// Fit both projections of `hits` against x
    ///
    /// Returns `None` if the hits have no spread in x, i.e. the track runs
    /// perpendicular to the x axis.
    pub fn fit(hits: &[Measurement]) -> Option<Self> {
        let xs: Vec<f64> = hits.iter().map(|hit| hit.position.x).collect();
        let ys: Vec<f64> = hits.iter().map(|hit| hit.position.y).collect();
        let zs: Vec<f64> = hits.iter().map(|hit| hit.position.z).collect();
        let y_weights: Vec<f64> = hits.iter().map(|hit| weight(hit.sigma.y, hit)).collect();
        let z_weights: Vec<f64> = hits.iter().map(|hit| weight(hit.sigma.z, hit)).collect();

        let (intercept_y, slope_y, chi_squared_y) = weighted_line_fit(&xs, &ys, &y_weights)?;
        let (intercept_z, slope_z, chi_squared_z) = weighted_line_fit(&xs, &zs, &z_weights)?;

        Some(Self {
            slope_y,
            intercept_y,
            slope_z,
            intercept_z,
            chi_squared: chi_squared_y + chi_squared_z,
        })
    }

    /// Unit direction of the fitted line, pointing towards increasing x
    pub fn direction(&self) -> Vector3<f64> {
        Vector3::new(1.0, self.slope_y, self.slope_z).normalize()
    }
}

fn weight(sigma: f64, hit: &Measurement) -> f64 {
    let weight = 1.0 / (sigma * sigma);
    if weight.is_finite() {
        weight
    } else {
        log::debug!("Line fit: unusable hit uncertainty {:?}, using weight {}", hit.sigma, FALLBACK_WEIGHT);
        FALLBACK_WEIGHT
    }
}

/// Quality estimator based on a straight line in 3D
///
/// Each projection fits two parameters, so the combined chi-squared has
/// `2N - 4` degrees of freedom. No momentum is available without bending.
#[derive(Debug, Clone)]
pub struct LineFit3DEstimator {
    config: EstimatorConfig,
}

impl LineFit3DEstimator {
    /// Create a straight-line estimator
    pub fn new(config: EstimatorConfig) -> Result<Self, EstimatorError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration the estimator was built with
    #[inline]
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    fn fit(&self, hits: &[Measurement]) -> Option<LineFit3D> {
        if hits.len() < 3 {
            log::debug!("Skipping candidate with {} hits (at least 3 required)", hits.len());
            return None;
        }
        let fit = LineFit3D::fit(hits);
        if fit.is_none() {
            log::debug!("Line fit: hits have no spread along x, no fit possible");
        }
        fit
    }
}

impl QualityEstimator for LineFit3DEstimator {
    fn estimate_quality(&self, hits: &[Measurement]) -> f64 {
        self.fit(hits)
            .map_or(0.0, |fit| quality_from_chi_squared(fit.chi_squared, 2 * hits.len() as i32 - 4))
    }

    fn estimate_quality_and_properties(&self, hits: &[Measurement]) -> QualityEstimationResult {
        let Some(fit) = self.fit(hits) else {
            return QualityEstimationResult::unestimated();
        };

        QualityEstimationResult {
            quality_indicator: quality_from_chi_squared(fit.chi_squared, 2 * hits.len() as i32 - 4),
            chi_squared: Some(fit.chi_squared),
            ..QualityEstimationResult::default()
        }
    }

    fn name(&self) -> &'static str {
        "lineFit"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SensorId;

    fn line_hits(slope_y: f64, slope_z: f64, xs: &[f64]) -> Vec<Measurement> {
        xs.iter()
            .map(|&x| Measurement::from_xyz(x, 1.0 + slope_y * x, -2.0 + slope_z * x, SensorId::NONE))
            .collect()
    }

    #[test]
    fn test_exact_line() {
        let hits = line_hits(0.5, -0.25, &[0.0, 2.0, 4.0, 6.0, 8.0]);
        let fit = LineFit3D::fit(&hits).unwrap();
        assert!((fit.slope_y - 0.5).abs() < 1e-12);
        assert!((fit.intercept_y - 1.0).abs() < 1e-12);
        assert!((fit.slope_z + 0.25).abs() < 1e-12);
        assert!((fit.intercept_z + 2.0).abs() < 1e-12);
        assert!(fit.chi_squared < 1e-20);

        let direction = fit.direction();
        assert!((direction.norm() - 1.0).abs() < 1e-12);
        assert!((direction.y / direction.x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_chi2_adds_both_projections() {
        let mut hits = line_hits(0.0, 0.0, &[0.0, 1.0, 2.0]);
        hits[1].position.y += 1.0;
        let y_only = LineFit3D::fit(&hits).unwrap().chi_squared;
        hits[1].position.z += 1.0;
        let both = LineFit3D::fit(&hits).unwrap().chi_squared;
        // Residuals -1/3, 2/3, -1/3 in each projection
        assert!((y_only - 2.0 / 3.0).abs() < 1e-12);
        assert!((both - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_track_perpendicular_to_x_is_rejected() {
        let hits: Vec<Measurement> = (0..4)
            .map(|i| Measurement::from_xyz(3.0, i as f64, i as f64, SensorId::NONE))
            .collect();
        assert!(LineFit3D::fit(&hits).is_none());

        let estimator = LineFit3DEstimator::new(EstimatorConfig::default()).unwrap();
        assert_eq!(estimator.estimate_quality(&hits), 0.0);
    }

    #[test]
    fn test_quality_uses_two_parameters_per_projection() {
        let mut hits = line_hits(0.0, 0.0, &[0.0, 1.0, 2.0]);
        hits[1].position.y += 1.0;
        let estimator = LineFit3DEstimator::new(EstimatorConfig::default()).unwrap();
        // 3 hits leave 2 degrees of freedom: Q = exp(-chi2 / 2)
        let expected = (-1.0_f64 / 3.0).exp();
        assert!((estimator.estimate_quality(&hits) - expected).abs() < 1e-12);
    }
}
