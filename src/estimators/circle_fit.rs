//! Transverse circle fit quality estimator
//!
//! Non-iterative weighted circle fit after V. Karimäki, "Effective circle
//! fitting for particle trajectories", NIM A305 (1991) 187. Only the (x, y)
//! projection of the hits is used, so the estimator provides a transverse
//! momentum but no total momentum.

use std::f64::consts::PI;

use super::triplet_fit::quality_from_chi_squared;
use super::QualityEstimator;
use crate::common::kinematics::{curvature_sign, pt_from_radius};
use crate::config::EstimatorConfig;
use crate::errors::EstimatorError;
use crate::types::{Measurement, QualityEstimationResult};

/// Weight used for hits whose uncertainty gives a non-finite weight
const FALLBACK_WEIGHT: f64 = 1e-9;

/// Fixed quality for exactly three hits, which always lie on a circle
const THREE_HIT_QUALITY: f64 = 0.2;

/// Parameters of a fitted circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleFit {
    /// Azimuth of the circle direction at the point of closest approach
    pub poca_phi: f64,
    /// Signed distance of closest approach to the origin
    pub poca_d: f64,
    /// Signed curvature `1 / R`, sign matching [`curvature_sign`]
    pub curvature: f64,
    /// Weighted chi-squared of the fit (never negative)
    pub chi_squared: f64,
}

impl CircleFit {
    /// Fit a circle through the transverse projections of `hits`
    ///
    /// Returns `None` if the radial spread of the hits vanishes, which
    /// happens when the hits lie on a circle centred on the origin.
    pub fn fit(hits: &[Measurement]) -> Option<Self> {
        let mut sum_weights = 0.0;
        let (mut mx, mut my, mut mxy, mut mx2, mut my2) = (0.0, 0.0, 0.0, 0.0, 0.0);
        let (mut mxr2, mut myr2, mut mr2, mut mr4) = (0.0, 0.0, 0.0, 0.0);

        for hit in hits {
            let mut weight = 1.0 / hit.transverse_sigma();
            if !weight.is_finite() {
                log::debug!(
                    "Circle fit: unusable hit uncertainty {:?}, using weight {}",
                    hit.sigma,
                    FALLBACK_WEIGHT
                );
                weight = FALLBACK_WEIGHT;
            }
            let (x, y) = (hit.position.x, hit.position.y);
            let r2 = x * x + y * y;

            sum_weights += weight;
            mx += weight * x;
            my += weight * y;
            mxy += weight * x * y;
            mx2 += weight * x * x;
            my2 += weight * y * y;
            mxr2 += weight * x * r2;
            myr2 += weight * y * r2;
            mr2 += weight * r2;
            mr4 += weight * r2 * r2;
        }

        let divisor = 1.0 / sum_weights;
        let [mx, my, mxy, mx2, my2, mxr2, myr2, mr2, mr4] =
            [mx, my, mxy, mx2, my2, mxr2, myr2, mr2, mr4].map(|m| m * divisor);

        let cov_xx = mx2 - mx * mx;
        let cov_xy = mxy - mx * my;
        let cov_yy = my2 - my * my;
        let cov_xr2 = mxr2 - mx * mr2;
        let cov_yr2 = myr2 - my * mr2;
        let cov_r2r2 = mr4 - mr2 * mr2;

        if cov_r2r2 == 0.0 {
            return None;
        }

        let q1 = cov_r2r2 * cov_xy - cov_xr2 * cov_yr2;
        let q2 = cov_r2r2 * (cov_xx - cov_yy) - cov_xr2 * cov_xr2 + cov_yr2 * cov_yr2;

        let mut poca_phi = 0.5 * (2.0 * q1).atan2(q2);
        let (sin_phi, cos_phi) = poca_phi.sin_cos();

        let kappa = (sin_phi * cov_xr2 - cos_phi * cov_yr2) / cov_r2r2;
        let delta = -kappa * mr2 + sin_phi * mx - cos_phi * my;
        let root = (1.0 - 4.0 * delta * kappa).sqrt();

        let mut curvature = 2.0 * kappa / root;
        let mut poca_d = 2.0 * delta / (1.0 + root);

        let chi_squared = sum_weights
            * (1.0 + curvature * poca_d).powi(2)
            * (sin_phi * sin_phi * cov_xx - 2.0 * sin_phi * cos_phi * cov_xy + cos_phi * cos_phi * cov_yy
                - kappa * kappa * cov_r2r2);

        // The fit leaves the orientation open; follow the hit order
        let sign = f64::from(curvature_sign(hits));
        if sign != 0.0 && curvature * sign < 0.0 {
            curvature = -curvature;
            poca_phi += PI;
            poca_d = -poca_d;
        }

        Some(Self {
            poca_phi,
            poca_d,
            curvature,
            // Exact circles can round to tiny negative values
            chi_squared: chi_squared.max(0.0),
        })
    }

    /// Radius of the fitted circle
    #[inline]
    pub fn radius(&self) -> f64 {
        1.0 / self.curvature.abs()
    }
}

/// Quality estimator based on a transverse circle fit
///
/// The chi-squared is evaluated with `N - 3` degrees of freedom. Three hits
/// leave nothing to test and get a fixed, low quality.
#[derive(Debug, Clone)]
pub struct CircleFitEstimator {
    config: EstimatorConfig,
}

impl CircleFitEstimator {
    /// Create a circle fit estimator
    pub fn new(config: EstimatorConfig) -> Result<Self, EstimatorError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration the estimator was built with
    #[inline]
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    fn quality(&self, num_hits: usize, fit: &CircleFit) -> f64 {
        if num_hits == 3 {
            THREE_HIT_QUALITY
        } else {
            quality_from_chi_squared(fit.chi_squared, num_hits as i32 - 3)
        }
    }

    fn fit(&self, hits: &[Measurement]) -> Option<CircleFit> {
        if hits.len() < 3 {
            log::debug!("Skipping candidate with {} hits (at least 3 required)", hits.len());
            return None;
        }
        let fit = CircleFit::fit(hits);
        if fit.is_none() {
            log::debug!("Circle fit: hits lie on a circle around the origin, no fit possible");
        }
        fit
    }
}

impl QualityEstimator for CircleFitEstimator {
    fn estimate_quality(&self, hits: &[Measurement]) -> f64 {
        self.fit(hits).map_or(0.0, |fit| self.quality(hits.len(), &fit))
    }

    fn estimate_quality_and_properties(&self, hits: &[Measurement]) -> QualityEstimationResult {
        let Some(fit) = self.fit(hits) else {
            return QualityEstimationResult::unestimated();
        };

        QualityEstimationResult {
            quality_indicator: self.quality(hits.len(), &fit),
            chi_squared: Some(fit.chi_squared),
            pt: Some(pt_from_radius(fit.radius(), self.config.magnetic_field_z)),
            p_mag: None,
            curvature_sign: Some(curvature_sign(hits)),
        }
    }

    fn name(&self) -> &'static str {
        "circleFit"
    }
}
