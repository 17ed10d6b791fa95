//! Triplet fit quality estimator
//!
//! Splits a candidate into its `N - 2` overlapping triplets, fits each one
//! in closed form (see [`super::triplet`]) and combines them:
//!
//! - the triplet chi-squared values are summed,
//! - the triplet radii are averaged with weights `R² / σ²(R)`,
//! - every radius is compared with that average, and the resulting
//!   compatibility term is added to the chi-squared,
//! - the total is turned into a probability with `2 N - 5` degrees of freedom.
//!
//! All per-triplet buffers live on the stack of one call, so a single
//! estimator can serve any number of threads.

use nalgebra::Vector3;
use smallvec::SmallVec;

use super::triplet::{TripletFit, TripletGeometry};
use super::QualityEstimator;
use crate::common::kinematics::{curvature_sign, pt_from_radius};
use crate::common::stats::chi_squared_probability;
use crate::config::EstimatorConfig;
use crate::errors::EstimatorError;
use crate::geometry::{NoGeometry, SensorGeometry};
use crate::reporter::{FitReporter, NoOpReporter, TrackCombination};
use crate::types::{Measurement, QualityEstimationResult};

/// Triplets kept inline before spilling to the heap (typical candidates
/// have at most 8 hits)
const INLINE_TRIPLETS: usize = 6;

/// Fitted triplets and their combination for one candidate
#[derive(Debug, Clone)]
pub struct TrackFit {
    /// Per-triplet fits, in hit order
    pub triplets: SmallVec<[TripletFit; INLINE_TRIPLETS]>,
    /// Track-level combination
    pub combination: TrackCombination,
}

impl TrackFit {
    /// Mean polar angle, each triplet corrected towards the average radius
    pub fn average_theta_prime(&self) -> f64 {
        let average_r3d = self.combination.average_r3d;
        let sum: f64 = self
            .triplets
            .iter()
            .map(|t| {
                let theta = t.theta();
                theta - (average_r3d - t.r3d) * (1.0 - t.alpha()) / (t.r3d * theta.tan())
            })
            .sum();
        sum / self.triplets.len() as f64
    }
}

/// Quality estimator based on the three-dimensional triplet fit
///
/// The geometry is only used to find the orientation of the middle hit's
/// sensor; with [`NoGeometry`] (the default) every triplet uses its mean
/// polar angle as entrance angle.
#[derive(Debug, Clone)]
pub struct TripletFitEstimator<G = NoGeometry> {
    config: EstimatorConfig,
    geometry: G,
    transverse_radius_cut: f64,
}

impl TripletFitEstimator<NoGeometry> {
    /// Create an estimator without sensor geometry
    pub fn new(config: EstimatorConfig) -> Result<Self, EstimatorError> {
        Self::with_geometry(config, NoGeometry)
    }
}

impl<G: SensorGeometry> TripletFitEstimator<G> {
    /// Create an estimator that looks up sensor planes in `geometry`
    ///
    /// Fails if the configuration is invalid or has no magnetic field, since
    /// the scattering error scales with `1 / Bz`.
    pub fn with_geometry(config: EstimatorConfig, geometry: G) -> Result<Self, EstimatorError> {
        config.validate()?;
        if config.magnetic_field_z == 0.0 {
            return Err(EstimatorError::configuration(
                "the triplet fit requires a non-zero magnetic field",
            ));
        }

        Ok(Self {
            transverse_radius_cut: config.transverse_radius_cut(),
            config,
            geometry,
        })
    }

    /// Configuration the estimator was built with
    #[inline]
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Sensor geometry used for entrance angles
    #[inline]
    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Entrance angle at the middle hit of a triplet
    ///
    /// Virtual points and sensors unknown to the geometry fall back to the
    /// triplet's mean polar angle.
    fn entrance_angle(&self, hit0: &Measurement, hit1: &Measurement, theta: f64) -> f64 {
        if !hit1.sensor.is_physical() {
            return theta;
        }
        match self.geometry.plane_orientation(hit1.sensor) {
            Some(plane) => {
                let direction: Vector3<f64> = hit1.position - hit0.position;
                plane.entrance_angle(&direction)
            }
            None => theta,
        }
    }

    /// Fit all triplets of a candidate and combine them
    ///
    /// Returns `None` for fewer than 3 hits.
    pub fn fit<R: FitReporter>(&self, hits: &[Measurement], reporter: &mut R) -> Option<TrackFit> {
        let num_hits = hits.len();
        if num_hits < 3 {
            reporter.on_skipped(num_hits);
            return None;
        }

        let triplets: SmallVec<[TripletFit; INLINE_TRIPLETS]> = hits
            .windows(3)
            .enumerate()
            .map(|(i, w)| {
                let geometry = TripletGeometry::reconstruct(&w[0].position, &w[1].position, &w[2].position);
                let entrance_angle = self.entrance_angle(&w[0], &w[1], geometry.theta);
                let fit = TripletFit::fit(geometry, entrance_angle, &self.config, self.transverse_radius_cut);
                reporter.on_triplet(i, &fit);
                fit
            })
            .collect();

        let combined_chi_squared: f64 = triplets.iter().map(|t| t.chi_squared).sum();

        let (numerator, denominator) = triplets.iter().fold((0.0, 0.0), |(num, den), t| {
            let r_sq = t.r3d * t.r3d;
            (num + r_sq * t.r3d / t.sigma_r3d_squared, den + r_sq / t.sigma_r3d_squared)
        });
        let average_r3d = numerator / denominator;

        let global_compatibility: f64 = triplets
            .iter()
            .map(|t| (t.r3d - average_r3d).powi(2) / t.sigma_r3d_squared)
            .sum();

        let chi_squared = combined_chi_squared + global_compatibility;
        let degrees_of_freedom = 2 * num_hits as i32 - 5;
        let quality_indicator = quality_from_chi_squared(chi_squared, degrees_of_freedom);

        let combination = TrackCombination {
            num_hits,
            combined_chi_squared,
            average_r3d,
            global_compatibility,
            chi_squared,
            degrees_of_freedom,
            quality_indicator,
        };
        reporter.on_combination(&combination);

        Some(TrackFit {
            triplets,
            combination,
        })
    }

    /// Estimate quality and kinematics, reporting intermediate state
    pub fn estimate_with_reporter<R: FitReporter>(
        &self,
        hits: &[Measurement],
        reporter: &mut R,
    ) -> QualityEstimationResult {
        let Some(track) = self.fit(hits, reporter) else {
            return QualityEstimationResult::unestimated();
        };

        let combination = &track.combination;
        let bz = self.config.magnetic_field_z;
        let theta_prime = track.average_theta_prime();

        QualityEstimationResult {
            quality_indicator: combination.quality_indicator,
            chi_squared: Some(combination.chi_squared),
            pt: Some(pt_from_radius(combination.average_r3d * theta_prime.sin(), bz)),
            p_mag: Some(pt_from_radius(combination.average_r3d, bz)),
            curvature_sign: Some(curvature_sign(hits)),
        }
    }
}

impl<G: SensorGeometry> QualityEstimator for TripletFitEstimator<G> {
    fn estimate_quality(&self, hits: &[Measurement]) -> f64 {
        self.fit(hits, &mut NoOpReporter)
            .map_or(0.0, |track| track.combination.quality_indicator)
    }

    fn estimate_quality_and_properties(&self, hits: &[Measurement]) -> QualityEstimationResult {
        self.estimate_with_reporter(hits, &mut NoOpReporter)
    }

    fn name(&self) -> &'static str {
        "tripletFit"
    }
}

/// Chi-squared probability, with a non-finite chi-squared mapped to 0 so the
/// quality indicator stays inside [0, 1]
pub(crate) fn quality_from_chi_squared(chi_squared: f64, degrees_of_freedom: i32) -> f64 {
    let probability = chi_squared_probability(chi_squared, degrees_of_freedom);
    if probability.is_nan() {
        log::debug!("Non-finite chi-squared {}, quality set to 0", chi_squared);
        0.0
    } else {
        probability
    }
}
