//! Track candidate quality estimators
//!
//! Every estimator implements [`QualityEstimator`], so pattern recognition
//! can select one at runtime through [`create_estimator`]:
//!
//! - [`TripletFitEstimator`] - 3D triplet fit with multiple scattering
//! - [`CircleFitEstimator`] - weighted circle fit in the transverse plane
//! - [`RiemannHelixFitEstimator`] - extended Riemann fit (circle plus z line)
//! - [`LineFit3DEstimator`] - straight line for tracks without bending

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::EstimatorConfig;
use crate::errors::EstimatorError;
use crate::geometry::SensorGeometry;
use crate::types::{Measurement, QualityEstimationResult};

pub mod circle_fit;
pub mod line_fit;
pub mod riemann_fit;
pub mod triplet;
pub mod triplet_fit;

pub use circle_fit::{CircleFit, CircleFitEstimator};
pub use line_fit::{LineFit3D, LineFit3DEstimator};
pub use riemann_fit::{RiemannFit, RiemannHelixFitEstimator};
pub use triplet::{TripletFit, TripletGeometry};
pub use triplet_fit::{TrackFit, TripletFitEstimator};

/// Common interface of all quality estimators
///
/// Estimation is infallible: degenerate candidates produce a quality
/// indicator of 0 rather than an error. Implementations hold only immutable
/// configuration and can be shared between threads.
pub trait QualityEstimator: Send + Sync {
    /// Quality indicator in [0, 1]; 0 for fewer than 3 hits
    fn estimate_quality(&self, hits: &[Measurement]) -> f64;

    /// Quality indicator plus whichever kinematic quantities the method provides
    fn estimate_quality_and_properties(&self, hits: &[Measurement]) -> QualityEstimationResult;

    /// Short identifier of the method
    fn name(&self) -> &'static str;
}

impl<E: QualityEstimator + ?Sized> QualityEstimator for Box<E> {
    fn estimate_quality(&self, hits: &[Measurement]) -> f64 {
        (**self).estimate_quality(hits)
    }

    fn estimate_quality_and_properties(&self, hits: &[Measurement]) -> QualityEstimationResult {
        (**self).estimate_quality_and_properties(hits)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Selectable estimation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EstimationMethod {
    /// Triplet fit with multiple scattering
    #[default]
    #[serde(rename = "tripletFit")]
    TripletFit,
    /// Transverse circle fit
    #[serde(rename = "circleFit")]
    CircleFit,
    /// Extended Riemann helix fit
    #[serde(rename = "helixFit")]
    RiemannHelixFit,
    /// Two projected straight-line fits
    #[serde(rename = "lineFit")]
    LineFit3D,
}

impl EstimationMethod {
    /// Identifier used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            EstimationMethod::TripletFit => "tripletFit",
            EstimationMethod::CircleFit => "circleFit",
            EstimationMethod::RiemannHelixFit => "helixFit",
            EstimationMethod::LineFit3D => "lineFit",
        }
    }
}

impl fmt::Display for EstimationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstimationMethod {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tripletFit" => Ok(EstimationMethod::TripletFit),
            "circleFit" => Ok(EstimationMethod::CircleFit),
            "helixFit" => Ok(EstimationMethod::RiemannHelixFit),
            "lineFit" => Ok(EstimationMethod::LineFit3D),
            other => Err(EstimatorError::configuration(format!(
                "unknown estimation method '{}' (expected 'tripletFit', 'circleFit', 'helixFit' or 'lineFit')",
                other
            ))),
        }
    }
}

/// Create an estimator for the given method
///
/// The geometry is only used by methods that need entrance angles; it is
/// shared through an `Arc` so one detector description can back several
/// estimators.
pub fn create_estimator<G>(
    method: EstimationMethod,
    config: EstimatorConfig,
    geometry: Arc<G>,
) -> Result<Box<dyn QualityEstimator>, EstimatorError>
where
    G: SensorGeometry + 'static,
{
    log::debug!("Creating {} estimator (Bz = {} T)", method, config.magnetic_field_z);
    let estimator: Box<dyn QualityEstimator> = match method {
        EstimationMethod::TripletFit => Box::new(TripletFitEstimator::with_geometry(config, geometry)?),
        EstimationMethod::CircleFit => Box::new(CircleFitEstimator::new(config)?),
        EstimationMethod::RiemannHelixFit => Box::new(RiemannHelixFitEstimator::new(config)?),
        EstimationMethod::LineFit3D => Box::new(LineFit3DEstimator::new(config)?),
    };
    Ok(estimator)
}
