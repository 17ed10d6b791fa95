//! Measurement and result types
//!
//! A candidate is an ordered slice of [`Measurement`]s; the estimators only
//! borrow it for the duration of one call.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Identifier of the detector plane a measurement originates from
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct SensorId(pub u32);

impl SensorId {
    /// Marks a measurement that belongs to no physical sensor (e.g. a virtual
    /// interaction point). The geometry is never queried for it.
    pub const NONE: SensorId = SensorId(0);

    /// Create a sensor identifier
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Whether this identifier refers to a physical sensor
    #[inline]
    pub fn is_physical(self) -> bool {
        self != Self::NONE
    }
}

impl From<u32> for SensorId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A single 3D hit in the global frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Global position (cm)
    pub position: Vector3<f64>,
    /// Per-axis position uncertainty (cm), used by weighted fits
    pub sigma: Vector3<f64>,
    /// Originating sensor
    pub sensor: SensorId,
}

impl Measurement {
    /// Create a measurement with unit position uncertainty
    pub fn new(position: Vector3<f64>, sensor: SensorId) -> Self {
        Self {
            position,
            sigma: Vector3::repeat(1.0),
            sensor,
        }
    }

    /// Create a measurement from coordinates
    pub fn from_xyz(x: f64, y: f64, z: f64, sensor: SensorId) -> Self {
        Self::new(Vector3::new(x, y, z), sensor)
    }

    /// Replace the position uncertainty
    pub fn with_sigma(mut self, sigma: Vector3<f64>) -> Self {
        self.sigma = sigma;
        self
    }

    /// Transverse (x, y) uncertainty, `sqrt(σx² + σy²)`
    #[inline]
    pub fn transverse_sigma(&self) -> f64 {
        self.sigma.x.hypot(self.sigma.y)
    }
}

/// Outcome of one quality estimation
///
/// The kinematic fields are `None` when nothing was computed (fewer than
/// three hits, or an estimator that does not provide the quantity), which
/// keeps "not computed" apart from "computed and zero".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityEstimationResult {
    /// Quality indicator in [0, 1]
    pub quality_indicator: f64,
    /// Final chi-squared the quality indicator was derived from
    pub chi_squared: Option<f64>,
    /// Transverse momentum magnitude (GeV/c)
    pub pt: Option<f64>,
    /// Total momentum magnitude (GeV/c)
    pub p_mag: Option<f64>,
    /// Sign of the transverse curvature: -1, +1 or 0 for straight paths
    pub curvature_sign: Option<i8>,
}

impl QualityEstimationResult {
    /// Result for a candidate that could not be estimated
    pub fn unestimated() -> Self {
        Self::default()
    }

    /// Whether the estimator produced a chi-squared for this candidate
    #[inline]
    pub fn is_estimated(&self) -> bool {
        self.chi_squared.is_some()
    }
}
