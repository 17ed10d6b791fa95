//! Estimator configuration
//!
//! The configuration is an immutable value handed to an estimator at
//! construction. Changing the field strength means building a new
//! configuration (and a new estimator), so in-flight estimations can never
//! observe a half-updated setup.

use serde::{Deserialize, Serialize};

use crate::common::kinematics::radius_from_pt;
use crate::errors::EstimatorError;

/// Default magnetic field along the detector axis (T)
pub const DEFAULT_MAGNETIC_FIELD_Z: f64 = 1.5;

/// Default scaling applied to the average material budget
pub const DEFAULT_MATERIAL_BUDGET_FACTOR: f64 = 1.45;

/// Average material budget of one silicon strip sensor (0.57% X0)
pub const DEFAULT_AVERAGE_MATERIAL_BUDGET: f64 = 0.0057;

/// Default momentum cut-off regularizing the scattering error (GeV/c)
pub const DEFAULT_MAX_PT: f64 = 0.01;

/// Configuration shared by all quality estimators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Signed magnetic field along the symmetry axis (T)
    pub magnetic_field_z: f64,
    /// Multiplier applied to the average material budget
    pub material_budget_factor: f64,
    /// Average radiation-length fraction X/X0 of one sensor
    pub average_material_budget: f64,
    /// Transverse momentum above which the scattering error no longer shrinks (GeV/c)
    pub max_pt: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            magnetic_field_z: DEFAULT_MAGNETIC_FIELD_Z,
            material_budget_factor: DEFAULT_MATERIAL_BUDGET_FACTOR,
            average_material_budget: DEFAULT_AVERAGE_MATERIAL_BUDGET,
            max_pt: DEFAULT_MAX_PT,
        }
    }
}

impl EstimatorConfig {
    /// Create a new configuration builder
    pub fn builder() -> EstimatorConfigBuilder {
        EstimatorConfigBuilder::new()
    }

    /// Default configuration with a different field strength
    pub fn with_magnetic_field(magnetic_field_z: f64) -> Result<Self, EstimatorError> {
        Self::builder().magnetic_field_z(magnetic_field_z).build()
    }

    /// Check every field for a usable value
    pub fn validate(&self) -> Result<(), EstimatorError> {
        if !self.magnetic_field_z.is_finite() {
            return Err(EstimatorError::configuration(format!(
                "magnetic_field_z must be finite, got {}",
                self.magnetic_field_z
            )));
        }
        for (name, value) in [
            ("material_budget_factor", self.material_budget_factor),
            ("average_material_budget", self.average_material_budget),
            ("max_pt", self.max_pt),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(EstimatorError::configuration(format!(
                    "{} must be positive and finite, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Transverse radius of a track carrying `max_pt` in the configured field
    #[inline]
    pub fn transverse_radius_cut(&self) -> f64 {
        radius_from_pt(self.max_pt, self.magnetic_field_z)
    }

    /// 3D radius cut for a track segment with polar angle `theta`
    ///
    /// `max_pt` limits the transverse momentum, so the helix radius it allows
    /// grows as `1 / sin(theta)` away from the transverse plane.
    #[inline]
    pub fn r3d_max_cut(&self, theta: f64) -> f64 {
        self.transverse_radius_cut() / theta.sin()
    }

    /// Effective radiation-length fraction crossed at the given entrance angle
    ///
    /// The absolute cosine is used so that back-side entries see the same
    /// path length as front-side ones.
    #[inline]
    pub fn material_budget(&self, entrance_angle: f64) -> f64 {
        self.material_budget_factor * self.average_material_budget / entrance_angle.cos().abs()
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, EstimatorError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Serialize to pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Builder for [`EstimatorConfig`]
#[derive(Debug, Default)]
pub struct EstimatorConfigBuilder {
    magnetic_field_z: Option<f64>,
    material_budget_factor: Option<f64>,
    average_material_budget: Option<f64>,
    max_pt: Option<f64>,
}

impl EstimatorConfigBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the field strength along the detector axis (T)
    pub fn magnetic_field_z(mut self, value: f64) -> Self {
        self.magnetic_field_z = Some(value);
        self
    }

    /// Set the material budget scaling factor
    pub fn material_budget_factor(mut self, value: f64) -> Self {
        self.material_budget_factor = Some(value);
        self
    }

    /// Set the average per-sensor radiation-length fraction
    pub fn average_material_budget(mut self, value: f64) -> Self {
        self.average_material_budget = Some(value);
        self
    }

    /// Set the momentum cut-off (GeV/c)
    pub fn max_pt(mut self, value: f64) -> Self {
        self.max_pt = Some(value);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<EstimatorConfig, EstimatorError> {
        let defaults = EstimatorConfig::default();
        let config = EstimatorConfig {
            magnetic_field_z: self.magnetic_field_z.unwrap_or(defaults.magnetic_field_z),
            material_budget_factor: self
                .material_budget_factor
                .unwrap_or(defaults.material_budget_factor),
            average_material_budget: self
                .average_material_budget
                .unwrap_or(defaults.average_material_budget),
            max_pt: self.max_pt.unwrap_or(defaults.max_pt),
        };
        config.validate()?;
        if config.magnetic_field_z == 0.0 {
            log::warn!("Estimator configured without magnetic field; momenta will be zero");
        }
        Ok(config)
    }
}
