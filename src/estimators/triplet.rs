//! Closed-form helix reconstruction of one hit triplet
//!
//! Implements the three-dimensional triplet fit with multiple scattering
//! (A. Schöning et al., "A New Three-Dimensional Track Fit with Multiple
//! Scattering", arXiv:1606.04990). The fit is split in two stages:
//!
//! 1. [`TripletGeometry::reconstruct`]: pure geometry of three positions
//!    (circle through the transverse projections, opening angles, polar
//!    angles and the linearization coefficients).
//! 2. [`TripletFit::fit`]: the scattering error model, which additionally
//!    needs the entrance angle at the middle hit and the configuration.
//!
//! No value is guarded against degenerate input. Collinear or coincident
//! points produce infinities or NaN that flow into the chi-squared.

use nalgebra::Vector3;
use serde::Serialize;

use crate::config::EstimatorConfig;

/// Geometric quantities of a triplet, independent of the error model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TripletGeometry {
    /// Radius of the circle through the transverse projections
    pub transverse_radius: f64,
    /// Transverse opening angle between hit 0 and hit 1
    pub phi1: f64,
    /// Transverse opening angle between hit 1 and hit 2
    pub phi2: f64,
    /// 3D radius estimated from the first segment
    pub r3d1: f64,
    /// 3D radius estimated from the second segment
    pub r3d2: f64,
    /// Polar angle of the first segment
    pub theta1: f64,
    /// Polar angle of the second segment
    pub theta2: f64,
    /// Mean polar angle
    pub theta: f64,
    /// Linearization coefficient of the first segment
    pub alpha1: f64,
    /// Linearization coefficient of the second segment
    pub alpha2: f64,
    /// Transverse kink of the triplet
    pub phi_tilde: f64,
    /// Derivative of the transverse kink with respect to the curvature
    pub eta: f64,
    /// Polar kink of the triplet
    pub theta_tilde: f64,
    /// Derivative of the polar kink with respect to the curvature
    pub beta: f64,
}

impl TripletGeometry {
    /// Reconstruct the local helix through three consecutive hits
    pub fn reconstruct(hit0: &Vector3<f64>, hit1: &Vector3<f64>, hit2: &Vector3<f64>) -> Self {
        let d01_sq = (hit1.x - hit0.x).powi(2) + (hit1.y - hit0.y).powi(2);
        let d12_sq = (hit2.x - hit1.x).powi(2) + (hit2.y - hit1.y).powi(2);
        let d02_sq = (hit2.x - hit0.x).powi(2) + (hit2.y - hit0.y).powi(2);

        let d01 = d01_sq.sqrt();
        let d12 = d12_sq.sqrt();
        let d02 = d02_sq.sqrt();

        let z01 = hit1.z - hit0.z;
        let z12 = hit2.z - hit1.z;

        // Circumradius from the three side lengths
        let transverse_radius = (d01 * d12 * d02)
            / (2.0 * d01_sq * d12_sq + 2.0 * d12_sq * d02_sq + 2.0 * d02_sq * d01_sq
                - d01_sq * d01_sq
                - d12_sq * d12_sq
                - d02_sq * d02_sq)
                .sqrt();

        let phi1 = 2.0 * (d01 / (2.0 * transverse_radius)).asin();
        let phi2 = 2.0 * (d12 / (2.0 * transverse_radius)).asin();

        let r3d1 = (transverse_radius.powi(2) + (z01 / phi1).powi(2)).sqrt();
        let r3d2 = (transverse_radius.powi(2) + (z12 / phi2).powi(2)).sqrt();

        let theta1 = (z01 / (phi1 * r3d1)).acos();
        let theta2 = (z12 / (phi2 * r3d2)).acos();
        let theta = 0.5 * (theta1 + theta2);

        let alpha1 = linearization_coefficient(transverse_radius, phi1, z01);
        let alpha2 = linearization_coefficient(transverse_radius, phi2, z12);

        let phi_tilde = -0.5 * (phi1 * alpha1 + phi2 * alpha2);
        let eta = 0.5 * (phi1 * alpha1 / r3d1 + phi2 * alpha2 / r3d2);

        let theta_tilde = theta2 - theta1 - (1.0 - alpha2) / theta2.tan() + (1.0 - alpha1) / theta1.tan();
        let beta = (1.0 - alpha2) / (r3d2 * theta2.tan()) - (1.0 - alpha1) / (r3d1 * theta1.tan());

        Self {
            transverse_radius,
            phi1,
            phi2,
            r3d1,
            r3d2,
            theta1,
            theta2,
            theta,
            alpha1,
            alpha2,
            phi_tilde,
            eta,
            theta_tilde,
            beta,
        }
    }

    /// Mean of the two linearization coefficients
    #[inline]
    pub fn alpha(&self) -> f64 {
        0.5 * (self.alpha1 + self.alpha2)
    }
}

/// `(R²Φ² + z²) / (½ R² Φ³ / tan(Φ/2) + z²)`
#[inline]
fn linearization_coefficient(radius: f64, phi: f64, dz: f64) -> f64 {
    let r_sq = radius * radius;
    (r_sq * phi * phi + dz * dz) / (0.5 * r_sq * phi.powi(3) / (0.5 * phi).tan() + dz * dz)
}

/// Full fit of one triplet, including the multiple scattering error model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TripletFit {
    /// Geometric reconstruction the fit is based on
    pub geometry: TripletGeometry,
    /// Angle between the incoming segment and the middle sensor's normal
    pub entrance_angle: f64,
    /// Effective radiation-length fraction crossed at the middle hit
    pub material_budget: f64,
    /// Radius bound applied in the scattering error for this polar angle
    pub r3d_max_cut: f64,
    /// Multiple scattering angular error
    pub sigma_ms: f64,
    /// Fitted 3D radius (after bias correction, if it was applicable)
    pub r3d: f64,
    /// Variance of the fitted 3D radius
    pub sigma_r3d_squared: f64,
    /// Chi-squared contribution of this triplet
    pub chi_squared: f64,
    /// Whether the bias correction was applied to `r3d`
    pub bias_corrected: bool,
}

impl TripletFit {
    /// Fit the triplet given the entrance angle at its middle hit
    ///
    /// `transverse_radius_cut` (see [`EstimatorConfig::transverse_radius_cut`])
    /// bounds the radius used in the scattering error, so that near-straight
    /// tracks keep a finite error. It is scaled to 3D with the triplet's
    /// polar angle.
    pub fn fit(
        geometry: TripletGeometry,
        entrance_angle: f64,
        config: &EstimatorConfig,
        transverse_radius_cut: f64,
    ) -> Self {
        let TripletGeometry {
            theta,
            phi_tilde,
            eta,
            theta_tilde,
            beta,
            ..
        } = geometry;

        let material_budget = config.material_budget(entrance_angle);
        let sin_sq = theta.sin().powi(2);
        let r3d_max_cut = transverse_radius_cut / theta.sin();

        let mut r3d = -(eta * phi_tilde * sin_sq + beta * theta_tilde) / (eta * eta * sin_sq + beta * beta);

        let sigma_ms =
            (4.5 / config.magnetic_field_z.abs()) * material_budget.sqrt() / r3d.min(r3d_max_cut);

        let kink = beta * phi_tilde - eta * theta_tilde;
        let chi_squared = kink * kink / (sigma_ms * sigma_ms * (eta * eta + beta * beta / sin_sq));
        let sigma_r3d_squared = sigma_ms * sigma_ms / (eta * eta * sin_sq + beta * beta);

        // Bias correction, skipped where the square root would be imaginary
        let delta = kink / (eta * phi_tilde * sin_sq + beta * theta_tilde);
        let discriminant = 1.0 - 8.0 * delta * delta * sin_sq;
        let bias_corrected = discriminant >= 0.0;
        if bias_corrected {
            r3d *= 0.75 + discriminant.sqrt() / 4.0;
        }

        Self {
            geometry,
            entrance_angle,
            material_budget,
            r3d_max_cut,
            sigma_ms,
            r3d,
            sigma_r3d_squared,
            chi_squared,
            bias_corrected,
        }
    }

    /// Mean polar angle of the triplet
    #[inline]
    pub fn theta(&self) -> f64 {
        self.geometry.theta
    }

    /// Mean linearization coefficient of the triplet
    #[inline]
    pub fn alpha(&self) -> f64 {
        self.geometry.alpha()
    }
}
