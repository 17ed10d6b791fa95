//! Momentum and curvature helpers
//!
//! Positions are in cm, the field in Tesla and momenta in GeV/c, so the
//! radius-to-momentum relation `p = 0.3 · B[T] · R[m]` becomes
//! `p = 0.00299792458 · B · R[cm]`.

use crate::types::Measurement;

/// Speed of light scaled to GeV / (T · cm)
pub const MOMENTUM_PER_TESLA_CM: f64 = 0.002_997_924_58;

/// Momentum of a particle moving on a helix of the given radius
#[inline]
pub fn pt_from_radius(radius: f64, magnetic_field_z: f64) -> f64 {
    MOMENTUM_PER_TESLA_CM * magnetic_field_z.abs() * radius
}

/// Radius corresponding to a given momentum, the inverse of [`pt_from_radius`]
#[inline]
pub fn radius_from_pt(pt: f64, magnetic_field_z: f64) -> f64 {
    pt / (MOMENTUM_PER_TESLA_CM * magnetic_field_z.abs())
}

/// Sign of the transverse curvature of an ordered hit sequence
///
/// Sums the z-component of the cross product of consecutive transverse
/// direction vectors. A counter-clockwise path gives +1, a clockwise path -1
/// and a straight (or degenerate) path 0. Fewer than 3 hits give 0.
pub fn curvature_sign(measurements: &[Measurement]) -> i8 {
    if measurements.len() < 3 {
        return 0;
    }

    let turning: f64 = measurements
        .windows(3)
        .map(|w| {
            let ab = w[1].position - w[0].position;
            let bc = w[2].position - w[1].position;
            ab.x * bc.y - ab.y * bc.x
        })
        .sum();

    if turning > 0.0 {
        1
    } else if turning < 0.0 {
        -1
    } else {
        0
    }
}
