//! Candidate generators
//!
//! Helices are parametrized by the azimuth `phi` around their axis:
//! `(cx + R cos(phi), cy + R sin(phi), z0 + pitch * phi)`, so the 3D radius
//! of curvature seen by the triplet fit is `sqrt(R² + pitch²)`.

use rand::rngs::StdRng;
use rand::Rng;
use track_quality::{Measurement, SensorId};

/// Exact helix parameters
#[derive(Debug, Clone, Copy)]
pub struct Helix {
    pub center_x: f64,
    pub center_y: f64,
    pub radius: f64,
    pub pitch: f64,
    pub z0: f64,
}

impl Helix {
    pub fn new(radius: f64, pitch: f64) -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            radius,
            pitch,
            z0: 0.0,
        }
    }

    pub fn centered_at(mut self, x: f64, y: f64) -> Self {
        self.center_x = x;
        self.center_y = y;
        self
    }

    /// 3D radius of curvature
    pub fn r3d(&self) -> f64 {
        self.radius.hypot(self.pitch)
    }

    /// Polar angle of the flight direction
    pub fn theta(&self) -> f64 {
        (self.pitch / self.r3d()).acos()
    }

    /// Hits at the given azimuths, without sensor information
    pub fn hits(&self, phis: &[f64]) -> Vec<Measurement> {
        phis.iter()
            .map(|&phi| {
                Measurement::from_xyz(
                    self.center_x + self.radius * phi.cos(),
                    self.center_y + self.radius * phi.sin(),
                    self.z0 + self.pitch * phi,
                    SensorId::NONE,
                )
            })
            .collect()
    }
}

/// Measurements from plain coordinates, without sensor information
pub fn hits_from_points(points: &[[f64; 3]]) -> Vec<Measurement> {
    points
        .iter()
        .map(|p| Measurement::from_xyz(p[0], p[1], p[2], SensorId::NONE))
        .collect()
}

/// Random helix with radius, pitch and starting azimuth in realistic ranges
pub fn random_helix(rng: &mut StdRng) -> (Helix, f64) {
    let radius = rng.gen_range(2.0..200.0);
    let pitch = rng.gen_range(-radius..radius);
    let helix = Helix::new(radius, pitch).centered_at(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0));
    let phi0 = rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI);
    (helix, phi0)
}

/// `count` azimuths starting at `phi0`, spaced by `step` (negative for clockwise)
pub fn azimuths(phi0: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| phi0 + step * i as f64).collect()
}
