//! Sensor plane lookup
//!
//! The estimators need one thing from the detector description: the
//! orientation of the plane a hit was measured on, to turn the nominal
//! material budget into the amount of material actually crossed. That need
//! is captured by the narrow [`SensorGeometry`] trait.

use std::collections::HashMap;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::types::SensorId;

/// Position and in-plane axes of a sensor in the global frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneOrientation {
    /// Sensor centre
    pub origin: Vector3<f64>,
    /// First in-plane unit vector
    pub u: Vector3<f64>,
    /// Second in-plane unit vector
    pub v: Vector3<f64>,
}

impl PlaneOrientation {
    /// Create a plane orientation
    pub fn new(origin: Vector3<f64>, u: Vector3<f64>, v: Vector3<f64>) -> Self {
        Self { origin, u, v }
    }

    /// Plane of a barrel ladder at transverse radius `radius` and azimuth
    /// `phi`, with `v` along the beam axis
    pub fn barrel(radius: f64, phi: f64) -> Self {
        let (sin, cos) = phi.sin_cos();
        Self {
            origin: Vector3::new(radius * cos, radius * sin, 0.0),
            u: Vector3::new(-sin, cos, 0.0),
            v: Vector3::z(),
        }
    }

    /// Unit normal `u × v`, oriented away from the global origin
    pub fn normal(&self) -> Vector3<f64> {
        let normal = self.u.cross(&self.v).normalize();
        if self.origin.dot(&normal) < 0.0 {
            -normal
        } else {
            normal
        }
    }

    /// Angle between a flight direction and the outward plane normal
    pub fn entrance_angle(&self, direction: &Vector3<f64>) -> f64 {
        direction.angle(&self.normal())
    }
}

/// Lookup of sensor plane orientations
///
/// Implementations must be shareable between threads: estimators hold the
/// geometry by value and are called concurrently.
pub trait SensorGeometry: Send + Sync {
    /// Orientation of the sensor's plane, if the sensor is known
    fn plane_orientation(&self, sensor: SensorId) -> Option<PlaneOrientation>;
}

/// Geometry without any sensors; every lookup falls back to the default
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeometry;

impl SensorGeometry for NoGeometry {
    fn plane_orientation(&self, _sensor: SensorId) -> Option<PlaneOrientation> {
        None
    }
}

/// In-memory table of sensor planes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorTable {
    planes: HashMap<SensorId, PlaneOrientation>,
}

impl SensorTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the plane of a sensor
    pub fn insert(&mut self, sensor: SensorId, plane: PlaneOrientation) -> Option<PlaneOrientation> {
        self.planes.insert(sensor, plane)
    }

    /// Builder-style [`SensorTable::insert`]
    pub fn with_sensor(mut self, sensor: SensorId, plane: PlaneOrientation) -> Self {
        self.planes.insert(sensor, plane);
        self
    }

    /// Number of registered sensors
    #[inline]
    pub fn len(&self) -> usize {
        self.planes.len()
    }

    /// Whether no sensor is registered
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }
}

impl SensorGeometry for SensorTable {
    fn plane_orientation(&self, sensor: SensorId) -> Option<PlaneOrientation> {
        self.planes.get(&sensor).cloned()
    }
}

impl<G: SensorGeometry + ?Sized> SensorGeometry for std::sync::Arc<G> {
    fn plane_orientation(&self, sensor: SensorId) -> Option<PlaneOrientation> {
        (**self).plane_orientation(sensor)
    }
}
