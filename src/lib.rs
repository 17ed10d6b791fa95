/*!
# Track quality estimation

Fast quality estimates for track candidates produced by combinatorial
track finding. A candidate is an ordered slice of 3D hits; an estimator maps
it to a quality indicator in [0, 1] (a chi-squared probability) and, where
the method allows, to transverse momentum, total momentum and curvature sign.

## Features

- Triplet fit with multiple scattering, combining the closed-form fits of all
  consecutive hit triplets into one chi-squared
- Weighted transverse circle fit, extended Riemann helix fit and a
  straight-line fit for tracks without bending
- Optional sensor geometry for entrance-angle corrected material budgets
- Parallel batch estimation (`rayon` feature)

## Modules

- [`estimators`] - Estimator trait and implementations
- [`geometry`] - Sensor plane lookup
- [`config`] - Estimator configuration
- [`reporter`] - Observability hooks for triplet fits
- [`batch`] - Estimation over many candidates
- [`common`] - Statistics, regression and kinematics helpers

## Example

```rust
use track_quality::{EstimatorConfig, Measurement, QualityEstimator, SensorId, TripletFitEstimator};

let config = EstimatorConfig::with_magnetic_field(1.5).unwrap();
let estimator = TripletFitEstimator::new(config).unwrap();

// Helix with radius 5 cm and pitch 2 cm per radian
let hits: Vec<Measurement> = [0.1_f64, 0.4, 0.8, 1.1]
    .iter()
    .map(|&phi| Measurement::from_xyz(5.0 * phi.cos(), 5.0 * phi.sin(), 2.0 * phi, SensorId::NONE))
    .collect();

let result = estimator.estimate_quality_and_properties(&hits);
assert!(result.quality_indicator > 0.999);
assert!(result.pt.unwrap() > 0.0);
```
*/

/// Measurement and result types
pub mod types;

/// Estimator configuration
pub mod config;

/// Error types
pub mod errors;

/// Sensor plane lookup
pub mod geometry;

/// Statistics and kinematics helpers
pub mod common;

/// Quality estimators
pub mod estimators;

/// Observability hooks
pub mod reporter;

/// Estimation over many candidates
pub mod batch;

// ============================================================================
// Re-exports for convenience
// ============================================================================

// Core types
pub use config::{EstimatorConfig, EstimatorConfigBuilder};
pub use errors::EstimatorError;
pub use types::{Measurement, QualityEstimationResult, SensorId};

// Geometry
pub use geometry::{NoGeometry, PlaneOrientation, SensorGeometry, SensorTable};

// Estimators
pub use estimators::{
    create_estimator, CircleFit, CircleFitEstimator, EstimationMethod, LineFit3D, LineFit3DEstimator,
    QualityEstimator, RiemannFit, RiemannHelixFitEstimator, TrackFit, TripletFit, TripletFitEstimator,
    TripletGeometry,
};

// Reporters
pub use reporter::{
    CompositeReporter, DebugReporter, FitReporter, LoggingReporter, NoOpReporter, TrackCombination,
};

// Batch
pub use batch::{estimate_batch, BatchSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
