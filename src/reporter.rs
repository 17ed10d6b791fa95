//! Observability for triplet fits.
//!
//! This module provides the [`FitReporter`] trait for debugging and
//! validation. Reporters receive the intermediate state of every triplet and
//! the track-level combination without the estimator having to expose or
//! retain it.
//!
//! # Zero-Cost Abstraction
//!
//! The default [`NoOpReporter`] compiles to zero overhead - all callback
//! methods are empty and will be optimized away by the compiler.
//!
//! # Example
//!
//! ```
//! use track_quality::{DebugReporter, EstimatorConfig, Measurement, SensorId, TripletFitEstimator};
//!
//! let estimator = TripletFitEstimator::new(EstimatorConfig::default()).unwrap();
//! let hits = vec![
//!     Measurement::from_xyz(0.0, 0.0, 0.0, SensorId::NONE),
//!     Measurement::from_xyz(1.0, 1.0, 1.0, SensorId::NONE),
//!     Measurement::from_xyz(2.0, 0.0, 2.0, SensorId::NONE),
//!     Measurement::from_xyz(1.0, -1.0, 3.0, SensorId::NONE),
//! ];
//!
//! let mut reporter = DebugReporter::new();
//! let result = estimator.estimate_with_reporter(&hits, &mut reporter);
//!
//! assert_eq!(reporter.triplet_events().len(), 2);
//! assert_eq!(reporter.combination_events().len(), 1);
//! assert!(result.quality_indicator > 0.99);
//! ```

use serde::Serialize;

use crate::estimators::triplet::TripletFit;

/// Track-level combination of all triplet fits of one candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackCombination {
    /// Number of hits in the candidate
    pub num_hits: usize,
    /// Sum of the per-triplet chi-squared contributions
    pub combined_chi_squared: f64,
    /// Uncertainty-weighted mean 3D radius
    pub average_r3d: f64,
    /// Penalty for triplet radii disagreeing with the mean
    pub global_compatibility: f64,
    /// `combined_chi_squared + global_compatibility`
    pub chi_squared: f64,
    /// Degrees of freedom, `2 N - 5`
    pub degrees_of_freedom: i32,
    /// Upper-tail chi-squared probability
    pub quality_indicator: f64,
}

// ============================================================================
// FitReporter Trait
// ============================================================================

/// Observability trait for triplet fit execution.
///
/// All methods have default empty implementations, so you only need
/// to override the events you care about.
///
/// Reporters use `&mut self` for callbacks, so they are NOT required
/// to be `Send + Sync`. Use one reporter per thread when estimating
/// candidates in parallel.
pub trait FitReporter {
    /// Called after each triplet has been fitted, in hit order.
    fn on_triplet(&mut self, _index: usize, _fit: &TripletFit) {}

    /// Called once all triplets of a candidate have been combined.
    fn on_combination(&mut self, _combination: &TrackCombination) {}

    /// Called when a candidate has too few hits to be estimated.
    fn on_skipped(&mut self, _num_hits: usize) {}
}

// ============================================================================
// NoOpReporter
// ============================================================================

/// Zero-cost reporter that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpReporter;

impl NoOpReporter {
    /// Create a new no-op reporter.
    pub fn new() -> Self {
        Self
    }
}

impl FitReporter for NoOpReporter {}

// ============================================================================
// DebugReporter
// ============================================================================

/// Reporter that captures all events for debugging.
///
/// Stores a copy of every triplet fit and combination passed to it, so that
/// the intermediate state of a call can be inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct DebugReporter {
    /// Captured triplet fits (index within candidate, fit)
    triplets: Vec<(usize, TripletFit)>,

    /// Captured track combinations
    combinations: Vec<TrackCombination>,

    /// Hit counts of skipped candidates
    skipped: Vec<usize>,
}

impl DebugReporter {
    /// Create a new debug reporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all captured events.
    pub fn clear(&mut self) {
        self.triplets.clear();
        self.combinations.clear();
        self.skipped.clear();
    }

    /// Get captured triplet events.
    pub fn triplet_events(&self) -> &[(usize, TripletFit)] {
        &self.triplets
    }

    /// Get captured combination events.
    pub fn combination_events(&self) -> &[TrackCombination] {
        &self.combinations
    }

    /// Get hit counts of skipped candidates.
    pub fn skipped_events(&self) -> &[usize] {
        &self.skipped
    }

    /// Total number of captured events across all types.
    pub fn total_events(&self) -> usize {
        self.triplets.len() + self.combinations.len() + self.skipped.len()
    }
}

impl FitReporter for DebugReporter {
    fn on_triplet(&mut self, index: usize, fit: &TripletFit) {
        self.triplets.push((index, *fit));
    }

    fn on_combination(&mut self, combination: &TrackCombination) {
        self.combinations.push(*combination);
    }

    fn on_skipped(&mut self, num_hits: usize) {
        self.skipped.push(num_hits);
    }
}

// ============================================================================
// LoggingReporter
// ============================================================================

/// Reporter that emits events through the `log` crate.
///
/// - `on_triplet`: TRACE
/// - `on_combination`, `on_skipped`: DEBUG
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingReporter {
    /// Whether to include the full triplet state in log messages
    verbose: bool,
}

impl LoggingReporter {
    /// Create a new logging reporter.
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Create a verbose logging reporter that includes triplet details.
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl FitReporter for LoggingReporter {
    fn on_triplet(&mut self, index: usize, fit: &TripletFit) {
        if self.verbose {
            log::trace!("Triplet {}: {:?}", index, fit);
        } else {
            log::trace!(
                "Triplet {}: r3d={:.4}, sigma_r3d^2={:.3e}, chi2={:.3e}",
                index,
                fit.r3d,
                fit.sigma_r3d_squared,
                fit.chi_squared
            );
        }
    }

    fn on_combination(&mut self, combination: &TrackCombination) {
        log::debug!(
            "Candidate with {} hits: chi2={:.4e} (triplets {:.4e} + compatibility {:.4e}), dof={}, quality={:.4}",
            combination.num_hits,
            combination.chi_squared,
            combination.combined_chi_squared,
            combination.global_compatibility,
            combination.degrees_of_freedom,
            combination.quality_indicator
        );
    }

    fn on_skipped(&mut self, num_hits: usize) {
        log::debug!("Skipping candidate with {} hits (at least 3 required)", num_hits);
    }
}

// ============================================================================
// CompositeReporter
// ============================================================================

/// Reporter that forwards events to two child reporters.
#[derive(Debug, Clone)]
pub struct CompositeReporter<A: FitReporter, B: FitReporter> {
    first: A,
    second: B,
}

impl<A: FitReporter, B: FitReporter> CompositeReporter<A, B> {
    /// Create a new composite reporter.
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    /// Get a reference to the first reporter.
    pub fn first(&self) -> &A {
        &self.first
    }

    /// Get a reference to the second reporter.
    pub fn second(&self) -> &B {
        &self.second
    }

    /// Consume and return both reporters.
    pub fn into_parts(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: FitReporter, B: FitReporter> FitReporter for CompositeReporter<A, B> {
    fn on_triplet(&mut self, index: usize, fit: &TripletFit) {
        self.first.on_triplet(index, fit);
        self.second.on_triplet(index, fit);
    }

    fn on_combination(&mut self, combination: &TrackCombination) {
        self.first.on_combination(combination);
        self.second.on_combination(combination);
    }

    fn on_skipped(&mut self, num_hits: usize) {
        self.first.on_skipped(num_hits);
        self.second.on_skipped(num_hits);
    }
}

impl<R: FitReporter + ?Sized> FitReporter for &mut R {
    fn on_triplet(&mut self, index: usize, fit: &TripletFit) {
        (**self).on_triplet(index, fit);
    }

    fn on_combination(&mut self, combination: &TrackCombination) {
        (**self).on_combination(combination);
    }

    fn on_skipped(&mut self, num_hits: usize) {
        (**self).on_skipped(num_hits);
    }
}

// ============================================================================
// Tests
// ============================================================================
