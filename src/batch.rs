//! Estimation over many candidates
//!
//! With the `rayon` feature, candidates are estimated in parallel. Results
//! are always returned in input order.

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::Serialize;

use crate::estimators::QualityEstimator;
use crate::types::{Measurement, QualityEstimationResult};

/// Estimate quality and kinematics of every candidate
pub fn estimate_batch<E>(estimator: &E, candidates: &[Vec<Measurement>]) -> Vec<QualityEstimationResult>
where
    E: QualityEstimator + ?Sized,
{
    #[cfg(feature = "rayon")]
    {
        candidates
            .par_iter()
            .map(|hits| estimator.estimate_quality_and_properties(hits))
            .collect()
    }

    #[cfg(not(feature = "rayon"))]
    {
        candidates
            .iter()
            .map(|hits| estimator.estimate_quality_and_properties(hits))
            .collect()
    }
}

/// Aggregate statistics of a batch of results
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatchSummary {
    /// Number of candidates
    pub count: usize,
    /// Candidates that produced a chi-squared
    pub estimated: usize,
    /// Mean quality indicator over all candidates (0 for an empty batch)
    pub mean_quality: f64,
    /// Quality threshold used for `below_cut`
    pub quality_cut: f64,
    /// Candidates with a quality indicator below `quality_cut`
    pub below_cut: usize,
}

impl BatchSummary {
    /// Summarize `results`, counting qualities below `quality_cut`
    pub fn from_results(results: &[QualityEstimationResult], quality_cut: f64) -> Self {
        let count = results.len();
        let estimated = results.iter().filter(|r| r.is_estimated()).count();
        let below_cut = results
            .iter()
            .filter(|r| r.quality_indicator < quality_cut)
            .count();
        let mean_quality = if count == 0 {
            0.0
        } else {
            results.iter().map(|r| r.quality_indicator).sum::<f64>() / count as f64
        };

        let summary = Self {
            count,
            estimated,
            mean_quality,
            quality_cut,
            below_cut,
        };
        log::debug!(
            "Batch of {} candidates: {} estimated, mean quality {:.4}, {} below {}",
            summary.count,
            summary.estimated,
            summary.mean_quality,
            summary.below_cut,
            summary.quality_cut
        );
        summary
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
