//! Numerical helpers shared by the estimators.

pub mod kinematics;
pub mod regression;
pub mod stats;
