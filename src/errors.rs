//! Error types for estimator construction
//!
//! Estimation itself never fails: numerical degeneracies of a candidate are
//! reported through the returned numbers. Only building an estimator from an
//! invalid or unreadable configuration produces an error.

use std::fmt;

/// Errors that can occur while configuring or constructing an estimator
#[derive(Debug, Clone, PartialEq)]
pub enum EstimatorError {
    /// A configuration value is out of its valid range
    Configuration {
        /// Description of the configuration issue
        description: String,
    },

    /// A serialized configuration could not be read
    Parse {
        /// Description of the parse failure
        description: String,
    },
}

impl EstimatorError {
    /// Shorthand for a [`EstimatorError::Configuration`] error
    pub(crate) fn configuration(description: impl Into<String>) -> Self {
        EstimatorError::Configuration {
            description: description.into(),
        }
    }
}

impl fmt::Display for EstimatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstimatorError::Configuration { description } => {
                write!(f, "Configuration error: {}", description)
            }
            EstimatorError::Parse { description } => {
                write!(f, "Failed to parse configuration: {}", description)
            }
        }
    }
}

impl std::error::Error for EstimatorError {}

impl From<serde_json::Error> for EstimatorError {
    fn from(e: serde_json::Error) -> Self {
        EstimatorError::Parse {
            description: e.to_string(),
        }
    }
}
