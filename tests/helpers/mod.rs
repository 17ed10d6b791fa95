//! Shared test helpers
//!
//! Candidate generation on exact helices and circles, plus tolerance-aware
//! assertions.

#![allow(dead_code)]

pub mod assertions;
pub mod candidates;
