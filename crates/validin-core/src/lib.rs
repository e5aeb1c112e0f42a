//! Validin Core
//!
//! Core types, traits, and utilities shared across Validin components.
//!
//! This crate provides:
//! - Error types and result handling
//! - The `SequenceClassifier` trait consumed by the detection pipeline
//! - Domain values: predictions, verdicts, and fixed-length id sequences

pub mod classifier;
pub mod error;
pub mod sequence;
pub mod types;

pub use classifier::SequenceClassifier;
pub use error::{Error, Result};
pub use sequence::{PaddedSequence, DEFAULT_MAX_LEN, PAD_ID};
pub use types::{Label, Prediction, Verdict};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::classifier::SequenceClassifier;
    pub use crate::error::{Error, Result};
    pub use crate::sequence::PaddedSequence;
    pub use crate::types::{Label, Prediction, Verdict};
}
