//! Domain types shared by the detector and the recommendation client

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Allowed deviation of a probability pair's sum from 1.0
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-3;

/// Binary news label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    /// Fabricated or misleading content
    Hoax,
    /// Content that appears legitimate
    Valid,
}

impl Label {
    /// Upper-case label name as shown to users
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hoax => "HOAX",
            Self::Valid => "VALID",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-class probability distribution produced by the classifier for one
/// padded sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Probability of the HOAX class (model output index 1)
    pub hoax: f64,
    /// Probability of the VALID class (model output index 0)
    pub valid: f64,
}

impl Prediction {
    /// Build a prediction from a hoax probability, deriving the valid one.
    pub fn from_hoax_probability(hoax: f64) -> Result<Self> {
        Self::new(hoax, 1.0 - hoax)
    }

    /// Build a prediction from a model output row `[valid, hoax]`.
    pub fn from_output_row(row: &[f32]) -> Result<Self> {
        match row {
            [valid, hoax] => Self::new(f64::from(*hoax), f64::from(*valid)),
            other => Err(Error::classifier(format!(
                "expected 2 class probabilities, got {}",
                other.len()
            ))),
        }
    }

    /// Validate and build a prediction.
    pub fn new(hoax: f64, valid: f64) -> Result<Self> {
        for (name, p) in [("hoax", hoax), ("valid", valid)] {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(Error::classifier(format!(
                    "{name} probability {p} is outside [0, 1]"
                )));
            }
        }

        if ((hoax + valid) - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(Error::classifier(format!(
                "class probabilities sum to {}, expected 1",
                hoax + valid
            )));
        }

        Ok(Self { hoax, valid })
    }
}

/// Final decision for one article
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Chosen label
    pub label: Label,

    /// Probability of the chosen label as a percentage (0-100)
    pub confidence: f64,
}

impl Verdict {
    /// Whether the article was judged a hoax
    pub fn is_hoax(&self) -> bool {
        self.label == Label::Hoax
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2}%)", self.label, self.confidence)
    }
}
