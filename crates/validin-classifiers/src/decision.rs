//! Threshold decision policy turning probabilities into a verdict

use validin_core::{Error, Label, Prediction, Result, Verdict};

/// Default hoax probability threshold
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// Asymmetric decision rule: HOAX only when the hoax probability is
/// strictly greater than the threshold, VALID otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionPolicy {
    threshold: f64,
}

impl DecisionPolicy {
    /// Create a policy with a threshold in `[0, 1]`
    pub fn new(threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(Error::config(format!(
                "threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        Ok(Self { threshold })
    }

    /// Configured threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Apply the rule. Confidence is the chosen label's probability as a
    /// percentage.
    pub fn decide(&self, prediction: &Prediction) -> Verdict {
        let hoax = prediction.hoax;

        if hoax > self.threshold {
            Verdict {
                label: Label::Hoax,
                confidence: hoax * 100.0,
            }
        } else {
            Verdict {
                label: Label::Valid,
                confidence: (1.0 - hoax) * 100.0,
            }
        }
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}
