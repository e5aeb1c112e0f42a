//! Sequence classifier trait

use crate::error::{Error, Result};
use crate::sequence::PaddedSequence;
use crate::types::Prediction;
use async_trait::async_trait;

/// A pre-trained model mapping padded id sequences to HOAX/VALID
/// probabilities.
///
/// Implementations are loaded once and shared read-only, hence `Send + Sync`
/// and `&self` receivers.
#[async_trait]
pub trait SequenceClassifier: Send + Sync {
    /// Predict one probability pair per input sequence, in input order.
    async fn predict_batch(&self, batch: &[PaddedSequence]) -> Result<Vec<Prediction>>;

    /// Predict a single sequence
    async fn predict(&self, sequence: &PaddedSequence) -> Result<Prediction> {
        self.predict_batch(std::slice::from_ref(sequence))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::classifier("classifier returned no prediction"))
    }

    /// Get the classifier name
    fn name(&self) -> &str;

    /// Sequence length the classifier expects
    fn input_len(&self) -> usize;
}
