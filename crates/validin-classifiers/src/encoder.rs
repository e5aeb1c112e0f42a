//! Token sequence to fixed-length id sequence encoding

use crate::vocabulary::VocabularyIndex;
use std::sync::Arc;
use tracing::debug;
use validin_core::{Error, PaddedSequence, Result, DEFAULT_MAX_LEN};

/// Maps stopword-filtered tokens to vocabulary ids and pads them.
#[derive(Debug, Clone)]
pub struct SequenceEncoder {
    vocabulary: Arc<VocabularyIndex>,
    max_len: usize,
}

impl SequenceEncoder {
    /// Create an encoder producing sequences of [`DEFAULT_MAX_LEN`]
    pub fn new(vocabulary: Arc<VocabularyIndex>) -> Self {
        Self {
            vocabulary,
            max_len: DEFAULT_MAX_LEN,
        }
    }

    /// Set the padded sequence length
    pub fn with_max_len(mut self, max_len: usize) -> Result<Self> {
        if max_len == 0 {
            return Err(Error::config("max_len must be positive"));
        }
        self.max_len = max_len;
        Ok(self)
    }

    /// Padded sequence length
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Shared vocabulary
    pub fn vocabulary(&self) -> &Arc<VocabularyIndex> {
        &self.vocabulary
    }

    /// Ids of known tokens in their original order; unknown tokens are
    /// dropped.
    pub fn to_ids<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<u32> {
        // Join and re-split so the lookup sees exactly the single-space
        // joined text the model was trained on.
        let joined = tokens
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");

        joined
            .split(' ')
            .filter(|word| !word.is_empty())
            .filter_map(|word| self.vocabulary.id(word))
            .collect()
    }

    /// Encode tokens into a padded sequence.
    ///
    /// Returns [`Error::UnprocessableText`] when no token is in the
    /// vocabulary; such text must not reach the classifier.
    pub fn encode<S: AsRef<str>>(&self, tokens: &[S]) -> Result<PaddedSequence> {
        self.pad_ids(&self.to_ids(tokens))
    }

    /// Pad ids already produced by [`to_ids`](Self::to_ids)
    pub fn pad_ids(&self, ids: &[u32]) -> Result<PaddedSequence> {
        if ids.is_empty() {
            debug!("No known tokens to encode");
            return Err(Error::UnprocessableText);
        }

        debug!("Encoded {} known tokens into length {}", ids.len(), self.max_len);
        Ok(PaddedSequence::pad(ids, self.max_len))
    }
}
