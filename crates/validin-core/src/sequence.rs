//! Fixed-length integer sequences fed to the classifier

use serde::Serialize;

/// Sequence length the bundled LSTM model was trained with
pub const DEFAULT_MAX_LEN: usize = 300;

/// Id used for padding positions
pub const PAD_ID: u32 = 0;

/// Token ids padded or truncated to an exact length.
///
/// Construction always goes through [`PaddedSequence::pad`], so the length
/// invariant cannot be broken by callers. Shorter inputs are padded at the
/// front with [`PAD_ID`]; longer inputs keep only their last `max_len` ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaddedSequence {
    ids: Vec<u32>,
}

impl PaddedSequence {
    /// Pre-pad or pre-truncate `ids` to exactly `max_len` elements.
    pub fn pad(ids: &[u32], max_len: usize) -> Self {
        let mut padded = Vec::with_capacity(max_len);

        if ids.len() >= max_len {
            padded.extend_from_slice(&ids[ids.len() - max_len..]);
        } else {
            padded.resize(max_len - ids.len(), PAD_ID);
            padded.extend_from_slice(ids);
        }

        Self { ids: padded }
    }

    /// The padded ids
    pub fn as_slice(&self) -> &[u32] {
        &self.ids
    }

    /// Sequence length (always the `max_len` it was built with)
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True only for sequences built with `max_len == 0`
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of non-padding positions
    pub fn content_len(&self) -> usize {
        self.ids.iter().filter(|&&id| id != PAD_ID).count()
    }
}

impl AsRef<[u32]> for PaddedSequence {
    fn as_ref(&self) -> &[u32] {
        &self.ids
    }
}
