//! Text to padded sequence front end
//!
//! normalize → tokenize → drop stopwords → look up ids → pad

use crate::encoder::SequenceEncoder;
use crate::normalizer::TextNormalizer;
use crate::tokenizer::{StopwordFilter, WordTokenizer};
use crate::vocabulary::VocabularyIndex;
use serde::Serialize;
use std::sync::Arc;
use validin_core::{Error, PaddedSequence, Result};

/// Intermediate forms of one article, for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct Inspection {
    /// Normalized text
    pub normalized: String,

    /// Tokens left after stopword removal
    pub tokens: Vec<String>,

    /// Vocabulary ids of the known tokens, before padding
    pub ids: Vec<u32>,
}

/// Encoded article ready for the classifier
#[derive(Debug, Clone)]
pub struct PreparedText {
    /// Padded id sequence
    pub sequence: PaddedSequence,

    /// Number of tokens after stopword removal
    pub token_count: usize,

    /// Number of tokens found in the vocabulary
    pub known_token_count: usize,
}

/// Runs every step before classification
pub struct Preprocessor {
    normalizer: TextNormalizer,
    tokenizer: WordTokenizer,
    stopwords: StopwordFilter,
    encoder: SequenceEncoder,
}

impl Preprocessor {
    /// Create a preprocessor with the built-in stopword list and default
    /// sequence length
    pub fn new(vocabulary: Arc<VocabularyIndex>) -> Result<Self> {
        Ok(Self {
            normalizer: TextNormalizer::new()?,
            tokenizer: WordTokenizer::new(),
            stopwords: StopwordFilter::indonesian(),
            encoder: SequenceEncoder::new(vocabulary),
        })
    }

    /// Replace the stopword list
    pub fn with_stopwords(mut self, stopwords: StopwordFilter) -> Self {
        self.stopwords = stopwords;
        self
    }

    /// Set the padded sequence length
    pub fn with_max_len(mut self, max_len: usize) -> Result<Self> {
        self.encoder = self.encoder.with_max_len(max_len)?;
        Ok(self)
    }

    /// Padded sequence length
    pub fn max_len(&self) -> usize {
        self.encoder.max_len()
    }

    /// Normalize, tokenize and drop stopwords
    pub fn tokens(&self, text: &str) -> Vec<String> {
        let normalized = self.normalizer.normalize(text);
        self.stopwords.filter(self.tokenizer.tokenize(&normalized))
    }

    /// Show every intermediate form without rejecting anything
    pub fn inspect(&self, text: &str) -> Inspection {
        let normalized = self.normalizer.normalize(text);
        let tokens = self.stopwords.filter(self.tokenizer.tokenize(&normalized));
        let ids = self.encoder.to_ids(&tokens);

        Inspection {
            normalized,
            tokens,
            ids,
        }
    }

    /// Turn raw text into a padded sequence.
    ///
    /// Blank input is [`Error::EmptyInput`] and is rejected before any
    /// processing; text without known tokens is [`Error::UnprocessableText`].
    pub fn prepare(&self, text: &str) -> Result<PreparedText> {
        if text.trim().is_empty() {
            return Err(Error::EmptyInput);
        }

        let tokens = self.tokens(text);
        let ids = self.encoder.to_ids(&tokens);
        let sequence = self.encoder.pad_ids(&ids)?;

        Ok(PreparedText {
            sequence,
            token_count: tokens.len(),
            known_token_count: ids.len(),
        })
    }
}
