//! Word tokenisation and Indonesian stopword removal

use std::collections::HashSet;
use std::path::Path;
use tokenizers::pre_tokenizers::whitespace::Whitespace;
use tokenizers::{OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer};
use tracing::{debug, warn};
use validin_core::Result;

/// Built-in Indonesian stopword list, one word per line
const INDONESIAN_STOPWORDS: &str = include_str!("../stopwords/indonesian.txt");

/// Splits normalized text into word tokens.
///
/// Uses the `\w+|[^\w\s]+` word/punctuation splitter from `tokenizers`,
/// which on normalized text is equivalent to splitting on blanks.
#[derive(Default)]
pub struct WordTokenizer {
    splitter: Whitespace,
}

impl WordTokenizer {
    /// Create a new word tokenizer
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize text into owned word tokens, preserving order.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut pretokenized = PreTokenizedString::from(text);

        match self.splitter.pre_tokenize(&mut pretokenized) {
            Ok(()) => pretokenized
                .get_splits(OffsetReferential::Original, OffsetType::Byte)
                .into_iter()
                .map(|(word, _, _)| word.to_string())
                .collect(),
            Err(e) => {
                warn!("Word splitter failed, falling back to blank splitting: {}", e);
                text.split_whitespace().map(str::to_string).collect()
            }
        }
    }
}

/// Fixed set of stopwords matched case-sensitively against tokens
#[derive(Debug, Clone)]
pub struct StopwordFilter {
    words: HashSet<String>,
}

impl StopwordFilter {
    /// Filter using the built-in Indonesian list
    pub fn indonesian() -> Self {
        Self::from_list(INDONESIAN_STOPWORDS)
    }

    /// Build a filter from newline-separated words. Blank lines and lines
    /// starting with `#` are skipped.
    pub fn from_list(list: &str) -> Self {
        let words = list
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();

        Self { words }
    }

    /// Load a stopword list from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            validin_core::Error::config(format!(
                "Failed to read stopwords file {}: {}",
                path.display(),
                e
            ))
        })?;

        let filter = Self::from_list(&content);
        debug!("Loaded {} stopwords from {}", filter.len(), path.display());
        Ok(filter)
    }

    /// Check membership
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    /// Remove stopwords, keeping the relative order of the rest
    pub fn filter(&self, tokens: Vec<String>) -> Vec<String> {
        tokens
            .into_iter()
            .filter(|token| !self.contains(token))
            .collect()
    }

    /// Number of stopwords
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for StopwordFilter {
    fn default() -> Self {
        Self::indonesian()
    }
}
