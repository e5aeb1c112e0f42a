//! Read-only vocabulary mapping tokens to model ids
//!
//! Two artifact layouts are accepted:
//!
//! ```text
//! {"class_name": "Tokenizer", "config": {"num_words": 5000, "word_index": "{\"berita\": 1, ...}"}}
//! {"berita": 1, "hoax": 2, ...}
//! ```
//!
//! The first is what `Tokenizer.to_json()` writes; its `word_index` is a
//! JSON document embedded as a string (an inline object is accepted too).

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;
use validin_core::{Error, Result};

/// Token to id mapping, fixed after load
#[derive(Debug, Clone)]
pub struct VocabularyIndex {
    word_index: HashMap<String, u32>,

    /// Ids at or above this bound are treated as unknown
    num_words: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct TokenizerDocument {
    config: TokenizerDocumentConfig,
}

#[derive(Debug, Deserialize)]
struct TokenizerDocumentConfig {
    #[serde(default)]
    num_words: Option<u32>,
    word_index: Value,
}

impl VocabularyIndex {
    /// Build from an in-memory map. Ids must be positive.
    pub fn new(word_index: HashMap<String, u32>, num_words: Option<u32>) -> Result<Self> {
        if word_index.is_empty() {
            return Err(Error::vocabulary("vocabulary is empty"));
        }

        if let Some((token, _)) = word_index.iter().find(|(_, &id)| id == 0) {
            return Err(Error::vocabulary(format!(
                "token '{}' has id 0, which is reserved for padding",
                token
            )));
        }

        if num_words == Some(0) {
            return Err(Error::vocabulary("num_words must be positive"));
        }

        Ok(Self {
            word_index,
            num_words,
        })
    }

    /// Parse either supported JSON layout
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| Error::vocabulary(format!("Failed to parse vocabulary JSON: {}", e)))?;

        if value.get("class_name").is_some() && value.get("config").is_some() {
            let document: TokenizerDocument = serde_json::from_value(value).map_err(|e| {
                Error::vocabulary(format!("Invalid tokenizer document: {}", e))
            })?;

            let word_index = match document.config.word_index {
                Value::String(embedded) => serde_json::from_str(&embedded).map_err(|e| {
                    Error::vocabulary(format!("Invalid embedded word_index: {}", e))
                })?,
                inline @ Value::Object(_) => serde_json::from_value(inline)
                    .map_err(|e| Error::vocabulary(format!("Invalid word_index: {}", e)))?,
                other => {
                    return Err(Error::vocabulary(format!(
                        "word_index must be an object or a JSON string, got {}",
                        other
                    )))
                }
            };

            return Self::new(word_index, document.config.num_words);
        }

        let word_index = serde_json::from_value(value)
            .map_err(|e| Error::vocabulary(format!("Invalid word index map: {}", e)))?;
        Self::new(word_index, None)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::vocabulary(format!(
                "Failed to read vocabulary {}: {}",
                path.display(),
                e
            ))
        })?;

        let vocabulary = Self::from_json(&content)?;
        info!(
            "Loaded vocabulary from {} ({} tokens, num_words={:?})",
            path.display(),
            vocabulary.len(),
            vocabulary.num_words
        );
        Ok(vocabulary)
    }

    /// Override the id cap taken from the artifact
    pub fn with_num_words(mut self, num_words: Option<u32>) -> Result<Self> {
        if num_words == Some(0) {
            return Err(Error::vocabulary("num_words must be positive"));
        }
        self.num_words = num_words;
        Ok(self)
    }

    /// Id for a token, or `None` when unknown or beyond the cap
    pub fn id(&self, token: &str) -> Option<u32> {
        let id = *self.word_index.get(token)?;
        match self.num_words {
            Some(limit) if id >= limit => None,
            _ => Some(id),
        }
    }

    /// Whether the token maps to an id
    pub fn contains(&self, token: &str) -> bool {
        self.id(token).is_some()
    }

    /// Number of entries in the artifact (ignoring the cap)
    pub fn len(&self) -> usize {
        self.word_index.len()
    }

    /// Whether the vocabulary is empty (never true for a loaded one)
    pub fn is_empty(&self) -> bool {
        self.word_index.is_empty()
    }

    /// Active id cap
    pub fn num_words(&self) -> Option<u32> {
        self.num_words
    }

    /// Largest id a lookup can return, for sizing the embedding table
    pub fn max_id(&self) -> u32 {
        let largest = self.word_index.values().copied().max().unwrap_or(0);
        match self.num_words {
            Some(limit) => largest.min(limit - 1),
            None => largest,
        }
    }
}
