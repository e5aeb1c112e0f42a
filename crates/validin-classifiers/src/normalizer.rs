//! Text normalisation applied before tokenisation

use regex::Regex;
use validin_core::Result;

/// Lowercases text and strips mentions, URLs and everything that is not an
/// ASCII letter, digit or blank.
///
/// The output only ever contains `[a-z0-9]` words separated by single
/// spaces, which makes normalisation idempotent.
pub struct TextNormalizer {
    noise: Regex,
}

impl TextNormalizer {
    /// Create a new normalizer
    pub fn new() -> Result<Self> {
        // Alternatives are tried left to right at each position: a mention,
        // a single disallowed character, or a `scheme://` URL.
        let noise = Regex::new(r"(@[A-Za-z0-9]+)|([^0-9A-Za-z \t])|(\w+://\S+)").map_err(|e| {
            validin_core::Error::internal(format!("Failed to compile normalizer regex: {}", e))
        })?;

        Ok(Self { noise })
    }

    /// Normalize raw article text. Never fails; may return an empty string.
    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let replaced = self.noise.replace_all(&lowered, " ");

        let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");

        collapsed
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new().expect("Failed to create text normalizer")
    }
}
