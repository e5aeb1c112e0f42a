//! Recommendation client configuration (the `advisor:` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validin_core::{Error, Result};

/// Chat-completions endpoint and request parameters.
///
/// The bearer credential is never part of the file; it is read from the
/// environment variable named by `api_key_env`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    /// Chat-completions URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Characters of the article included in the prompt
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,

    /// Extra attempts after a retryable failure
    #[serde(default)]
    pub max_retries: u32,

    /// Base delay between attempts, multiplied by the attempt number
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Environment variable holding the bearer credential
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            preview_chars: default_preview_chars(),
            max_retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl AdvisorConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::config("advisor base_url must not be empty"));
        }

        if self.max_tokens == 0 {
            return Err(Error::config("advisor max_tokens must be positive"));
        }

        if !self.temperature.is_finite() || !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::config(format!(
                "advisor temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }

        if self.timeout_secs == 0 {
            return Err(Error::config("advisor timeout_secs must be positive"));
        }

        if self.api_key_env.trim().is_empty() {
            return Err(Error::config("advisor api_key_env must name a variable"));
        }

        Ok(())
    }

    /// Per-attempt timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(u64::from(attempt)))
    }

    /// Credential from the environment, if set and non-empty
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "google/gemma-2-9b-it:free".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_preview_chars() -> usize {
    500
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_api_key_env() -> String {
    "VALIDIN_API_KEY".to_string()
}
