//! Chat-completions client producing literacy guidance

use crate::config::AdvisorConfig;
use crate::error::{AdvisorError, Result};
use crate::prompts::build_prompt;
use reqwest::StatusCode;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::time::Instant;
use tracing::{debug, info, warn};
use validin_core::Verdict;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Guidance for one article, or the reason there is none
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    /// Text returned by the model, verbatim
    Generated(String),

    /// The request failed; `message` is shown instead
    Unavailable {
        error: AdvisorError,
        message: String,
    },
}

impl Recommendation {
    /// Text to display in either case
    pub fn text(&self) -> &str {
        match self {
            Self::Generated(text) => text,
            Self::Unavailable { message, .. } => message,
        }
    }

    /// Whether the model produced the text
    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Generated(_))
    }

    /// Failure, if any
    pub fn error(&self) -> Option<&AdvisorError> {
        match self {
            Self::Generated(_) => None,
            Self::Unavailable { error, .. } => Some(error),
        }
    }
}

impl From<Result<String>> for Recommendation {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(text) => Self::Generated(text),
            Err(error) => {
                let message = error.fallback_message();
                Self::Unavailable { error, message }
            }
        }
    }
}

impl Serialize for Recommendation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Recommendation", 3)?;
        match self {
            Self::Generated(text) => {
                state.serialize_field("status", "generated")?;
                state.serialize_field("text", text)?;
                state.serialize_field("error", &Option::<&str>::None)?;
            }
            Self::Unavailable { error, message } => {
                state.serialize_field("status", "unavailable")?;
                state.serialize_field("text", message)?;
                state.serialize_field("error", &Some(error.kind()))?;
            }
        }
        state.end()
    }
}

/// Client for the external text-generation service
pub struct RecommendationClient {
    config: AdvisorConfig,
    http_client: reqwest::Client,
    api_key: Option<String>,
}

impl RecommendationClient {
    /// Create a client, taking the credential from the environment
    pub fn new(config: AdvisorConfig) -> validin_core::Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| validin_core::Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let api_key = config.api_key();
        if api_key.is_none() {
            info!(
                "{} is not set; recommendations will be unavailable",
                config.api_key_env
            );
        }

        Ok(Self {
            config,
            http_client,
            api_key,
        })
    }

    /// Use an explicit credential instead of the environment
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Active configuration
    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Whether a credential is available
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Request guidance, downgrading every failure to a fallback text
    pub async fn recommend(&self, text: &str, verdict: &Verdict) -> Recommendation {
        let start = Instant::now();
        let recommendation = Recommendation::from(self.try_recommend(text, verdict).await);

        let outcome = match recommendation.error() {
            None => "generated",
            Some(error) => {
                warn!("Recommendation unavailable ({}): {}", error.kind(), error);
                error.kind()
            }
        };
        metrics::counter!("validin_recommendations_total", "outcome" => outcome).increment(1);
        debug!("Recommendation finished in {}ms", start.elapsed().as_millis());

        recommendation
    }

    /// Request guidance, returning the failure as an error
    pub async fn try_recommend(&self, text: &str, verdict: &Verdict) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AdvisorError::MissingCredential(self.config.api_key_env.clone()))?;

        let prompt = build_prompt(text, verdict, self.config.preview_chars);
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let mut attempt = 0;
        loop {
            match self.send(api_key, &request).await {
                Ok(guidance) => return Ok(guidance),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.config.backoff(attempt);
                    warn!(
                        "Recommendation attempt {} failed ({}), retrying in {}ms",
                        attempt,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send(&self, api_key: &str, request: &ChatCompletionRequest<'_>) -> Result<String> {
        debug!("POST {} (model={})", self.config.base_url, request.model);

        let response = self
            .http_client
            .post(&self.config.base_url)
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(AdvisorError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let completion: ChatCompletionResponse = serde_json::from_str(&body)?;

        completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AdvisorError::invalid_response("response contains no choices"))?
            .message
            .content
            .ok_or_else(|| AdvisorError::invalid_response("first choice has no content"))
    }
}
