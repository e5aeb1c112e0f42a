//! Recommendation failures and their user-facing fallback texts

/// Result type alias for recommendation requests
pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Why no guidance text could be produced
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdvisorError {
    /// The credential environment variable is unset or empty
    #[error("API credential missing: environment variable {0} is not set")]
    MissingCredential(String),

    /// No response within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// The request could not be delivered
    #[error("{0}")]
    Connection(String),

    /// The API answered with a status other than 200
    #[error("{status} - {body}")]
    Api { status: u16, body: String },

    /// The API answered 200 with an unusable body
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl AdvisorError {
    /// Create a new connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a new invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Connection(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::MissingCredential(_) | Self::InvalidResponse(_) => false,
        }
    }

    /// Short label for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential(_) => "missing_credential",
            Self::Timeout => "timeout",
            Self::Connection(_) => "connection",
            Self::Api { .. } => "api",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }

    /// Indonesian text shown in place of the guidance
    pub fn fallback_message(&self) -> String {
        match self {
            Self::Timeout => "Maaf, permintaan timeout. Silakan coba lagi.".to_string(),
            Self::Connection(detail) => format!("Maaf, terjadi kesalahan koneksi: {}", detail),
            Self::Api { status, body } => format!("Error: {} - {}", status, body),
            other => format!(
                "Maaf, terjadi kesalahan dalam mendapatkan rekomendasi: {}",
                other
            ),
        }
    }
}

impl From<reqwest::Error> for AdvisorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AdvisorError::Timeout
        } else if err.is_decode() {
            AdvisorError::InvalidResponse(err.to_string())
        } else {
            AdvisorError::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AdvisorError {
    fn from(err: serde_json::Error) -> Self {
        AdvisorError::InvalidResponse(err.to_string())
    }
}
