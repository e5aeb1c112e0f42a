//! Error types for Validin

/// Result type alias using Validin's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Validin operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Submitted text is blank or whitespace-only
    #[error("input text is empty")]
    EmptyInput,

    /// No token of the preprocessed text is in the vocabulary
    #[error("text is not processable: no known vocabulary tokens")]
    UnprocessableText,

    /// Classifier artifact could not be loaded
    #[error("model load error: {0}")]
    ModelLoad(String),

    /// Vocabulary artifact could not be loaded or is malformed
    #[error("vocabulary error: {0}")]
    Vocabulary(String),

    /// Classifier execution errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new model load error
    pub fn model_load(msg: impl Into<String>) -> Self {
        Self::ModelLoad(msg.into())
    }

    /// Create a new vocabulary error
    pub fn vocabulary(msg: impl Into<String>) -> Self {
        Self::Vocabulary(msg.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error rejects a single request rather than signalling
    /// a fault in the detector itself.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::UnprocessableText)
    }

    /// Whether this error happened while loading startup artifacts.
    pub fn is_startup_failure(&self) -> bool {
        matches!(self, Self::ModelLoad(_) | Self::Vocabulary(_))
    }
}
