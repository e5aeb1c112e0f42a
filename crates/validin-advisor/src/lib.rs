//! Validin Advisor
//!
//! Digital-literacy guidance for classified articles, generated by an
//! external chat-completions API.
//!
//! Guidance is additive: every failure (missing credential, timeout,
//! connection error, non-200 status, malformed body) is turned into an
//! Indonesian fallback text and never affects the verdict it describes.

pub mod client;
pub mod config;
pub mod error;
pub mod prompts;

pub use client::{Recommendation, RecommendationClient};
pub use config::AdvisorConfig;
pub use error::{AdvisorError, Result};
pub use prompts::{build_prompt, preview};
