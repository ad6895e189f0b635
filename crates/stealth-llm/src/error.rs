//! Provider error types for stealth-llm.
//!
//! All provider operations return [`Result<T>`] which uses [`ProviderError`]
//! as the error type. These errors never leave the crate's orchestrator:
//! [`FallbackOrchestrator`](crate::failover::FallbackOrchestrator) absorbs
//! every one of them and moves to the next variant.

use stealth_types::ScoreError;
use thiserror::Error;

/// Errors that can occur when asking a provider for scores.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider answered with a non-success status.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// Authentication with the provider was rejected (HTTP 401/403).
    #[error("authentication failed (HTTP {status})")]
    AuthFailed {
        /// The HTTP status code.
        status: u16,
    },

    /// The provider returned a rate-limit response (HTTP 429).
    #[error("rate limited")]
    RateLimited,

    /// The provider has not been configured (e.g. missing API key).
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// The response envelope could not be parsed.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The response carried no text content.
    #[error("empty response")]
    EmptyResponse,

    /// The model's text parsed, but is not a valid score vector.
    #[error("invalid scores: {0}")]
    InvalidScores(#[from] ScoreError),

    /// All four scores were exactly zero.
    #[error("all scores are zero")]
    AllZeroScores,

    /// The request timed out.
    #[error("timeout")]
    Timeout,

    /// An HTTP-level error from reqwest, with the URL stripped.
    #[error("http error: {0}")]
    Http(reqwest::Error),

    /// A JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ProviderError::Timeout;
        }
        // Some endpoints carry the API key in the query string.
        ProviderError::Http(err.without_url())
    }
}

/// A convenience type alias for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
