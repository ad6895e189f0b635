//! API error types and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use stealth_types::{AuthError, ProfileError, ScoringError};
use thiserror::Error;
use tracing::error;

/// Errors a handler can return.
///
/// Every variant maps to a fixed, generic client message. Whatever detail
/// the source error carries is logged server-side for 5xx responses and
/// otherwise discarded.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The body was not syntactically valid JSON.
    #[error("malformed request body")]
    MalformedBody,

    /// The body parsed but a required field was absent or empty.
    #[error("missing required encryption parameters")]
    MissingFields,

    /// Every crypto field is present but some field has the wrong type.
    #[error("request body does not match the expected shape")]
    InvalidBody,

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Profile(#[from] ProfileError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedBody | Self::MissingFields | Self::InvalidBody => {
                StatusCode::BAD_REQUEST
            }
            Self::Scoring(e) => match e {
                ScoringError::Encoding { .. }
                | ScoringError::Validation { .. }
                | ScoringError::Decryption => StatusCode::BAD_REQUEST,
                ScoringError::QuotaExceeded => StatusCode::PAYMENT_REQUIRED,
                ScoringError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(AuthError::NotConfigured) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Profile(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message placed in the response body.
    ///
    /// Validation and decryption failures share one message so a client
    /// cannot tell a wrong key from a bad length or a corrupted ciphertext.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MalformedBody => "Invalid JSON in request body",
            Self::MissingFields => "Missing required encryption parameters",
            Self::InvalidBody => "Invalid request body",
            Self::Scoring(e) => match e {
                ScoringError::Encoding { .. } => "Invalid base64 encoding",
                ScoringError::Validation { .. } | ScoringError::Decryption => {
                    "Failed to decrypt pitch data"
                }
                ScoringError::QuotaExceeded => {
                    "Insufficient credits. Please upgrade your subscription."
                }
                ScoringError::Internal(_) => "Internal server error",
            },
            Self::Auth(e) => match e {
                AuthError::Missing => "Authentication required",
                AuthError::Expired => "Token has expired",
                AuthError::Invalid => "Invalid token",
                AuthError::NotConfigured => "Authentication not configured",
            },
            Self::Profile(_) => "Failed to fetch profile",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, error = %self, "request failed");
        }
        (status, Json(json!({ "detail": self.public_message() }))).into_response()
    }
}
