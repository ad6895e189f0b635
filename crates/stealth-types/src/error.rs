//! Error types for the scoring service.
//!
//! [`ScoringError`] is the taxonomy the pipeline surfaces to its caller.
//! Provider failures never appear here: the fallback orchestrator absorbs
//! them and always yields a score vector.

use thiserror::Error;

/// Errors surfaced by one scoring pipeline invocation.
///
/// Messages are deliberately generic. None of them carry plaintext, key
/// material, or any detail that separates "wrong key" from "corrupted
/// ciphertext".
#[derive(Error, Debug)]
pub enum ScoringError {
    /// A base64 field could not be decoded.
    #[error("malformed base64 in field {field}")]
    Encoding {
        /// Wire name of the offending field.
        field: &'static str,
    },

    /// The submission is structurally invalid (key or nonce length, plaintext
    /// length bounds).
    #[error("invalid submission: {reason}")]
    Validation {
        /// What was wrong, without echoing any submitted bytes.
        reason: String,
    },

    /// Authenticated decryption failed. Tag mismatch, wrong key, corrupted
    /// ciphertext and invalid UTF-8 all collapse into this one variant.
    #[error("failed to decrypt submission")]
    Decryption,

    /// The authenticated caller has no credits left.
    #[error("insufficient credits")]
    QuotaExceeded,

    /// Anything unanticipated. The detail is for server-side logs only.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ScoringError {
    /// Short category label used in structured log fields.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Encoding { .. } => "encoding",
            Self::Validation { .. } => "validation",
            Self::Decryption => "decryption",
            Self::QuotaExceeded => "quota",
            Self::Internal(_) => "internal",
        }
    }

    /// Shorthand for building a [`ScoringError::Validation`].
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }
}

/// Errors from bearer-token verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No credentials were presented.
    #[error("authentication required")]
    Missing,

    /// The token's `exp` claim is in the past.
    #[error("token has expired")]
    Expired,

    /// Signature, audience or structure did not check out.
    #[error("invalid token")]
    Invalid,

    /// The verifier has no signing secret configured.
    #[error("token verification not configured")]
    NotConfigured,
}

/// Errors from the user-profile store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// No profile exists for the given user id.
    #[error("profile not found: {0}")]
    NotFound(String),

    /// A profile already exists for the given user id.
    #[error("profile already exists: {0}")]
    AlreadyExists(String),

    /// The storage backend failed.
    #[error("profile store error: {0}")]
    Backend(String),
}

/// A convenience alias used throughout the pipeline.
pub type Result<T> = std::result::Result<T, ScoringError>;
