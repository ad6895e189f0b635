//! Bearer-token extraction.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use stealth_types::{AuthError, Identity};
use tracing::debug;

use super::ApiState;

/// The token from an `Authorization: Bearer <token>` header, if any.
///
/// The scheme is matched case-insensitively. An empty token counts as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Verify the caller's token, failing when it is absent or bad.
pub async fn require_identity(state: &ApiState, headers: &HeaderMap) -> Result<Identity, AuthError> {
    let verifier = state.verifier.as_ref().ok_or(AuthError::NotConfigured)?;
    let token = bearer_token(headers).ok_or(AuthError::Missing)?;
    verifier.verify(token).await
}

/// Verify the caller's token if one was sent.
///
/// Any failure, including an unconfigured verifier, downgrades the caller
/// to anonymous.
pub async fn optional_identity(state: &ApiState, headers: &HeaderMap) -> Option<Identity> {
    match require_identity(state, headers).await {
        Ok(identity) => Some(identity),
        Err(AuthError::Missing) => None,
        Err(e) => {
            debug!(error = %e, "treating caller as anonymous");
            None
        }
    }
}
