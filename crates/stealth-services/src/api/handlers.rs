//! HTTP request handlers for the REST API.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use stealth_core::get_or_create;
use stealth_types::{ScoreRequest, ScoringResult, UserProfile};
use tracing::info;

use super::{ApiState, auth};
use crate::error::ApiError;

/// Name reported by the health endpoints.
pub const SERVICE_NAME: &str = "stealth-code-backend";

/// Build all API routes.
pub fn api_routes() -> Router<ApiState> {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/score", post(score))
        .route("/user/profile", get(user_profile))
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    /// Unix seconds with fractional part.
    pub timestamp: f64,
    pub service: &'static str,
    pub version: &'static str,
    pub openrouter_configured: bool,
    pub gemini_configured: bool,
    pub primary_model: String,
    pub fallback_model: String,
    pub features: Features,
}

#[derive(Debug, Clone, Serialize)]
pub struct Features {
    pub encryption: bool,
    pub ai_analysis: bool,
    pub receipt_generation: bool,
    pub dual_ai_support: bool,
}

async fn health_check(State(state): State<ApiState>) -> Json<HealthReport> {
    let orch = state.pipeline.orchestrator();
    let primary = orch.primary().is_configured();
    let fallback = orch.fallback().is_configured();
    let now = chrono::Utc::now();

    Json(HealthReport {
        status: "healthy",
        timestamp: now.timestamp_millis() as f64 / 1000.0,
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        openrouter_configured: primary,
        gemini_configured: fallback,
        primary_model: orch.primary().model().to_owned(),
        fallback_model: orch.fallback().model().to_owned(),
        features: Features {
            encryption: true,
            ai_analysis: primary || fallback,
            receipt_generation: true,
            dual_ai_support: primary && fallback,
        },
    })
}

async fn score(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ScoringResult>, ApiError> {
    let request = parse_score_request(&body)?;
    let identity = auth::optional_identity(&state, &headers).await;
    match &identity {
        Some(id) => info!(user_id = %id.id, "encrypted submission received"),
        None => info!("encrypted submission received from anonymous caller"),
    }
    let result = state.pipeline.handle(&request, identity.as_ref()).await?;
    Ok(Json(result))
}

/// Fields a `/score` body cannot do without.
const CRYPTO_FIELDS: [&str; 3] = ["ciphertext", "aes_key", "iv"];

/// Parse a `/score` body.
///
/// Broken JSON, a missing crypto field and a field of the wrong type are
/// reported separately. The parser's own message is dropped since it can
/// quote body content.
pub fn parse_score_request(body: &[u8]) -> Result<ScoreRequest, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::MalformedBody)?;
    if CRYPTO_FIELDS
        .iter()
        .any(|field| value.get(field).is_none_or(Value::is_null))
    {
        return Err(ApiError::MissingFields);
    }
    let request: ScoreRequest =
        serde_json::from_value(value).map_err(|_| ApiError::InvalidBody)?;
    if request.ciphertext.is_empty() || request.aes_key.is_empty() || request.iv.is_empty() {
        return Err(ApiError::MissingFields);
    }
    Ok(request)
}

async fn user_profile(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, ApiError> {
    let identity = auth::require_identity(&state, &headers).await?;
    let profile = get_or_create(state.profiles.as_ref(), &identity, &state.defaults).await?;
    Ok(Json(profile))
}
