//! REST API for the scoring service.
//!
//! Routes:
//!
//! - `GET /` and `GET /health` -- service and provider status
//! - `POST /score` -- score an encrypted submission (optional bearer auth)
//! - `GET /user/profile` -- the caller's profile (bearer auth required)

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use stealth_core::{IdentityVerifier, ProfileStore, ScoringPipeline};
use stealth_types::profile::ProfileDefaults;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state accessible by all API handlers.
#[derive(Clone)]
pub struct ApiState {
    /// The scoring pipeline.
    pub pipeline: Arc<ScoringPipeline>,
    /// Bearer-token verifier. `None` means every caller is anonymous and
    /// `/user/profile` answers 500.
    pub verifier: Option<Arc<dyn IdentityVerifier>>,
    /// Profile store backing `/user/profile`.
    pub profiles: Arc<dyn ProfileStore>,
    /// Defaults for profiles created on first sight.
    pub defaults: ProfileDefaults,
}

impl ApiState {
    pub fn new(pipeline: Arc<ScoringPipeline>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            pipeline,
            verifier: None,
            profiles,
            defaults: ProfileDefaults::default(),
        }
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn IdentityVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn with_defaults(mut self, defaults: ProfileDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

/// Build the API router with all routes.
pub fn build_router(state: ApiState, cors_origins: &[String]) -> Router {
    let cors = if cors_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(handlers::api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

/// Serve `router` on `listener` until `cancel` fires.
///
/// In-flight requests are allowed to finish after cancellation.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    cancel: CancellationToken,
) -> std::io::Result<()> {
    info!(addr = %listener.local_addr()?, "scoring API listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;
    info!("scoring API stopped");
    Ok(())
}
