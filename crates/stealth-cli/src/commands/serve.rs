//! `stealth serve` -- run the HTTP scoring API.
//!
//! Wires the configured providers, the in-memory profile store, the credit
//! worker and the bearer verifier into one router, then serves it until
//! Ctrl-C. The credit worker drains its queue before the process exits.
//!
//! # Example
//!
//! ```text
//! stealth serve
//! stealth serve --port 9000 --config ./stealth.json
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Args;
use stealth_core::{CreditLedger, InMemoryProfileStore, JwtVerifier, ScoringPipeline};
use stealth_llm::FallbackOrchestrator;
use stealth_services::{ApiState, build_router, serve};
use stealth_types::config::Config;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::load_config;

/// Arguments for the `stealth serve` subcommand.
#[derive(Args)]
pub struct ServeArgs {
    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,

    /// Listen host (overrides `server.host`).
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (overrides `server.port`).
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Run the serve command.
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref()).await?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let cancel = CancellationToken::new();
    let (state, worker) = build_state(&config, cancel.clone());
    let router = build_router(state, &config.server.cors_origins);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid listen address: {e}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;

    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
        }
        ctrl_c.cancel();
    });

    let served = serve(listener, router, cancel.clone()).await;
    cancel.cancel();
    if let Err(e) = worker.await {
        warn!(error = %e, "credit worker ended abnormally");
    }
    served.map_err(|e| anyhow::anyhow!("server error: {e}"))
}

/// Assemble the API state from configuration.
///
/// Returns the credit worker's handle; it exits once `cancel` fires.
pub fn build_state(config: &Config, cancel: CancellationToken) -> (ApiState, JoinHandle<()>) {
    let orchestrator = FallbackOrchestrator::from_config(&config.providers, &config.scoring);
    if !orchestrator.primary().is_configured() && !orchestrator.fallback().is_configured() {
        warn!("no provider API keys configured, every request will get mock scores");
    }

    let defaults = config.credits.profile_defaults();
    let store = Arc::new(InMemoryProfileStore::new());
    let (ledger, worker) = CreditLedger::spawn(
        store.clone(),
        defaults.clone(),
        config.credits.cost_per_analysis,
        cancel,
    );
    let pipeline = ScoringPipeline::new(orchestrator).with_credits(ledger);

    let mut state = ApiState::new(Arc::new(pipeline), store).with_defaults(defaults);
    match JwtVerifier::from_config(&config.auth) {
        Some(verifier) => state = state.with_verifier(Arc::new(verifier)),
        None => warn!(
            env = %config.auth.jwt_secret_env,
            "no JWT secret configured, all callers are anonymous"
        ),
    }
    (state, worker)
}
