//! Fallback orchestration across the two providers and the mock generator.
//!
//! [`FallbackOrchestrator`] walks `PRIMARY -> FALLBACK -> MOCK` and stops at
//! the first state that yields a valid, non-all-zero score vector. Providers
//! are called sequentially, once each. Every provider error is absorbed here:
//! [`run`](FallbackOrchestrator::run) cannot fail.

use std::sync::Arc;

use stealth_types::ScoreVector;
use stealth_types::config::{ProvidersConfig, ScoringConfig};
use tracing::{debug, info, warn};

use crate::error::ProviderError;
use crate::gemini::GeminiProvider;
use crate::mock::{hour_bucket, mock_scores};
use crate::openrouter::OpenRouterProvider;
use crate::provider::ScoringProvider;

/// Where the state machine starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    /// Try the primary, then the fallback, then mock.
    Primary,
    /// Skip the primary.
    FallbackOnly,
}

/// Which state produced the scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreSource {
    Primary,
    Fallback,
    Mock,
}

impl ScoreSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
            Self::Mock => "mock",
        }
    }
}

/// Result of one orchestration run.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub scores: ScoreVector,
    /// Model identifier of the variant that produced `scores`, or the mock
    /// label.
    pub model: String,
    pub source: ScoreSource,
}

/// Sequences the primary and fallback providers, then the mock generator.
pub struct FallbackOrchestrator {
    primary: Arc<dyn ScoringProvider>,
    fallback: Arc<dyn ScoringProvider>,
    mock_label: String,
}

impl FallbackOrchestrator {
    /// Create an orchestrator with the default mock label `"mock"`.
    pub fn new(primary: Arc<dyn ScoringProvider>, fallback: Arc<dyn ScoringProvider>) -> Self {
        Self {
            primary,
            fallback,
            mock_label: "mock".into(),
        }
    }

    /// Override the `model` value reported for mock scores.
    pub fn with_mock_label(mut self, label: impl Into<String>) -> Self {
        self.mock_label = label.into();
        self
    }

    /// Build the OpenRouter + Gemini pair from configuration.
    pub fn from_config(providers: &ProvidersConfig, scoring: &ScoringConfig) -> Self {
        let primary = Arc::new(OpenRouterProvider::from_settings(&providers.primary));
        let fallback = Arc::new(GeminiProvider::from_settings(&providers.fallback));
        Self::new(primary, fallback).with_mock_label(scoring.mock_label.clone())
    }

    pub fn primary(&self) -> &dyn ScoringProvider {
        self.primary.as_ref()
    }

    pub fn fallback(&self) -> &dyn ScoringProvider {
        self.fallback.as_ref()
    }

    pub fn mock_label(&self) -> &str {
        &self.mock_label
    }

    /// Pick the start state for a request.
    ///
    /// Fallback-only when the client asks for it explicitly, or when the
    /// requested model is the fallback provider's model. Any other requested
    /// model is ignored.
    pub fn start_mode(&self, requested_model: Option<&str>, fallback_requested: bool) -> StartMode {
        let names_fallback = requested_model.is_some_and(|m| m == self.fallback.model());
        if fallback_requested || names_fallback {
            StartMode::FallbackOnly
        } else {
            StartMode::Primary
        }
    }

    /// Run the state machine for `text`.
    ///
    /// `now_unix` seeds the mock generator when it is reached.
    pub async fn run(&self, text: &str, mode: StartMode, now_unix: u64) -> Outcome {
        let attempts: Vec<(&Arc<dyn ScoringProvider>, ScoreSource)> = match mode {
            StartMode::Primary => vec![
                (&self.primary, ScoreSource::Primary),
                (&self.fallback, ScoreSource::Fallback),
            ],
            StartMode::FallbackOnly => vec![(&self.fallback, ScoreSource::Fallback)],
        };

        for (provider, source) in attempts {
            if !provider.is_configured() {
                debug!(provider = %provider.name(), "provider not configured, skipping");
                continue;
            }
            match attempt(provider.as_ref(), text).await {
                Ok(scores) => {
                    info!(
                        provider = %provider.name(),
                        model = %provider.model(),
                        source = source.as_str(),
                        "scores produced"
                    );
                    return Outcome {
                        scores,
                        model: provider.model().to_owned(),
                        source,
                    };
                }
                Err(err) => {
                    warn!(
                        provider = %provider.name(),
                        error = %err,
                        "provider failed, trying next variant"
                    );
                }
            }
        }

        let hour = hour_bucket(now_unix);
        warn!(hour, label = %self.mock_label, "no live model answered, using mock scores");
        Outcome {
            scores: mock_scores(hour),
            model: self.mock_label.clone(),
            source: ScoreSource::Mock,
        }
    }
}

/// One provider call, with the all-zero rule enforced regardless of what the
/// provider itself checks.
async fn attempt(provider: &dyn ScoringProvider, text: &str) -> Result<ScoreVector, ProviderError> {
    let scores = provider.score(text).await?;
    if scores.is_all_zero() {
        return Err(ProviderError::AllZeroScores);
    }
    Ok(scores)
}

impl std::fmt::Debug for FallbackOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackOrchestrator")
            .field("primary", &self.primary.name())
            .field("fallback", &self.fallback.name())
            .field("mock_label", &self.mock_label)
            .finish()
    }
}
