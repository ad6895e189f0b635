//! Scoring providers for Stealth Code.
//!
//! Two upstream backends share one contract: turn sanitized pitch text into a
//! validated four-dimensional score vector, or fail.
//!
//! # Architecture
//!
//! - [`ScoringProvider`] trait defines the scoring interface
//! - [`OpenRouterProvider`] implements it for OpenAI-compatible chat APIs
//! - [`GeminiProvider`] implements it for Gemini `generateContent`
//! - [`FallbackOrchestrator`] sequences primary, fallback and mock
//! - [`rubric`] holds the prompts and the shared answer validation
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use stealth_llm::{FallbackOrchestrator, StartMode};
//! use stealth_types::config::Config;
//!
//! let cfg = Config::default();
//! let orch = FallbackOrchestrator::from_config(&cfg.providers, &cfg.scoring);
//! let outcome = orch.run("We build ...", StartMode::Primary, 1_700_000_000).await;
//! println!("{} -> {}", outcome.model, outcome.scores.canonical_json());
//! ```

pub mod config;
pub mod error;
pub mod failover;
pub mod gemini;
pub mod mock;
pub mod openrouter;
pub mod provider;
pub mod rubric;
pub mod types;

pub use config::LlmProviderConfig;
pub use error::{ProviderError, Result};
pub use failover::{FallbackOrchestrator, Outcome, ScoreSource, StartMode};
pub use gemini::GeminiProvider;
pub use openrouter::OpenRouterProvider;
pub use provider::ScoringProvider;
