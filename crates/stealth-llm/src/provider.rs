//! The core [`ScoringProvider`] trait.
//!
//! Both upstream backends implement this trait. They differ only in wire
//! format; validation of the model's answer is shared through
//! [`rubric::parse_scores`](crate::rubric::parse_scores).

use async_trait::async_trait;
use stealth_types::ScoreVector;

use crate::error::Result;

/// A backend that turns sanitized pitch text into a validated score vector.
///
/// One call to [`score`](ScoringProvider::score) is exactly one upstream
/// request, bounded by the provider's timeout. Implementations never retry.
///
/// # Example
///
/// ```rust,ignore
/// use stealth_llm::ScoringProvider;
///
/// async fn one_shot(p: &dyn ScoringProvider, text: &str) {
///     match p.score(text).await {
///         Ok(scores) => println!("{}: {}", p.model(), scores.canonical_json()),
///         Err(e) => eprintln!("{} failed: {e}", p.name()),
///     }
/// }
/// ```
#[async_trait]
pub trait ScoringProvider: Send + Sync {
    /// Provider name for logs (e.g. "openrouter", "gemini").
    fn name(&self) -> &str;

    /// Model identifier reported in results when this provider's scores win.
    fn model(&self) -> &str;

    /// Whether credentials are available. Unconfigured providers are skipped.
    fn is_configured(&self) -> bool;

    /// Score `text`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`](crate::error::ProviderError) on transport
    /// failure, a non-success status, an empty or unparseable answer, a
    /// missing or out-of-range score, or an all-zero vector.
    async fn score(&self, text: &str) -> Result<ScoreVector>;
}
