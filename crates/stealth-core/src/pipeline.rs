//! The scoring pipeline coordinator.
//!
//! One [`ScoringPipeline::handle`] call is one request:
//!
//! 1. credit gate (authenticated callers only), before any decryption
//! 2. decode and decrypt the envelope
//! 3. sanitize the plaintext
//! 4. run the fallback orchestrator
//! 5. compute the receipt over the original ciphertext
//! 6. queue a credit decrement (authenticated callers only)
//!
//! Plaintext buffers are [`Zeroizing`](zeroize::Zeroizing) and are dropped
//! before the function returns on every path.

use std::sync::Arc;

use stealth_llm::FallbackOrchestrator;
use stealth_types::{Identity, ScoreRequest, ScoringError, ScoringResult};
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::credits::CreditLedger;
use crate::envelope::{self, MIN_PLAINTEXT_CHARS};
use crate::receipt::Receipt;
use crate::sanitize::sanitize;

/// Composes envelope codec, sanitizer, orchestrator, receipt and credits.
pub struct ScoringPipeline {
    orchestrator: Arc<FallbackOrchestrator>,
    credits: Option<CreditLedger>,
    clock: Arc<dyn Clock>,
}

impl ScoringPipeline {
    /// A pipeline with no credit gating and the system clock.
    pub fn new(orchestrator: FallbackOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            credits: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Gate authenticated callers on their credit balance.
    pub fn with_credits(mut self, ledger: CreditLedger) -> Self {
        self.credits = Some(ledger);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn orchestrator(&self) -> &FallbackOrchestrator {
        &self.orchestrator
    }

    pub fn credits(&self) -> Option<&CreditLedger> {
        self.credits.as_ref()
    }

    /// Score one encrypted submission.
    ///
    /// Provider failures never surface here; the only errors are malformed
    /// or undecryptable submissions, an exhausted balance, and internal
    /// failures of the credit gate.
    pub async fn handle(
        &self,
        request: &ScoreRequest,
        identity: Option<&Identity>,
    ) -> Result<ScoringResult, ScoringError> {
        let ledger = identity.and(self.credits.as_ref());
        if let (Some(id), Some(ledger)) = (identity, ledger) {
            ledger.ensure_credits(id).await?;
        }

        let plaintext = envelope::decode(
            &request.ciphertext,
            request.aes_key.expose(),
            request.iv.expose(),
        )
        .inspect_err(|e| warn!(category = e.category(), "submission rejected"))?;

        let text = sanitize(plaintext.as_str());
        drop(plaintext);
        if text.chars().count() < MIN_PLAINTEXT_CHARS {
            warn!(category = "validation", "submission too short after sanitation");
            return Err(ScoringError::validation(format!(
                "submission shorter than {MIN_PLAINTEXT_CHARS} characters after sanitation"
            )));
        }

        let mode = self
            .orchestrator
            .start_mode(request.model.as_deref(), request.use_fallback);
        let now = self.clock.now_unix();
        let outcome = self.orchestrator.run(&text, mode, now).await;
        drop(text);

        let timestamp = now.to_string();
        let receipt = Receipt::generate(&request.ciphertext, &outcome.model, &timestamp, &outcome.scores);

        if let (Some(id), Some(ledger)) = (identity, ledger) {
            ledger.charge(&id.id);
        }

        info!(
            model = %outcome.model,
            source = outcome.source.as_str(),
            authenticated = identity.is_some(),
            "submission scored"
        );

        Ok(ScoringResult {
            scores: outcome.scores,
            receipt: receipt.into_string(),
            timestamp,
            model: outcome.model,
        })
    }
}

impl std::fmt::Debug for ScoringPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringPipeline")
            .field("orchestrator", &self.orchestrator)
            .field("credits", &self.credits.is_some())
            .finish_non_exhaustive()
    }
}
