//! Credit gating and background credit decrements.
//!
//! [`CreditLedger`] answers "may this caller run an analysis?" inline, and
//! queues the post-analysis decrement to a worker task over an unbounded
//! channel. The worker applies decrements one at a time through the
//! [`ProfileStore`]; failures are logged and dropped, never reported back to
//! the request that caused them.

use std::sync::Arc;

use stealth_types::profile::ProfileDefaults;
use stealth_types::{Identity, ScoringError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::profiles::{ProfileStore, get_or_create};

#[derive(Debug)]
struct ChargeJob {
    user_id: String,
}

/// Handle to the credit gate and the decrement queue. Cheap to clone.
#[derive(Clone)]
pub struct CreditLedger {
    store: Arc<dyn ProfileStore>,
    defaults: ProfileDefaults,
    tx: mpsc::UnboundedSender<ChargeJob>,
}

impl CreditLedger {
    /// Start the decrement worker.
    ///
    /// The worker exits when `cancel` fires (after draining queued jobs) or
    /// when every ledger handle has been dropped.
    pub fn spawn(
        store: Arc<dyn ProfileStore>,
        defaults: ProfileDefaults,
        cost: i64,
        cancel: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(store.clone(), cost, rx, cancel));
        (
            Self {
                store,
                defaults,
                tx,
            },
            handle,
        )
    }

    pub fn store(&self) -> &Arc<dyn ProfileStore> {
        &self.store
    }

    pub fn defaults(&self) -> &ProfileDefaults {
        &self.defaults
    }

    /// Fail with [`ScoringError::QuotaExceeded`] if the caller has no
    /// credits left. A missing profile is created with the defaults first.
    ///
    /// Store failures fail closed as [`ScoringError::Internal`].
    pub async fn ensure_credits(&self, identity: &Identity) -> Result<(), ScoringError> {
        let profile = get_or_create(self.store.as_ref(), identity, &self.defaults)
            .await
            .map_err(|e| ScoringError::Internal(format!("profile lookup: {e}")))?;
        if profile.has_credits() {
            Ok(())
        } else {
            info!(user_id = %identity.id, "credit gate: no credits remaining");
            Err(ScoringError::QuotaExceeded)
        }
    }

    /// Queue one decrement for `user_id`. Never blocks.
    pub fn charge(&self, user_id: &str) {
        let job = ChargeJob {
            user_id: user_id.to_owned(),
        };
        if let Err(e) = self.tx.send(job) {
            warn!(user_id = %e.0.user_id, "credit worker gone, decrement dropped");
        }
    }
}

impl std::fmt::Debug for CreditLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreditLedger")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

async fn run_worker(
    store: Arc<dyn ProfileStore>,
    cost: i64,
    mut rx: mpsc::UnboundedReceiver<ChargeJob>,
    cancel: CancellationToken,
) {
    info!(cost, "credit worker started");
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                while let Ok(job) = rx.try_recv() {
                    apply(store.as_ref(), cost, job).await;
                }
                info!("credit worker shutting down");
                return;
            }
            job = rx.recv() => match job {
                Some(job) => apply(store.as_ref(), cost, job).await,
                None => {
                    debug!("all ledger handles dropped, credit worker exiting");
                    return;
                }
            }
        }
    }
}

async fn apply(store: &dyn ProfileStore, cost: i64, job: ChargeJob) {
    match store.decrement_credits(&job.user_id, cost).await {
        Ok(profile) => debug!(
            user_id = %job.user_id,
            credits_remaining = profile.credits_remaining,
            "credits decremented"
        ),
        Err(e) => warn!(user_id = %job.user_id, error = %e, "credit decrement failed"),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use stealth_types::{ProfileError, UserProfile};

    use super::*;
    use crate::profiles::InMemoryProfileStore;

    fn defaults(credits: i64) -> ProfileDefaults {
        ProfileDefaults {
            subscription_tier: "free".into(),
            credits,
        }
    }

    #[tokio::test]
    async fn gate_creates_missing_profile() {
        let store = Arc::new(InMemoryProfileStore::new());
        let (ledger, _h) =
            CreditLedger::spawn(store.clone(), defaults(10), 1, CancellationToken::new());
        ledger.ensure_credits(&Identity::new("new-user")).await.unwrap();
        assert_eq!(store.get("new-user").await.unwrap().unwrap().credits_remaining, 10);
    }

    #[tokio::test]
    async fn gate_rejects_empty_balance() {
        let store = Arc::new(InMemoryProfileStore::new());
        let (ledger, _h) =
            CreditLedger::spawn(store.clone(), defaults(0), 1, CancellationToken::new());
        let err = ledger.ensure_credits(&Identity::new("broke")).await.unwrap_err();
        assert!(matches!(err, ScoringError::QuotaExceeded));
    }

    #[tokio::test]
    async fn charges_apply_and_worker_exits_on_drop() {
        let store = Arc::new(InMemoryProfileStore::new());
        store.create(&Identity::new("u"), &defaults(5)).await.unwrap();
        let (ledger, handle) =
            CreditLedger::spawn(store.clone(), defaults(5), 1, CancellationToken::new());
        ledger.charge("u");
        ledger.charge("u");
        drop(ledger);
        handle.await.unwrap();
        let p = store.get("u").await.unwrap().unwrap();
        assert_eq!(p.credits_remaining, 3);
        assert_eq!(p.total_analyses, 2);
    }

    #[tokio::test]
    async fn cancel_drains_queue() {
        let store = Arc::new(InMemoryProfileStore::new());
        store.create(&Identity::new("u"), &defaults(5)).await.unwrap();
        let cancel = CancellationToken::new();
        let (ledger, handle) = CreditLedger::spawn(store.clone(), defaults(5), 2, cancel.clone());
        ledger.charge("u");
        cancel.cancel();
        handle.await.unwrap();
        assert_eq!(store.get("u").await.unwrap().unwrap().credits_remaining, 3);
    }

    #[tokio::test]
    async fn failed_decrement_does_not_stop_worker() {
        let store = Arc::new(InMemoryProfileStore::new());
        store.create(&Identity::new("u"), &defaults(5)).await.unwrap();
        let (ledger, handle) =
            CreditLedger::spawn(store.clone(), defaults(5), 1, CancellationToken::new());
        ledger.charge("ghost");
        ledger.charge("u");
        drop(ledger);
        handle.await.unwrap();
        assert_eq!(store.get("u").await.unwrap().unwrap().credits_remaining, 4);
    }

    struct BrokenStore;

    #[async_trait]
    impl ProfileStore for BrokenStore {
        async fn get(&self, _id: &str) -> Result<Option<UserProfile>, ProfileError> {
            Err(ProfileError::Backend("connection refused".into()))
        }
        async fn create(
            &self,
            _identity: &Identity,
            _defaults: &ProfileDefaults,
        ) -> Result<UserProfile, ProfileError> {
            Err(ProfileError::Backend("connection refused".into()))
        }
        async fn decrement_credits(&self, _id: &str, _n: i64) -> Result<UserProfile, ProfileError> {
            Err(ProfileError::Backend("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn store_outage_fails_closed() {
        let (ledger, _h) =
            CreditLedger::spawn(Arc::new(BrokenStore), defaults(10), 1, CancellationToken::new());
        let err = ledger.ensure_credits(&Identity::new("u")).await.unwrap_err();
        assert!(matches!(err, ScoringError::Internal(_)));
    }
}
