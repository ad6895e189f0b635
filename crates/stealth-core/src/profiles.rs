//! User profile storage.
//!
//! [`ProfileStore`] is the repository seam; a hosted database sits behind it
//! in production. [`InMemoryProfileStore`] keeps profiles in a [`DashMap`]
//! and makes each update atomic per entry.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use stealth_types::profile::ProfileDefaults;
use stealth_types::{Identity, ProfileError, UserProfile};

/// Read and update user profiles.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a profile, `None` if it does not exist.
    async fn get(&self, id: &str) -> Result<Option<UserProfile>, ProfileError>;

    /// Create a profile for `identity`. Fails with
    /// [`ProfileError::AlreadyExists`] if one is already stored.
    async fn create(
        &self,
        identity: &Identity,
        defaults: &ProfileDefaults,
    ) -> Result<UserProfile, ProfileError>;

    /// Subtract `n` credits (floored at zero) and count one analysis, as one
    /// atomic update.
    async fn decrement_credits(&self, id: &str, n: i64) -> Result<UserProfile, ProfileError>;
}

/// Fetch the caller's profile, creating it with `defaults` if missing.
pub async fn get_or_create(
    store: &dyn ProfileStore,
    identity: &Identity,
    defaults: &ProfileDefaults,
) -> Result<UserProfile, ProfileError> {
    if let Some(profile) = store.get(&identity.id).await? {
        return Ok(profile);
    }
    match store.create(identity, defaults).await {
        Ok(profile) => Ok(profile),
        // Lost a race with a concurrent create.
        Err(ProfileError::AlreadyExists(_)) => store
            .get(&identity.id)
            .await?
            .ok_or_else(|| ProfileError::NotFound(identity.id.clone())),
        Err(e) => Err(e),
    }
}

/// Process-local profile store.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: DashMap<String, UserProfile>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile.
    pub fn insert(&self, profile: UserProfile) {
        self.profiles.insert(profile.id.clone(), profile);
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, id: &str) -> Result<Option<UserProfile>, ProfileError> {
        Ok(self.profiles.get(id).map(|p| p.value().clone()))
    }

    async fn create(
        &self,
        identity: &Identity,
        defaults: &ProfileDefaults,
    ) -> Result<UserProfile, ProfileError> {
        match self.profiles.entry(identity.id.clone()) {
            Entry::Occupied(_) => Err(ProfileError::AlreadyExists(identity.id.clone())),
            Entry::Vacant(slot) => {
                let profile = UserProfile::new(identity, defaults, Utc::now());
                slot.insert(profile.clone());
                Ok(profile)
            }
        }
    }

    async fn decrement_credits(&self, id: &str, n: i64) -> Result<UserProfile, ProfileError> {
        let mut entry = self
            .profiles
            .get_mut(id)
            .ok_or_else(|| ProfileError::NotFound(id.to_owned()))?;
        let profile = entry.value_mut();
        profile.credits_remaining = profile.credits_remaining.saturating_sub(n).max(0);
        profile.total_analyses = profile.total_analyses.saturating_add(1);
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn defaults(credits: i64) -> ProfileDefaults {
        ProfileDefaults {
            subscription_tier: "free".into(),
            credits,
        }
    }

    #[tokio::test]
    async fn create_then_get() {
        let store = InMemoryProfileStore::new();
        let id = Identity::new("u1").with_email("u1@example.com");
        let created = store.create(&id, &defaults(10)).await.unwrap();
        assert_eq!(created.credits_remaining, 10);
        let fetched = store.get("u1").await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn duplicate_create_conflicts() {
        let store = InMemoryProfileStore::new();
        let id = Identity::new("u1");
        store.create(&id, &defaults(10)).await.unwrap();
        assert_eq!(
            store.create(&id, &defaults(10)).await,
            Err(ProfileError::AlreadyExists("u1".into()))
        );
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        assert!(InMemoryProfileStore::new().get("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn decrement_floors_at_zero() {
        let store = InMemoryProfileStore::new();
        store.create(&Identity::new("u"), &defaults(1)).await.unwrap();
        let p = store.decrement_credits("u", 1).await.unwrap();
        assert_eq!(p.credits_remaining, 0);
        assert_eq!(p.total_analyses, 1);
        let p = store.decrement_credits("u", 5).await.unwrap();
        assert_eq!(p.credits_remaining, 0);
        assert_eq!(p.total_analyses, 2);
    }

    #[tokio::test]
    async fn decrement_missing_profile() {
        let store = InMemoryProfileStore::new();
        assert_eq!(
            store.decrement_credits("ghost", 1).await,
            Err(ProfileError::NotFound("ghost".into()))
        );
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let store = InMemoryProfileStore::new();
        let id = Identity::new("u");
        let a = get_or_create(&store, &id, &defaults(10)).await.unwrap();
        store.decrement_credits("u", 1).await.unwrap();
        let b = get_or_create(&store, &id, &defaults(10)).await.unwrap();
        assert_eq!(a.created_at, b.created_at);
        assert_eq!(b.credits_remaining, 9);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_decrements_are_not_lost() {
        let store = Arc::new(InMemoryProfileStore::new());
        store.create(&Identity::new("u"), &defaults(100)).await.unwrap();
        let mut handles = Vec::new();
        for _ in 0..40 {
            let s = store.clone();
            handles.push(tokio::spawn(async move { s.decrement_credits("u", 1).await }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }
        let p = store.get("u").await.unwrap().unwrap();
        assert_eq!(p.credits_remaining, 60);
        assert_eq!(p.total_analyses, 40);
    }
}
