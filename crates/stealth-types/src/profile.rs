//! Caller identity and the stored user profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An authenticated caller, as extracted from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable user id (the token's `sub` claim).
    pub id: String,

    #[serde(default)]
    pub email: Option<String>,

    /// Display name from the token's user metadata, if any.
    #[serde(default)]
    pub full_name: Option<String>,

    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl Identity {
    /// An identity with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            full_name: None,
            avatar_url: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Values applied to a freshly created profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDefaults {
    pub subscription_tier: String,
    pub credits: i64,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self {
            subscription_tier: "free".into(),
            credits: 10,
        }
    }
}

/// A user's stored profile and credit balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub avatar_url: String,
    pub subscription_tier: String,
    /// Remaining analyses. Never negative once written by a store.
    pub credits_remaining: i64,
    pub total_analyses: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub preferences: Value,
}

impl UserProfile {
    /// Build a new profile for `identity` with the given defaults.
    pub fn new(identity: &Identity, defaults: &ProfileDefaults, now: DateTime<Utc>) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            full_name: identity.full_name.clone().unwrap_or_default(),
            avatar_url: identity.avatar_url.clone().unwrap_or_default(),
            subscription_tier: defaults.subscription_tier.clone(),
            credits_remaining: defaults.credits,
            total_analyses: 0,
            created_at: now,
            updated_at: now,
            preferences: Value::Object(Default::default()),
        }
    }

    /// Whether the balance allows another analysis.
    pub fn has_credits(&self) -> bool {
        self.credits_remaining > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_uses_defaults() {
        let id = Identity::new("u-1").with_email("a@b.co");
        let p = UserProfile::new(&id, &ProfileDefaults::default(), Utc::now());
        assert_eq!(p.subscription_tier, "free");
        assert_eq!(p.credits_remaining, 10);
        assert_eq!(p.total_analyses, 0);
        assert_eq!(p.email.as_deref(), Some("a@b.co"));
        assert_eq!(p.full_name, "");
        assert!(p.preferences.as_object().is_some_and(|m| m.is_empty()));
    }

    #[test]
    fn zero_balance_has_no_credits() {
        let defaults = ProfileDefaults {
            subscription_tier: "free".into(),
            credits: 0,
        };
        let p = UserProfile::new(&Identity::new("u"), &defaults, Utc::now());
        assert!(!p.has_credits());
    }
}
