//! Configuration schema types.
//!
//! All structs accept both `snake_case` and `camelCase` field names in JSON
//! via `#[serde(alias)]`. Unknown fields are silently ignored. Every field has
//! a default, so `{}` is a valid config and equals [`Config::default`].
//!
//! Provider slots are fixed: `primary` speaks the OpenAI-compatible chat
//! format (OpenRouter by default), `fallback` speaks Gemini's
//! `generateContent` format. A slot's unset fields fall back to that
//! provider's built-in defaults at construction time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::profile::ProfileDefaults;
use crate::secret::SecretString;

/// Root configuration for the scoring service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Upstream model endpoints.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Orchestrator settings.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Bearer-token verification.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Credit bookkeeping.
    #[serde(default)]
    pub credits: CreditsConfig,

    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,
}

/// The two provider slots.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub primary: ProviderConfig,

    #[serde(default)]
    pub fallback: ProviderConfig,
}

/// Overrides for one provider slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Explicit API key. Takes precedence over `api_key_env`.
    #[serde(default, alias = "apiKey")]
    pub api_key: SecretString,

    /// Environment variable holding the API key.
    #[serde(default, alias = "apiKeyEnv")]
    pub api_key_env: Option<String>,

    /// Base URL override.
    #[serde(default, alias = "baseUrl", alias = "apiBase")]
    pub base_url: Option<String>,

    /// Model identifier override.
    #[serde(default)]
    pub model: Option<String>,

    /// Extra HTTP headers sent with every request.
    #[serde(default, alias = "extraHeaders")]
    pub extra_headers: HashMap<String, String>,

    /// Per-request timeout in seconds.
    #[serde(default, alias = "timeoutSecs")]
    pub timeout_secs: Option<u64>,
}

/// Fallback orchestrator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// `model` value reported when neither provider produced scores.
    #[serde(default = "default_mock_label", alias = "mockLabel")]
    pub mock_label: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mock_label: default_mock_label(),
        }
    }
}

fn default_mock_label() -> String {
    "mock".into()
}

/// Bearer-token verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret. Empty means "read from `jwt_secret_env`".
    #[serde(default, alias = "jwtSecret")]
    pub jwt_secret: SecretString,

    /// Environment variable holding the signing secret.
    #[serde(default = "default_jwt_secret_env", alias = "jwtSecretEnv")]
    pub jwt_secret_env: String,

    /// Required `aud` claim.
    #[serde(default = "default_audience")]
    pub audience: String,
}

impl AuthConfig {
    /// The signing secret: explicit value first, then the environment.
    pub fn resolve_secret(&self) -> Option<SecretString> {
        if !self.jwt_secret.is_empty() {
            return Some(self.jwt_secret.clone());
        }
        SecretString::from_env(&self.jwt_secret_env)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::default(),
            jwt_secret_env: default_jwt_secret_env(),
            audience: default_audience(),
        }
    }
}

fn default_jwt_secret_env() -> String {
    "STEALTH_JWT_SECRET".into()
}

fn default_audience() -> String {
    "authenticated".into()
}

/// Credit bookkeeping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditsConfig {
    /// Balance given to a newly created profile.
    #[serde(default = "default_credits", alias = "defaultCredits")]
    pub default_credits: i64,

    /// Credits charged per successful analysis.
    #[serde(default = "default_cost", alias = "costPerAnalysis")]
    pub cost_per_analysis: i64,

    /// Tier assigned to a newly created profile.
    #[serde(default = "default_tier", alias = "defaultTier")]
    pub default_tier: String,
}

impl CreditsConfig {
    pub fn profile_defaults(&self) -> ProfileDefaults {
        ProfileDefaults {
            subscription_tier: self.default_tier.clone(),
            credits: self.default_credits,
        }
    }
}

impl Default for CreditsConfig {
    fn default() -> Self {
        Self {
            default_credits: default_credits(),
            cost_per_analysis: default_cost(),
            default_tier: default_tier(),
        }
    }
}

fn default_credits() -> i64 {
    10
}
fn default_cost() -> i64 {
    1
}
fn default_tier() -> String {
    "free".into()
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins. Empty means permissive.
    #[serde(default, alias = "corsOrigins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8000
}
