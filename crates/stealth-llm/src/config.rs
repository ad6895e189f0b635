//! Provider connection settings and built-in endpoint definitions.
//!
//! [`LlmProviderConfig`] is the resolved, fully-populated form a provider is
//! built from. User-facing overrides live in
//! [`stealth_types::config::ProviderConfig`]; [`LlmProviderConfig::apply`]
//! layers them over a built-in definition.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stealth_types::SecretString;
use stealth_types::config::ProviderConfig;

/// Upper bound on one upstream call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for one scoring endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProviderConfig {
    /// Provider name used in logs (e.g. "openrouter").
    pub name: String,

    /// Base URL of the API, without a trailing path.
    pub base_url: String,

    /// Environment variable that holds the API key.
    pub api_key_env: String,

    /// Model identifier sent upstream and reported in results.
    pub model: String,

    /// Extra HTTP headers to include in every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Request timeout in seconds. Defaults to 30.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl LlmProviderConfig {
    /// OpenRouter's OpenAI-compatible endpoint serving Mistral Small.
    pub fn openrouter() -> Self {
        Self {
            name: "openrouter".into(),
            base_url: "https://openrouter.ai/api/v1".into(),
            api_key_env: "OPENROUTER_API_KEY".into(),
            model: "mistralai/mistral-small-2409".into(),
            headers: HashMap::from([
                ("HTTP-Referer".into(), "https://stealth-code.vercel.app".into()),
                ("X-Title".into(), "Stealth Code Pitch Analyzer".into()),
            ]),
            timeout_secs: None,
        }
    }

    /// Google's Gemini `generateContent` endpoint.
    pub fn gemini() -> Self {
        Self {
            name: "gemini".into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            api_key_env: "GEMINI_API_KEY".into(),
            model: "gemini-pro".into(),
            headers: HashMap::new(),
            timeout_secs: None,
        }
    }

    /// Layer user overrides over this definition.
    ///
    /// Returns the merged settings and the explicit API key, if one was given.
    pub fn apply(mut self, overrides: &ProviderConfig) -> (Self, Option<SecretString>) {
        if let Some(ref url) = overrides.base_url {
            self.base_url = url.clone();
        }
        if let Some(ref env) = overrides.api_key_env {
            self.api_key_env = env.clone();
        }
        if let Some(ref model) = overrides.model {
            self.model = model.clone();
        }
        if overrides.timeout_secs.is_some() {
            self.timeout_secs = overrides.timeout_secs;
        }
        for (k, v) in &overrides.extra_headers {
            self.headers.insert(k.clone(), v.clone());
        }
        let key = (!overrides.api_key.is_empty()).then(|| overrides.api_key.clone());
        (self, key)
    }

    /// The effective per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}
