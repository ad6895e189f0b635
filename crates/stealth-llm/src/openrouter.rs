//! Primary provider: OpenAI-compatible chat completions (OpenRouter).
//!
//! The rubric goes in a system message and the pitch in a user message.
//! Any endpoint that speaks the OpenAI chat format works if `base_url` is
//! pointed at it.

use async_trait::async_trait;
use stealth_types::{ScoreVector, SecretString};
use stealth_types::config::ProviderConfig;
use tracing::debug;

use crate::config::LlmProviderConfig;
use crate::error::{ProviderError, Result};
use crate::provider::ScoringProvider;
use crate::rubric::{parse_scores, system_prompt};
use crate::types::{ChatMessage, ChatRequest, ChatResponse};

/// Scores pitches through an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenRouterProvider {
    config: LlmProviderConfig,
    http: reqwest::Client,
    api_key: Option<SecretString>,
}

impl OpenRouterProvider {
    /// Create a provider whose API key is read from `config.api_key_env` at
    /// request time.
    pub fn new(config: LlmProviderConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            api_key: None,
        }
    }

    /// Create a provider with an explicit API key.
    pub fn with_api_key(config: LlmProviderConfig, api_key: SecretString) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            api_key: Some(api_key),
        }
    }

    /// Build from user overrides layered over the OpenRouter defaults.
    pub fn from_settings(overrides: &ProviderConfig) -> Self {
        let (config, key) = LlmProviderConfig::openrouter().apply(overrides);
        match key {
            Some(key) => Self::with_api_key(config, key),
            None => Self::new(config),
        }
    }

    pub fn config(&self) -> &LlmProviderConfig {
        &self.config
    }

    fn completions_url(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{base}/chat/completions")
    }

    /// Resolve the API key: explicit key > environment variable.
    fn resolve_api_key(&self) -> Result<SecretString> {
        resolve_api_key(self.api_key.as_ref(), &self.config.api_key_env)
    }
}

#[async_trait]
impl ScoringProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn is_configured(&self) -> bool {
        self.resolve_api_key().is_ok()
    }

    async fn score(&self, text: &str) -> Result<ScoreVector> {
        let api_key = self.resolve_api_key()?;
        let request = ChatRequest::deterministic(
            &self.config.model,
            vec![ChatMessage::system(system_prompt()), ChatMessage::user(text)],
        );

        debug!(
            provider = %self.config.name,
            model = %self.config.model,
            "sending scoring request"
        );

        let mut req = self
            .http
            .post(self.completions_url())
            .timeout(self.config.timeout())
            .header("Authorization", format!("Bearer {}", api_key.expose()))
            .header("Content-Type", "application/json");

        for (k, v) in &self.config.headers {
            req = req.header(k.as_str(), v.as_str());
        }

        let response = req.json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("failed to parse response: {}", e.without_url()))
        })?;
        let content = chat.first_text().ok_or(ProviderError::EmptyResponse)?;
        let scores = parse_scores(content)?;

        debug!(provider = %self.config.name, "scores received");
        Ok(scores)
    }
}

impl std::fmt::Debug for OpenRouterProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterProvider")
            .field("name", &self.config.name)
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Explicit key first, then the named environment variable.
pub(crate) fn resolve_api_key(explicit: Option<&SecretString>, env: &str) -> Result<SecretString> {
    if let Some(key) = explicit {
        return Ok(key.clone());
    }
    SecretString::from_env(env)
        .ok_or_else(|| ProviderError::NotConfigured(format!("set {env} env var")))
}

/// Map a non-success status to a provider error. The body is not kept:
/// upstream error bodies can quote the prompt back.
pub(crate) fn status_error(status: reqwest::StatusCode) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthFailed {
            status: status.as_u16(),
        },
        429 => ProviderError::RateLimited,
        _ => ProviderError::RequestFailed(format!("HTTP {status}")),
    }
}
