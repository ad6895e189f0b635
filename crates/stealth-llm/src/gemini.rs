//! Fallback provider: Gemini `generateContent`.
//!
//! Gemini takes one prompt field, so the rubric and the pitch travel
//! together. The API key goes in the `key` query parameter, which is why
//! reqwest errors are stripped of their URL before they surface.

use async_trait::async_trait;
use stealth_types::{ScoreVector, SecretString};
use stealth_types::config::ProviderConfig;
use tracing::debug;

use crate::config::LlmProviderConfig;
use crate::error::{ProviderError, Result};
use crate::openrouter::{resolve_api_key, status_error};
use crate::provider::ScoringProvider;
use crate::rubric::{parse_scores, single_prompt};
use crate::types::{GenerateRequest, GenerateResponse};

/// Scores pitches through Gemini's `models/{model}:generateContent`.
pub struct GeminiProvider {
    config: LlmProviderConfig,
    http: reqwest::Client,
    api_key: Option<SecretString>,
}

impl GeminiProvider {
    pub fn new(config: LlmProviderConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            api_key: None,
        }
    }

    pub fn with_api_key(config: LlmProviderConfig, api_key: SecretString) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            api_key: Some(api_key),
        }
    }

    /// Build from user overrides layered over the Gemini defaults.
    pub fn from_settings(overrides: &ProviderConfig) -> Self {
        let (config, key) = LlmProviderConfig::gemini().apply(overrides);
        match key {
            Some(key) => Self::with_api_key(config, key),
            None => Self::new(config),
        }
    }

    pub fn config(&self) -> &LlmProviderConfig {
        &self.config
    }

    fn generate_url(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("{base}/models/{}:generateContent", self.config.model)
    }
}

#[async_trait]
impl ScoringProvider for GeminiProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn is_configured(&self) -> bool {
        resolve_api_key(self.api_key.as_ref(), &self.config.api_key_env).is_ok()
    }

    async fn score(&self, text: &str) -> Result<ScoreVector> {
        let api_key = resolve_api_key(self.api_key.as_ref(), &self.config.api_key_env)?;
        let request = GenerateRequest::single_prompt(single_prompt(text));

        debug!(
            provider = %self.config.name,
            model = %self.config.model,
            "sending scoring request"
        );

        let mut req = self
            .http
            .post(self.generate_url())
            .query(&[("key", api_key.expose())])
            .timeout(self.config.timeout())
            .header("Content-Type", "application/json");

        for (k, v) in &self.config.headers {
            req = req.header(k.as_str(), v.as_str());
        }

        let response = req.json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status));
        }

        let generated: GenerateResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("failed to parse response: {}", e.without_url()))
        })?;
        let content = generated.first_text().ok_or(ProviderError::EmptyResponse)?;
        let scores = parse_scores(content)?;

        debug!(provider = %self.config.name, "scores received");
        Ok(scores)
    }
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("name", &self.config.name)
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}
