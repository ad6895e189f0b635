//! Mock HTTP server tests for both scoring providers and the orchestrator.
//!
//! Uses [`wiremock`] to stand up local servers that emulate OpenRouter's
//! chat completions API and Gemini's `generateContent`. This exercises the
//! full HTTP request/response path without hitting a real API.
//!
//! Coverage:
//! - Successful scoring on both wire formats
//! - Deterministic request parameters and custom headers
//! - API key in the Gemini query string
//! - Non-success status codes, empty content, prose answers, bad keys
//! - All-zero answers
//! - Orchestrator fallback over real HTTP providers

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stealth_llm::config::LlmProviderConfig;
use stealth_llm::error::ProviderError;
use stealth_llm::{
    FallbackOrchestrator, GeminiProvider, OpenRouterProvider, ScoreSource, ScoringProvider,
    StartMode,
};

const PITCH: &str = "We build modular vertical farms for dense cities, run by ex-logistics founders.";

fn openrouter_config(url: &str) -> LlmProviderConfig {
    LlmProviderConfig {
        base_url: url.into(),
        api_key_env: "STEALTH_MOCK_UNUSED_OR_KEY".into(),
        ..LlmProviderConfig::openrouter()
    }
}

fn gemini_config(url: &str) -> LlmProviderConfig {
    LlmProviderConfig {
        base_url: url.into(),
        api_key_env: "STEALTH_MOCK_UNUSED_GEMINI_KEY".into(),
        ..LlmProviderConfig::gemini()
    }
}

fn chat_body(content: &str) -> serde_json::Value {
    json!({
        "id": "gen-123",
        "object": "chat.completion",
        "model": "mistralai/mistral-small-2409",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

fn gemini_body(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP"
        }]
    })
}

const GOOD: &str = r#"{"clarity": 8.5, "originality": 7.2, "team_strength": 9.1, "market_fit": 8.8}"#;

// ── OpenRouter ─────────────────────────────────────────────────────────

#[tokio::test]
async fn openrouter_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-or-mock"))
        .and(header("X-Title", "Stealth Code Pitch Analyzer"))
        .and(header("HTTP-Referer", "https://stealth-code.vercel.app"))
        .and(body_partial_json(json!({
            "model": "mistralai/mistral-small-2409",
            "temperature": 0.0,
            "top_p": 1.0,
            "max_tokens": 200,
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(GOOD)))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::with_api_key(openrouter_config(&server.uri()), "sk-or-mock".into());
    let scores = provider.score(PITCH).await.unwrap();

    assert_eq!(scores.clarity(), 8.5);
    assert_eq!(scores.originality(), 7.2);
    assert_eq!(scores.team_strength(), 9.1);
    assert_eq!(scores.market_fit(), 8.8);
}

#[tokio::test]
async fn openrouter_sends_pitch_as_user_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({
            "messages": [{"role": "system"}, {"role": "user", "content": PITCH}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(GOOD)))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::with_api_key(openrouter_config(&server.uri()), "k".into());
    assert!(provider.score(PITCH).await.is_ok());
}

#[tokio::test]
async fn openrouter_custom_headers_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("X-Custom", "yes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(GOOD)))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = openrouter_config(&server.uri());
    config.headers = HashMap::from([("X-Custom".into(), "yes".into())]);
    let provider = OpenRouterProvider::with_api_key(config, "k".into());
    assert!(provider.score(PITCH).await.is_ok());
}

#[tokio::test]
async fn openrouter_fenced_answer_accepted() {
    let server = MockServer::start().await;
    let fenced = format!("```json\n{GOOD}\n```");

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(&fenced)))
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::with_api_key(openrouter_config(&server.uri()), "k".into());
    assert_eq!(provider.score(PITCH).await.unwrap().market_fit(), 8.8);
}

#[tokio::test]
async fn openrouter_401_is_auth_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": {"message": "No auth"}})))
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::with_api_key(openrouter_config(&server.uri()), "bad".into());
    let err = provider.score(PITCH).await.unwrap_err();
    assert!(matches!(err, ProviderError::AuthFailed { status: 401 }));
}

#[tokio::test]
async fn openrouter_500_is_request_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::with_api_key(openrouter_config(&server.uri()), "k".into());
    match provider.score(PITCH).await.unwrap_err() {
        ProviderError::RequestFailed(msg) => assert!(msg.contains("500")),
        other => panic!("expected RequestFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn openrouter_empty_choices() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::with_api_key(openrouter_config(&server.uri()), "k".into());
    assert!(matches!(
        provider.score(PITCH).await.unwrap_err(),
        ProviderError::EmptyResponse
    ));
}

#[tokio::test]
async fn openrouter_malformed_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::with_api_key(openrouter_config(&server.uri()), "k".into());
    assert!(matches!(
        provider.score(PITCH).await.unwrap_err(),
        ProviderError::InvalidResponse(_)
    ));
}

#[tokio::test]
async fn openrouter_prose_answer_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("Great pitch! 9/10.")))
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::with_api_key(openrouter_config(&server.uri()), "k".into());
    assert!(matches!(
        provider.score(PITCH).await.unwrap_err(),
        ProviderError::Json(_)
    ));
}

#[tokio::test]
async fn openrouter_out_of_range_rejected() {
    let server = MockServer::start().await;
    let answer = r#"{"clarity": 11, "originality": 7, "team_strength": 9, "market_fit": 8}"#;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(answer)))
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::with_api_key(openrouter_config(&server.uri()), "k".into());
    assert!(matches!(
        provider.score(PITCH).await.unwrap_err(),
        ProviderError::InvalidScores(_)
    ));
}

#[tokio::test]
async fn openrouter_all_zero_rejected() {
    let server = MockServer::start().await;
    let answer = r#"{"clarity": 0, "originality": 0, "team_strength": 0, "market_fit": 0}"#;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(answer)))
        .mount(&server)
        .await;

    let provider = OpenRouterProvider::with_api_key(openrouter_config(&server.uri()), "k".into());
    assert!(matches!(
        provider.score(PITCH).await.unwrap_err(),
        ProviderError::AllZeroScores
    ));
}

#[tokio::test]
async fn openrouter_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_body(GOOD))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = openrouter_config(&server.uri());
    config.timeout_secs = Some(1);
    let provider = OpenRouterProvider::with_api_key(config, "k".into());
    assert!(matches!(
        provider.score(PITCH).await.unwrap_err(),
        ProviderError::Timeout
    ));
}

#[tokio::test]
async fn openrouter_without_key_is_not_configured() {
    let provider = OpenRouterProvider::new(openrouter_config("http://127.0.0.1:9"));
    assert!(!provider.is_configured());
    assert!(matches!(
        provider.score(PITCH).await.unwrap_err(),
        ProviderError::NotConfigured(_)
    ));
}

// ── Gemini ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn gemini_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-pro:generateContent"))
        .and(query_param("key", "AIza-mock"))
        .and(body_partial_json(json!({
            "generationConfig": {"temperature": 0.0, "topP": 1.0, "maxOutputTokens": 200}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(GOOD)))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_api_key(gemini_config(&server.uri()), "AIza-mock".into());
    let scores = provider.score(PITCH).await.unwrap();
    assert_eq!(scores.team_strength(), 9.1);
}

#[tokio::test]
async fn gemini_embeds_pitch_in_single_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(GOOD)))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_api_key(gemini_config(&server.uri()), "k".into());
    provider.score(PITCH).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains(PITCH));
    assert!(prompt.contains("team_strength"));
}

#[tokio::test]
async fn gemini_no_candidates_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"promptFeedback": {"blockReason": "SAFETY"}})),
        )
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_api_key(gemini_config(&server.uri()), "k".into());
    assert!(matches!(
        provider.score(PITCH).await.unwrap_err(),
        ProviderError::EmptyResponse
    ));
}

#[tokio::test]
async fn gemini_error_never_leaks_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_api_key(gemini_config(&server.uri()), "AIza-very-secret".into());
    let err = provider.score(PITCH).await.unwrap_err();
    assert!(!err.to_string().contains("AIza-very-secret"));
}

#[tokio::test]
async fn gemini_missing_key_rejected() {
    let server = MockServer::start().await;
    let answer = r#"{"clarity": 8, "originality": 7, "market_fit": 8}"#;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(answer)))
        .mount(&server)
        .await;

    let provider = GeminiProvider::with_api_key(gemini_config(&server.uri()), "k".into());
    assert!(matches!(
        provider.score(PITCH).await.unwrap_err(),
        ProviderError::InvalidScores(_)
    ));
}

// ── Orchestrator over HTTP ─────────────────────────────────────────────

#[tokio::test]
async fn orchestrator_falls_back_to_gemini() {
    let or_server = MockServer::start().await;
    let gm_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&or_server)
        .await;

    let fallback_answer = r#"{"clarity": 6.1, "originality": 6.2, "team_strength": 6.3, "market_fit": 6.4}"#;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(fallback_answer)))
        .expect(1)
        .mount(&gm_server)
        .await;

    let primary = Arc::new(OpenRouterProvider::with_api_key(openrouter_config(&or_server.uri()), "k".into()));
    let fallback = Arc::new(GeminiProvider::with_api_key(gemini_config(&gm_server.uri()), "k".into()));
    let orch = FallbackOrchestrator::new(primary, fallback);

    let out = orch.run(PITCH, StartMode::Primary, 1_700_000_000).await;
    assert_eq!(out.source, ScoreSource::Fallback);
    assert_eq!(out.model, "gemini-pro");
    assert_eq!(out.scores.market_fit(), 6.4);
}

#[tokio::test]
async fn orchestrator_mock_when_both_fail() {
    let or_server = MockServer::start().await;
    let gm_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&or_server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&gm_server)
        .await;

    let primary = Arc::new(OpenRouterProvider::with_api_key(openrouter_config(&or_server.uri()), "k".into()));
    let fallback = Arc::new(GeminiProvider::with_api_key(gemini_config(&gm_server.uri()), "k".into()));
    let orch = FallbackOrchestrator::new(primary, fallback);

    let first = orch.run(PITCH, StartMode::Primary, 1_700_000_000).await;
    let second = orch.run(PITCH, StartMode::Primary, 1_700_000_000 + 120).await;
    assert_eq!(first.source, ScoreSource::Mock);
    assert_eq!(first.model, "mock");
    assert_eq!(first.scores, second.scores);
}
