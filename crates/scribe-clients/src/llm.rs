//! Model-server adapter: completion and chat endpoints.
//!
//! Two endpoint styles are supported. [`ModelClient::chat`] tries the
//! chat-style endpoint first and falls back to the completion-style endpoint
//! only when the chat call returns a non-success status; a successful
//! response whose body cannot be parsed is a hard failure with no fallback.
//! Callers never see which endpoint produced the text.

use std::time::Duration;

use scribe_core::errors::{FetchError, FetchOutcome};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::fields::require_str;

/// Model-server adapter configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Server base URL.
    pub url: String,
    /// Model ID sent with every request.
    pub model: String,
    /// Completion token cap.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Request timeout.
    pub timeout: Duration,
}

/// Model-server client.
pub struct ModelClient {
    config: ModelConfig,
    client: reqwest::Client,
}

impl ModelClient {
    /// Create a new client.
    #[must_use]
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Completion-style call: the prompt goes out as-is, the reply is the
    /// continuation text.
    #[instrument(skip_all, fields(model = %self.config.model))]
    pub async fn complete(&self, prompt: &str) -> FetchOutcome<String> {
        let body = json!({
            "model": self.config.model,
            "prompt": prompt,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "stream": false,
        });

        let response = self
            .request(&self.endpoint("v1/completions"), &body)
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(FetchError::status(
                status.as_u16(),
                format!("Model request failed: {status}\n{error_body}"),
            ));
        }

        let value: Value = Self::read_json(response).await?;
        parse_completion(&value)
    }

    /// Chat-style call with the one-shot completion fallback.
    ///
    /// A non-success status from the chat endpoint triggers one fallback
    /// attempt against the completion endpoint with the same message as
    /// prompt. A connection-level failure propagates directly, and a
    /// successful-but-unparsable chat body fails hard — neither falls back.
    #[instrument(skip_all, fields(model = %self.config.model))]
    pub async fn chat(&self, message: &str) -> FetchOutcome<String> {
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "stream": false,
            "messages": [{ "role": "user", "content": message }],
        });

        let response = self
            .request(&self.endpoint("v1/chat/completions"), &body)
            .await?;

        if !response.status().is_success() {
            warn!(
                status = response.status().as_u16(),
                "chat endpoint failed, falling back to completions"
            );
            return self.complete(message).await;
        }

        let value: Value = Self::read_json(response).await?;
        parse_chat(&value)
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!("{}/{suffix}", self.config.url.trim_end_matches('/'))
    }

    async fn request(&self, url: &str, body: &Value) -> FetchOutcome<reqwest::Response> {
        debug!(url, "sending model request");
        self.client
            .post(url)
            .timeout(self.config.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| FetchError::transport(format!("Model request failed: {e}")))
    }

    async fn read_json(response: reqwest::Response) -> FetchOutcome<Value> {
        let text = response
            .text()
            .await
            .map_err(|e| FetchError::transport(format!("Model request failed: {e}")))?;
        serde_json::from_str(&text)
            .map_err(|e| FetchError::malformed(format!("invalid JSON: {e}")))
    }
}

/// Extract the reply text from a completion-style response body.
pub fn parse_completion(value: &Value) -> FetchOutcome<String> {
    Ok(require_str(value, "choices.0.text")?.trim().to_owned())
}

/// Extract the reply text from a chat-style response body.
pub fn parse_chat(value: &Value) -> FetchOutcome<String> {
    Ok(require_str(value, "choices.0.message.content")?
        .trim()
        .to_owned())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn test_client(base: &str) -> ModelClient {
        ModelClient::new(ModelConfig {
            url: base.to_string(),
            model: "test-model".into(),
            max_tokens: 256,
            temperature: 0.7,
            timeout: Duration::from_secs(5),
        })
    }

    fn chat_body(content: &str) -> Value {
        json!({ "choices": [{ "message": { "content": content } }] })
    }

    fn completion_body(text: &str) -> Value {
        json!({ "choices": [{ "text": text }] })
    }

    // ── parsing ──────────────────────────────────────────────────────────

    #[test]
    fn parse_completion_trims() {
        let text = parse_completion(&completion_body("  an answer \n")).unwrap();
        assert_eq!(text, "an answer");
    }

    #[test]
    fn parse_chat_trims() {
        let text = parse_chat(&chat_body("\nhello there ")).unwrap();
        assert_eq!(text, "hello there");
    }

    #[test]
    fn parse_completion_missing_choices_is_malformed() {
        assert_matches!(
            parse_completion(&json!({ "object": "error" })),
            Err(FetchError::Malformed { .. })
        );
    }

    #[test]
    fn parse_chat_rejects_completion_shape() {
        assert_matches!(
            parse_chat(&completion_body("text")),
            Err(FetchError::Malformed { .. })
        );
    }

    // ── chat fallback policy ─────────────────────────────────────────────

    #[tokio::test]
    async fn chat_success_never_touches_completions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({ "model": "test-model" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("hi!")))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("unused")))
            .expect(0)
            .mount(&server)
            .await;

        let reply = test_client(&server.uri()).chat("hi").await.unwrap();
        assert_eq!(reply, "hi!");
    }

    #[tokio::test]
    async fn chat_non_success_falls_back_to_completions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .and(body_partial_json(json!({ "prompt": "hi" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("fallback answer")))
            .expect(1)
            .mount(&server)
            .await;

        let reply = test_client(&server.uri()).chat("hi").await.unwrap();
        assert_eq!(reply, "fallback answer");
    }

    #[tokio::test]
    async fn chat_parse_failure_does_not_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("unused")))
            .expect(0)
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).chat("hi").await.unwrap_err();
        assert_matches!(err, FetchError::Malformed { .. });
    }

    #[tokio::test]
    async fn failed_fallback_surfaces_completion_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model overloaded"))
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).chat("hi").await.unwrap_err();
        assert_matches!(err, FetchError::Transport { status: Some(500), message } => {
            assert!(message.contains("model overloaded"));
        });
    }

    // ── complete ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn complete_sends_prompt_and_parses_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .and(body_partial_json(json!({
                "prompt": "explain this",
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("it loops")))
            .mount(&server)
            .await;

        let text = test_client(&server.uri()).complete("explain this").await.unwrap();
        assert_eq!(text, "it loops");
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_handled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
            .mount(&server)
            .await;

        let client = test_client(&format!("{}/", server.uri()));
        assert_eq!(client.complete("x").await.unwrap(), "ok");
    }
}
