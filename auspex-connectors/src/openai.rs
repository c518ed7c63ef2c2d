//! OpenAI Chat Completions Client
//!
//! Adapter from the completion port to the OpenAI chat completions API.
//! The request is kept deterministic (temperature 0, bounded output) per the
//! gateway's instruction; response content is returned as opaque text.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use auspex_domain::Secret;
use auspex_exec::{ClassifyError, CompletionPort, CompletionRequest};

// =============================================================================
// Constants
// =============================================================================

/// OpenAI API base URL
const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Request timeout in seconds (classification calls are long-latency)
const REQUEST_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// OpenAI Client
// =============================================================================

/// Chat completions client.
pub struct OpenAiClient {
    /// HTTP client
    client: Client,
    /// API key
    api_key: Secret,
    /// Model name (e.g. "gpt-4o-mini")
    model: String,
    /// API base URL (overridable for compatible endpoints)
    base_url: String,
}

impl OpenAiClient {
    /// Create a client for a model.
    pub fn new(api_key: Secret, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.into(),
            base_url: OPENAI_API_URL.to_string(),
        }
    }

    /// Point the client at an OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the chat completions request body.
    fn build_body(&self, request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt },
            ],
            "max_tokens": request.max_tokens,
        });

        if request.deterministic {
            body["temperature"] = json!(0.0);
        }

        body
    }

    /// Pull the first choice's message content out of a response.
    fn extract_content(value: &Value) -> Result<String, ClassifyError> {
        value["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                ClassifyError::MalformedResponse(format!(
                    "Response missing choices[0].message.content: {}",
                    value
                ))
            })
    }
}

#[async_trait]
impl CompletionPort for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ClassifyError> {
        let body = self.build_body(&request);
        let url = format!("{}/chat/completions", self.base_url);

        let response = timeout(
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
            self.client
                .post(&url)
                .bearer_auth(self.api_key.expose())
                .json(&body)
                .send(),
        )
        .await
        .map_err(|_| ClassifyError::Transport("Request timed out".to_string()))?
        .map_err(|e| ClassifyError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ClassifyError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(parse_service_error(status.as_u16(), &text));
        }

        let value: Value = serde_json::from_str(&text)
            .map_err(|e| ClassifyError::MalformedResponse(e.to_string()))?;
        let content = Self::extract_content(&value)?;
        debug!(model = %self.model, content = %content, "Completion returned");
        Ok(content)
    }
}

/// Parse an API error body into a service error.
fn parse_service_error(status: u16, body: &str) -> ClassifyError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string());

    ClassifyError::Service { status, message }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenAiClient {
        OpenAiClient::new(Secret::new("sk-test"), "gpt-4o-mini")
    }

    fn request(deterministic: bool) -> CompletionRequest {
        CompletionRequest {
            system: "You are an assistant.".to_string(),
            prompt: "classify this".to_string(),
            deterministic,
            max_tokens: 1,
        }
    }

    #[test]
    fn test_build_body_deterministic() {
        let body = client().build_body(&request(true));

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["max_tokens"], 1);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "classify this");
    }

    #[test]
    fn test_build_body_sampling_leaves_temperature_unset() {
        let body = client().build_body(&request(false));

        assert!(body.get("temperature").is_none());
    }

    #[test]
    fn test_extract_content() {
        let value = json!({
            "choices": [ { "message": { "role": "assistant", "content": "positive" } } ]
        });

        assert_eq!(OpenAiClient::extract_content(&value).unwrap(), "positive");
    }

    #[test]
    fn test_extract_content_missing_is_malformed() {
        let err = OpenAiClient::extract_content(&json!({ "choices": [] })).unwrap_err();

        assert!(matches!(err, ClassifyError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_service_error_reads_api_message() {
        let err = parse_service_error(
            429,
            r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#,
        );

        assert!(matches!(
            err,
            ClassifyError::Service { status: 429, ref message } if message == "Rate limit reached"
        ));
    }

    #[test]
    fn test_parse_service_error_falls_back_to_body() {
        let err = parse_service_error(502, "bad gateway");

        assert!(matches!(
            err,
            ClassifyError::Service { status: 502, ref message } if message == "bad gateway"
        ));
    }
}
