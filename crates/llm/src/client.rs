//! REST client for the `/chat/completions` and `/embeddings` endpoints.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::LlmConfig;

/// Errors from the language-model API layer.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// No API key configured.
    #[error("Language model is not configured")]
    NotConfigured,

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered 429.
    #[error("Language model rate limit reached")]
    RateLimited,

    /// Any other non-2xx status.
    #[error("Language model API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// A 2xx response whose body is not what the endpoint promises.
    #[error("Invalid language model response: {0}")]
    InvalidResponse(String),
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for one OpenAI-compatible provider.
pub struct LlmClient {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Run a chat completion in JSON mode and parse the reply as JSON.
    pub async fn chat_json(&self, system: &str, user: &str) -> Result<Value, LlmError> {
        let key = self.api_key()?;
        let body = json!({
            "model": self.config.chat_model,
            "response_format": {"type": "json_object"},
            "temperature": 0.4,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_url))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;

        let parsed: ChatResponse = Self::parse_response(response).await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("no completion choice".into()))?;

        tracing::debug!(model = %self.config.chat_model, bytes = content.len(), "Chat completion received");
        parse_json_content(&content)
    }

    /// Embed one text.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let key = self.api_key()?;
        let body = json!({
            "model": self.config.embedding_model,
            "input": text,
        });

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.api_url))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;

        let parsed: EmbeddingResponse = Self::parse_response(response).await?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| LlmError::InvalidResponse("empty embedding".into()))
    }

    // ---- private helpers ----

    fn api_key(&self) -> Result<&str, LlmError> {
        self.config.api_key.as_deref().ok_or(LlmError::NotConfigured)
    }

    /// Return the response unchanged on 2xx; map 429 to
    /// [`LlmError::RateLimited`] and anything else to [`LlmError::ApiError`].
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, LlmError> {
        let response = Self::ensure_success(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }
}

/// Parse model output as JSON, tolerating a surrounding Markdown code fence.
pub fn parse_json_content(content: &str) -> Result<Value, LlmError> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();
    serde_json::from_str(unfenced).map_err(|e| LlmError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_json_content() {
        let value = parse_json_content(r#" {"items": []} "#).unwrap();
        assert!(value["items"].is_array());
    }

    #[test]
    fn fenced_json_content() {
        let value = parse_json_content("```json\n{\"answer\": \"42\"}\n```").unwrap();
        assert_eq!(value["answer"], "42");
        let value = parse_json_content("```\n[1, 2]\n```").unwrap();
        assert_eq!(value, json!([1, 2]));
    }

    #[test]
    fn prose_is_rejected() {
        assert!(matches!(
            parse_json_content("Voici les questions :"),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn chat_response_shape() {
        let raw = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"{}"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("{}"));
    }

    #[test]
    fn embedding_response_shape() {
        let raw = r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.25,-0.5]}]}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.data[0].embedding, vec![0.25, -0.5]);
    }

    #[tokio::test]
    async fn unconfigured_client_fails_fast() {
        let client = LlmClient::new(LlmConfig::default()).unwrap();
        assert!(!client.is_configured());
        assert!(matches!(
            client.embed("bonjour").await,
            Err(LlmError::NotConfigured)
        ));
        assert!(matches!(
            client.chat_json("s", "u").await,
            Err(LlmError::NotConfigured)
        ));
    }
}
