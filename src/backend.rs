//! The inference service boundary.
//!
//! [`VisionBackend`] is the one capability the OCR client needs: submit a
//! composed turn to a model and get text back. [`OllamaBackend`] implements
//! it over the Ollama HTTP API.

use crate::error::{OcrError, Result};
use crate::request::InferenceRequest;
use crate::types::OcrConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Generated text plus whatever else the service reported.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceResponse {
    pub text: String,
    /// Remaining response fields (timings, token counts, ...). Not interpreted.
    pub metadata: Value,
}

/// A service able to run a vision model on one composed request.
///
/// Implementations must be safe to call concurrently from several tasks.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Submit `request` to `model` at `temperature` and wait for the full answer.
    async fn chat(
        &self,
        model: &str,
        request: &InferenceRequest,
        temperature: f64,
    ) -> Result<InferenceResponse>;

    /// Where the service lives, for error messages.
    fn host(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
}

/// Ollama daemon client.
///
/// Holds one pooled `reqwest::Client` for its whole lifetime. The pool is
/// internally synchronized, so a single backend serves concurrent calls
/// without extra locking.
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl OllamaBackend {
    /// Build the HTTP client and verify the daemon answers `GET /api/tags`.
    ///
    /// # Errors
    ///
    /// [`OcrError::ConnectionFailure`] if the config is invalid, the daemon is
    /// unreachable, or the handshake returns a non-success status.
    pub async fn connect(config: &OcrConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(|e| OcrError::connection(&config.endpoint, e))?;
        Self::connect_with_client(client, config).await
    }

    /// Like [`connect`](Self::connect) but with a caller-built HTTP client.
    pub async fn connect_with_client(client: Client, config: &OcrConfig) -> Result<Self> {
        config.validate()?;
        let backend = Self {
            client,
            endpoint: config.base_url().to_string(),
            timeout: config.timeout,
        };

        tracing::info!(endpoint = %backend.endpoint, "connecting to Ollama");
        let models = backend.list_models().await?;

        if models.iter().any(|m| model_matches(m, &config.model)) {
            tracing::info!(model = %config.model, "connected to Ollama");
        } else {
            tracing::warn!(
                model = %config.model,
                available = models.len(),
                "model not listed by Ollama; it must be pulled before use"
            );
        }

        Ok(backend)
    }

    /// The deadline applied to model listing.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Names of the models the daemon has locally.
    ///
    /// Bounded by the timeout of the config the backend was connected with.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.endpoint);
        let resp = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| OcrError::connection(&self.endpoint, e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(OcrError::connection(
                &self.endpoint,
                format!("handshake rejected with HTTP {}: {}", status, service_reason(&text)),
            ));
        }

        let tags: TagsResponse = resp.json().await.map_err(|e| {
            OcrError::connection(&self.endpoint, format!("unexpected handshake response: {}", e))
        })?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[async_trait]
impl VisionBackend for OllamaBackend {
    async fn chat(
        &self,
        model: &str,
        request: &InferenceRequest,
        temperature: f64,
    ) -> Result<InferenceResponse> {
        let body = json!({
            "model": model,
            "messages": [request],
            "stream": false,
            "options": { "temperature": temperature },
        });

        let url = format!("{}/api/chat", self.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| OcrError::from_transport(&self.endpoint, e))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| OcrError::from_transport(&self.endpoint, e))?;

        if !status.is_success() {
            return Err(OcrError::InferenceFailure(format!(
                "Ollama returned HTTP {}: {}",
                status.as_u16(),
                service_reason(&text)
            )));
        }

        parse_chat_response(&text)
    }

    fn host(&self) -> &str {
        &self.endpoint
    }
}

/// Pull `message.content` out of a non-streaming `/api/chat` body.
fn parse_chat_response(body: &str) -> Result<InferenceResponse> {
    let mut json: Value = serde_json::from_str(body)?;

    if let Some(reason) = json.get("error").and_then(|v| v.as_str()) {
        return Err(OcrError::InferenceFailure(reason.to_string()));
    }

    let text = json
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|v| v.as_str())
        .map(str::to_string);

    match text {
        Some(text) if !text.is_empty() => {
            if let Some(obj) = json.as_object_mut() {
                obj.remove("message");
            }
            Ok(InferenceResponse { text, metadata: json })
        }
        Some(_) => Err(OcrError::InferenceFailure(
            "Ollama returned empty content".to_string(),
        )),
        None => Err(OcrError::InferenceFailure(format!(
            "response has no message content: {}",
            truncate(body, 200)
        ))),
    }
}

/// Ollama reports failures as `{"error": "..."}`; fall back to the raw body.
fn service_reason(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Ollama lists `llava` as `llava:latest`.
fn model_matches(listed: &str, wanted: &str) -> bool {
    listed == wanted || (!wanted.contains(':') && listed == format!("{}:latest", wanted))
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_content_and_keeps_metadata() {
        let body = r#"{"model":"llava","message":{"role":"assistant","content":"  TOTAL: $12.34\n"},"done":true,"eval_count":12}"#;
        let resp = parse_chat_response(body).unwrap();
        assert_eq!(resp.text, "  TOTAL: $12.34\n");
        assert_eq!(resp.metadata["done"], json!(true));
        assert_eq!(resp.metadata["eval_count"], json!(12));
        assert!(resp.metadata.get("message").is_none());
    }

    #[test]
    fn missing_content_is_inference_failure() {
        let err = parse_chat_response(r#"{"done":true}"#).unwrap_err();
        assert!(err.is_inference_failure());
        assert!(err.to_string().contains("no message content"));
    }

    #[test]
    fn empty_content_is_inference_failure() {
        let err = parse_chat_response(r#"{"message":{"content":""}}"#).unwrap_err();
        assert!(err.to_string().contains("empty content"));
    }

    #[test]
    fn non_string_content_is_inference_failure() {
        let err = parse_chat_response(r#"{"message":{"content":42}}"#).unwrap_err();
        assert!(err.is_inference_failure());
    }

    #[test]
    fn error_field_is_reported() {
        let err = parse_chat_response(r#"{"error":"model 'x' not found"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Inference failed: model 'x' not found");
    }

    #[test]
    fn malformed_body_is_inference_failure() {
        let err = parse_chat_response("<html>bad gateway</html>").unwrap_err();
        assert!(err.is_inference_failure());
    }

    #[test]
    fn service_reason_prefers_error_field() {
        assert_eq!(service_reason(r#"{"error":"out of memory"}"#), "out of memory");
        assert_eq!(service_reason("plain text\n"), "plain text");
    }

    #[test]
    fn model_name_matching() {
        assert!(model_matches("llava:latest", "llava"));
        assert!(model_matches("llama3.2-vision:11b", "llama3.2-vision:11b"));
        assert!(!model_matches("llama3.2-vision:90b", "llama3.2-vision:11b"));
        assert!(!model_matches("llava:7b", "llava"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
