use crate::error::{OcrError, Result};
use crate::prompt::Prompt;
use std::time::Duration;

/// Local Ollama daemon address.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:11434";
/// Vision model used when none is given.
pub const DEFAULT_MODEL: &str = "llama3.2-vision:11b";
/// Sampling temperature used when a call does not choose one.
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
/// Deadline for a single inference round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Endpoint configuration for an OCR client. Fixed once the client is built.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Ollama API endpoint (e.g., "http://localhost:11434")
    pub endpoint: String,
    /// Vision model name (e.g., "llama3.2-vision:11b", "llava", "minicpm-v")
    pub model: String,
    /// Per-call deadline (default: 120s)
    pub timeout: Duration,
    /// Instruction used when a call has no override (default: plain text)
    pub default_prompt: Prompt,
    /// Temperature used by [`OcrOptions::default`] (default: 0.3)
    pub default_temperature: f64,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            default_prompt: Prompt::Plain,
            default_temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl OcrConfig {
    /// Create a new config with the given model name.
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Set the Ollama endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the per-call deadline.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the instruction used when a call has no override.
    pub fn default_prompt(mut self, prompt: impl Into<Prompt>) -> Self {
        self.default_prompt = prompt.into();
        self
    }

    /// Set the temperature used when a call does not choose one.
    pub fn default_temperature(mut self, temperature: f64) -> Self {
        self.default_temperature = temperature;
        self
    }

    /// Endpoint with any trailing slash removed, ready for path joins.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    /// Check the endpoint is an absolute http(s) URL and the model is named.
    ///
    /// Failures are reported as [`OcrError::ConnectionFailure`], since a
    /// client cannot be bound to them.
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| OcrError::connection(&self.endpoint, format!("invalid endpoint URL: {}", e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(OcrError::connection(
                &self.endpoint,
                format!("unsupported URL scheme '{}'", url.scheme()),
            ));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(OcrError::connection(&self.endpoint, "endpoint URL has no host"));
        }
        if self.model.trim().is_empty() {
            return Err(OcrError::connection(&self.endpoint, "model name is empty"));
        }
        Ok(())
    }
}

/// Per-call settings for an OCR request.
#[derive(Debug, Clone, Default)]
pub struct OcrOptions {
    /// Sampling temperature, passed through to the service as-is
    /// (default: the config's `default_temperature`)
    pub temperature: Option<f64>,
    /// Instruction override (default: the config's `default_prompt`)
    pub prompt: Option<Prompt>,
    /// Deadline override (default: the config's `timeout`)
    pub timeout: Option<Duration>,
}

impl OcrOptions {
    /// Set the sampling temperature for this call.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Override the instruction for this call.
    pub fn prompt(mut self, prompt: impl Into<Prompt>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Override the deadline for this call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = OcrConfig::default();
        assert_eq!(config.endpoint, "http://127.0.0.1:11434");
        assert_eq!(config.model, "llama3.2-vision:11b");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.default_prompt, Prompt::Plain);
        assert_eq!(config.default_temperature, 0.3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builder() {
        let config = OcrConfig::with_model("llava")
            .endpoint("http://gpu-box:11434/")
            .timeout(Duration::from_secs(5))
            .default_prompt(Prompt::Markdown)
            .default_temperature(0.0);
        assert_eq!(config.model, "llava");
        assert_eq!(config.base_url(), "http://gpu-box:11434");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.default_prompt, Prompt::Markdown);
        assert_eq!(config.default_temperature, 0.0);
    }

    #[test]
    fn rejects_malformed_endpoint() {
        let err = OcrConfig::default().endpoint("not a url").validate().unwrap_err();
        assert!(err.is_connection_failure());
        assert!(err.to_string().contains("not a url"));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = OcrConfig::default()
            .endpoint("ftp://127.0.0.1:11434")
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("unsupported URL scheme"));
    }

    #[test]
    fn rejects_blank_model() {
        let err = OcrConfig::with_model("  ").validate().unwrap_err();
        assert!(err.is_connection_failure());
        assert!(err.to_string().contains("model name is empty"));
    }

    #[test]
    fn options_builder() {
        let opts = OcrOptions::default()
            .temperature(1.5)
            .prompt("Only the digits.")
            .timeout(Duration::from_millis(250));
        assert_eq!(opts.temperature, Some(1.5));
        assert_eq!(opts.prompt, Some(Prompt::custom("Only the digits.")));
        assert_eq!(opts.timeout, Some(Duration::from_millis(250)));
    }
}
