use crate::backend::{OllamaBackend, VisionBackend};
use crate::error::{OcrError, Result};
use crate::prompt::Prompt;
use crate::request::{self, InferenceRequest};
use crate::types::{OcrConfig, OcrOptions};
use std::path::Path;
use std::time::Instant;

/// A client bound to one inference service and one vision model.
///
/// The backend's connection is reused for every call. `VisionOcr` is
/// `Send + Sync` whenever its backend is, so it can be shared behind an
/// `Arc` and called from many tasks at once.
#[derive(Debug)]
pub struct VisionOcr<B = OllamaBackend> {
    config: OcrConfig,
    backend: B,
}

impl VisionOcr<OllamaBackend> {
    /// Connect to the Ollama daemon described by `config`.
    ///
    /// Fails fast: the daemon is contacted here, not on the first call.
    ///
    /// # Errors
    ///
    /// [`OcrError::ConnectionFailure`] if the config is invalid or the daemon
    /// cannot be reached.
    pub async fn connect(config: OcrConfig) -> Result<Self> {
        let backend = OllamaBackend::connect(&config).await?;
        Ok(Self { config, backend })
    }

    /// Connect to the default local daemon with the default model.
    pub async fn connect_default() -> Result<Self> {
        Self::connect(OcrConfig::default()).await
    }
}

impl<B: VisionBackend> VisionOcr<B> {
    /// Bind `config` to an already-established backend.
    pub fn with_backend(config: OcrConfig, backend: B) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, backend })
    }

    /// The configuration this client was bound with.
    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// The backend serving this client's calls.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Transcribe the text in an image file.
    ///
    /// Uses `prompt_override` verbatim if given, otherwise the configured
    /// default prompt. `temperature` is sent to the service exactly as given;
    /// the service owns range checks. Non-finite values cannot be encoded and
    /// are rejected.
    /// The model's text is returned exactly as generated.
    ///
    /// # Errors
    ///
    /// - [`OcrError::ImageNotFound`] if the file cannot be read (no request is sent)
    /// - [`OcrError::ConnectionFailure`] if the service is unreachable or the call times out
    /// - [`OcrError::InferenceFailure`] if the service answers with an error or no text,
    ///   or `temperature` is NaN or infinite
    pub async fn perform_vision_ocr(
        &self,
        image_path: impl AsRef<Path>,
        temperature: f64,
        prompt_override: Option<Prompt>,
    ) -> Result<String> {
        let options = OcrOptions {
            temperature: Some(temperature),
            prompt: prompt_override,
            timeout: None,
        };
        self.perform_vision_ocr_with(image_path, &options).await
    }

    /// Transcribe an image file with full per-call options.
    pub async fn perform_vision_ocr_with(
        &self,
        image_path: impl AsRef<Path>,
        options: &OcrOptions,
    ) -> Result<String> {
        let request = self.compose(image_path.as_ref(), options).await?;
        self.invoke(&request, options).await
    }

    /// Transcribe an image given as base64-encoded bytes (no file I/O).
    pub async fn perform_vision_ocr_base64(
        &self,
        image_b64: &str,
        options: &OcrOptions,
    ) -> Result<String> {
        let prompt = self.active_prompt(options);
        let request = request::build_request_base64(image_b64, prompt.resolve())?;
        self.invoke(&request, options).await
    }

    /// Build the request a call with `options` would submit, without sending it.
    pub async fn compose(
        &self,
        image_path: &Path,
        options: &OcrOptions,
    ) -> Result<InferenceRequest> {
        let prompt = self.active_prompt(options);
        request::build_request(image_path, prompt.resolve()).await
    }

    fn active_prompt<'a>(&'a self, options: &'a OcrOptions) -> &'a Prompt {
        options.prompt.as_ref().unwrap_or(&self.config.default_prompt)
    }

    async fn invoke(&self, request: &InferenceRequest, options: &OcrOptions) -> Result<String> {
        let temperature = options.temperature.unwrap_or(self.config.default_temperature);
        let deadline = options.timeout.unwrap_or(self.config.timeout);

        // JSON has no NaN or infinity; serde_json would send `null`.
        if !temperature.is_finite() {
            return Err(OcrError::InferenceFailure(format!(
                "temperature must be a finite number, got {}",
                temperature
            )));
        }

        tracing::debug!(
            model = %self.config.model,
            temperature,
            image_b64_len = request.image().len(),
            "submitting OCR request"
        );
        let started = Instant::now();

        let response = tokio::time::timeout(
            deadline,
            self.backend.chat(&self.config.model, request, temperature),
        )
        .await
        .map_err(|_| {
            OcrError::connection(
                self.backend.host(),
                format!("no response within {:?}", deadline),
            )
        })??;

        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            chars = response.text.len(),
            "OCR response received"
        );

        Ok(response.text)
    }
}
