use std::path::Path;
use thiserror::Error;

/// Errors surfaced by an OCR call.
///
/// Every failure maps to one of three kinds so callers can react to each
/// distinctly: fix the input, abort on a dead service, or inspect the
/// service's reason.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The image could not be read. Never reaches the service.
    #[error("Image not found: '{path}': {reason}")]
    ImageNotFound { path: String, reason: String },

    /// The service is unreachable, rejected the handshake, timed out, or
    /// dropped the connection mid-call.
    #[error("Could not connect to Ollama at {host}: {reason}")]
    ConnectionFailure { host: String, reason: String },

    /// The service answered but with an error status, a malformed body, or
    /// no generated text.
    #[error("Inference failed: {0}")]
    InferenceFailure(String),
}

impl OcrError {
    pub(crate) fn image_not_found(path: &Path, reason: impl ToString) -> Self {
        OcrError::ImageNotFound {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn connection(host: impl Into<String>, reason: impl ToString) -> Self {
        OcrError::ConnectionFailure {
            host: host.into(),
            reason: reason.to_string(),
        }
    }

    /// Classify a transport error from the HTTP client.
    ///
    /// Connect, timeout and request-level failures mean the service was never
    /// (or no longer) reachable; anything else happened after the service
    /// answered.
    pub(crate) fn from_transport(host: &str, err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
            OcrError::connection(host, err)
        } else {
            OcrError::InferenceFailure(err.to_string())
        }
    }

    pub fn is_image_not_found(&self) -> bool {
        matches!(self, OcrError::ImageNotFound { .. })
    }

    pub fn is_connection_failure(&self) -> bool {
        matches!(self, OcrError::ConnectionFailure { .. })
    }

    pub fn is_inference_failure(&self) -> bool {
        matches!(self, OcrError::InferenceFailure(_))
    }
}

impl From<serde_json::Error> for OcrError {
    fn from(err: serde_json::Error) -> Self {
        OcrError::InferenceFailure(format!("malformed response: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, OcrError>;
