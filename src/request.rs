use crate::error::{OcrError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single user turn: instruction text plus one base64 image.
///
/// Serializes to an Ollama chat message. Built fresh per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub role: String,
    pub content: String,
    pub images: Vec<String>,
}

impl InferenceRequest {
    /// The instruction text carried by this turn.
    pub fn instruction(&self) -> &str {
        &self.content
    }

    /// The base64 image payload.
    pub fn image(&self) -> &str {
        self.images.first().map(String::as_str).unwrap_or_default()
    }
}

/// Read an image file and build the request for it.
///
/// The file is sent as-is: no format check, no resizing. The read goes
/// through `tokio::fs`, so it never blocks the runtime.
///
/// # Errors
///
/// - [`OcrError::ImageNotFound`] if the file is missing or unreadable
/// - [`OcrError::InferenceFailure`] if `instruction` is empty
pub async fn build_request(image_path: &Path, instruction: &str) -> Result<InferenceRequest> {
    check_instruction(instruction)?;
    let image_b64 = encode_image(image_path).await?;
    Ok(user_turn(instruction, image_b64))
}

/// Build a request from an already-encoded image (no file I/O).
pub fn build_request_base64(image_b64: &str, instruction: &str) -> Result<InferenceRequest> {
    check_instruction(instruction)?;
    if image_b64.is_empty() {
        return Err(OcrError::ImageNotFound {
            path: "<base64>".to_string(),
            reason: "image payload is empty".to_string(),
        });
    }
    Ok(user_turn(instruction, image_b64.to_string()))
}

/// Read a file and encode its raw bytes as standard base64.
pub async fn encode_image(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| OcrError::image_not_found(path, e))?;
    Ok(base64::engine::general_purpose::STANDARD.encode(&bytes))
}

fn check_instruction(instruction: &str) -> Result<()> {
    if instruction.is_empty() {
        return Err(OcrError::InferenceFailure(
            "instruction text is empty".to_string(),
        ));
    }
    Ok(())
}

fn user_turn(instruction: &str, image_b64: String) -> InferenceRequest {
    InferenceRequest {
        role: "user".to_string(),
        content: instruction.to_string(),
        images: vec![image_b64],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn fixture(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[tokio::test]
    async fn encodes_raw_bytes() {
        let file = fixture(b"\x89PNG\r\n");
        assert_eq!(encode_image(file.path()).await.unwrap(), "iVBORw0K");
    }

    #[tokio::test]
    async fn builds_single_user_turn() {
        let file = fixture(b"hello");
        let req = build_request(file.path(), "Read it.").await.unwrap();
        assert_eq!(req.role, "user");
        assert_eq!(req.instruction(), "Read it.");
        assert_eq!(req.images, vec!["aGVsbG8=".to_string()]);
        assert_eq!(req.image(), "aGVsbG8=");
    }

    #[tokio::test]
    async fn composition_is_repeatable() {
        let file = fixture(b"same bytes");
        let a = build_request(file.path(), "Read it.").await.unwrap();
        let b = build_request(file.path(), "Read it.").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn missing_file_is_image_not_found() {
        let err = build_request(Path::new("missing.png"), "Read it.").await.unwrap_err();
        assert!(err.is_image_not_found());
        assert!(err.to_string().contains("missing.png"));
    }

    #[tokio::test]
    async fn directory_is_image_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_request(dir.path(), "Read it.").await.unwrap_err();
        assert!(err.is_image_not_found());
    }

    #[tokio::test]
    async fn empty_instruction_rejected_before_read() {
        let err = build_request(Path::new("missing.png"), "").await.unwrap_err();
        assert!(err.is_inference_failure());
    }

    #[test]
    fn base64_request() {
        let req = build_request_base64("aGVsbG8=", "Read it.").unwrap();
        assert_eq!(req.image(), "aGVsbG8=");
        assert!(build_request_base64("", "Read it.")
            .unwrap_err()
            .is_image_not_found());
    }

    #[test]
    fn serializes_as_chat_message() {
        let req = build_request_base64("aGVsbG8=", "Read it.").unwrap();
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({
                "role": "user",
                "content": "Read it.",
                "images": ["aGVsbG8="],
            })
        );
    }
}
