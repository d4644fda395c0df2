//! # ollama-ocr
//!
//! Text transcription from images through a vision model served by Ollama.
//!
//! Recognition is done entirely by the model. This crate reads and encodes
//! the image, pairs it with an instruction that steers the output format,
//! submits one chat request, and returns the generated text untouched.
//!
//! ## Features
//!
//! - **Fail-fast connection**: the daemon is contacted when the client is built
//! - **Two instruction presets** ([`Prompt::Plain`], [`Prompt::Markdown`]) plus
//!   free-form [`Prompt::Custom`] overrides
//! - **Three error kinds** ([`OcrError`]): image not found, connection failure,
//!   inference failure
//! - **Per-call deadlines** mapped to connection failures
//! - **Pluggable backend** via [`VisionBackend`] for tests or other services
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ollama_ocr::{OcrConfig, Prompt, VisionOcr};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ocr = VisionOcr::connect(OcrConfig::default()).await?;
//!
//!     // Plain transcription
//!     let text = ocr.perform_vision_ocr("receipt.jpg", 0.3, None).await?;
//!     println!("{}", text);
//!
//!     // Markdown transcription
//!     let md = ocr
//!         .perform_vision_ocr("receipt.jpg", 0.3, Some(Prompt::Markdown))
//!         .await?;
//!     println!("{}", md);
//!
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
pub mod ocr;
pub mod prompt;
pub mod request;
pub mod types;

// Re-export main types at crate root
pub use backend::{InferenceResponse, OllamaBackend, VisionBackend};
pub use error::{OcrError, Result};
pub use ocr::VisionOcr;
pub use prompt::{Prompt, MARKDOWN_PROMPT, PLAIN_TEXT_PROMPT};
pub use request::{build_request, build_request_base64, encode_image, InferenceRequest};
pub use types::{
    OcrConfig, OcrOptions, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT,
};
