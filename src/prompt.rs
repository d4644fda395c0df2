//! Instruction texts that steer the transcription format.

use std::fmt;

/// Plain transcription, keeping the original layout as far as possible.
pub const PLAIN_TEXT_PROMPT: &str = r#"Act as an OCR assistant. Analyze the provided image and:
1. Recognize all visible text in the image as accurately as possible.
2. Maintain the original structure and formatting of the text as best as possible.
3. If any words or phrases are unclear, indicate this with [unclear] in your transcription.
Provide only the transcription without any additional comments."#;

/// Transcription rendered as Markdown that mirrors the visual hierarchy.
pub const MARKDOWN_PROMPT: &str = r#"Act as an expert OCR assistant specializing in document structure. Analyze the provided image and:
1. Recognize all visible text in the image as accurately as possible.
2. Structure the recognized text using appropriate Markdown formatting (e.g., headings (#, ##), lists (*, -), bold (**text**), italics (*text*), code blocks (```), etc.) to reflect the visual layout and hierarchy of the original image.
3. If any words or phrases are unclear, indicate this with `[unclear]` (using backticks for code style) in your transcription.
4. Ensure the output is valid Markdown.
Provide *only* the Markdown transcription without any introductory sentences, explanations, or closing remarks."#;

/// The instruction sent alongside the image.
///
/// Exactly one is active per call. Presets resolve to [`PLAIN_TEXT_PROMPT`]
/// and [`MARKDOWN_PROMPT`]; `Custom` is sent verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Prompt {
    #[default]
    Plain,
    Markdown,
    Custom(String),
}

impl Prompt {
    /// A free-form instruction, sent verbatim.
    pub fn custom(text: impl Into<String>) -> Self {
        Prompt::Custom(text.into())
    }

    /// The concrete instruction text.
    pub fn resolve(&self) -> &str {
        match self {
            Prompt::Plain => PLAIN_TEXT_PROMPT,
            Prompt::Markdown => MARKDOWN_PROMPT,
            Prompt::Custom(text) => text,
        }
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Prompt::Custom(text.to_string())
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Prompt::Custom(text)
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resolve())
    }
}
