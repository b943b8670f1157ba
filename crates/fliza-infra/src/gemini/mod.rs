//! Gemini `generateContent` clients for vision analysis and design-image
//! generation.
//!
//! Shared wire types and base64 payload handling live here; the two
//! clients implement the `VisionAnalyzer` / `DesignGenerator` traits from
//! fliza-core. The API key is wrapped in [`secrecy::SecretString`] and is
//! never logged or included in `Debug` output.

pub mod design;
pub mod vision;

pub use design::GeminiDesignGenerator;
pub use vision::GeminiVisionAnalyzer;

use serde::{Deserialize, Serialize};

/// Inline media payload within a `generateContent` part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct InlineData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub data: String,
}

/// One part of a `generateContent` request or response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Parts of the first candidate, or empty.
    pub fn first_candidate_parts(self) -> Vec<Part> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .unwrap_or_default()
    }
}

/// Strip a `data:image/...;base64,` prefix if present, returning the raw
/// base64 payload.
pub(crate) fn strip_data_url_prefix(image: &str) -> &str {
    match image.split_once("base64,") {
        Some((_, payload)) => payload,
        None => image,
    }
}

/// Guess the payload MIME type from a (possibly prefixed) image string.
pub(crate) fn detect_mime_type(image: &str) -> &'static str {
    if image.contains("image/png") {
        "image/png"
    } else {
        "image/jpeg"
    }
}
