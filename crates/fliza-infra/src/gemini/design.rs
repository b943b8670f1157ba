//! GeminiDesignGenerator -- concrete [`DesignGenerator`] over the Gemini
//! image model.
//!
//! Sends a text prompt plus an inline source frame and walks the response
//! parts for the generated image (rebuilt as a `data:` URL) and optional
//! accompanying text.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use fliza_core::media::DesignGenerator;
use fliza_types::agent::DesignArtifact;
use fliza_types::config::GeminiConfig;
use fliza_types::error::DesignError;

use super::{
    detect_mime_type, strip_data_url_prefix, Content, GenerateContentRequest,
    GenerateContentResponse, InlineData, Part,
};

/// Prompt used when the caller does not supply one.
const DEFAULT_DESIGN_PROMPT: &str =
    "Create a stylized design based on this image. Make it visually appealing and creative.";

/// Gemini-backed design-image generator.
pub struct GeminiDesignGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

impl GeminiDesignGenerator {
    pub fn new(config: &GeminiConfig, api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            // Image generation is slow; allow well beyond the chat timeout.
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: config.base_url.clone(),
            model: config.design_model.clone(),
            api_key,
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

/// Walk response parts for the generated image and accompanying text.
fn artifact_from_parts(parts: Vec<Part>) -> Result<DesignArtifact, DesignError> {
    let mut image = None;
    let mut text = None;

    for part in parts {
        if let Some(inline) = part.inline_data {
            image = Some(format!(
                "data:{};base64,{}",
                inline.mime_type, inline.data
            ));
        }
        if let Some(t) = part.text {
            text = Some(t);
        }
    }

    match image {
        Some(image) => Ok(DesignArtifact { image, text }),
        None => Err(DesignError::NoImageGenerated),
    }
}

impl DesignGenerator for GeminiDesignGenerator {
    async fn generate(&self, prompt: &str, image: &str) -> Result<DesignArtifact, DesignError> {
        if image.is_empty() {
            return Err(DesignError::NoImage);
        }

        let prompt = if prompt.is_empty() {
            DEFAULT_DESIGN_PROMPT
        } else {
            prompt
        };

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(prompt.to_string()),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: detect_mime_type(image).to_string(),
                            data: strip_data_url_prefix(image).to_string(),
                        }),
                    },
                ],
            }],
        };

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| DesignError::GenerationFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(DesignError::GenerationFailed(format!(
                "HTTP {status}: {error_body}"
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| DesignError::GenerationFailed(format!("invalid response: {e}")))?;

        artifact_from_parts(parsed.first_candidate_parts())
    }
}
