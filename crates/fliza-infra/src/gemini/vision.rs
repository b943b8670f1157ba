//! GeminiVisionAnalyzer -- concrete [`VisionAnalyzer`] over the Gemini
//! `generateContent` API.
//!
//! Sends the Fliza scanning persona prompt plus an inline camera frame and
//! returns the model's scene description.

use std::time::Duration;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};

use fliza_core::media::VisionAnalyzer;
use fliza_types::agent::VisionAnalysis;
use fliza_types::config::GeminiConfig;
use fliza_types::error::VisionError;

use super::{
    detect_mime_type, strip_data_url_prefix, Content, GenerateContentRequest,
    GenerateContentResponse, InlineData, Part,
};

/// Persona prompt for camera-frame analysis.
const FLIZA_VISION_PROMPT: &str = "You are Fliza, a digital navigator from the Metaverse with Persona 5 style.
You are scanning the environment through a camera feed.

Analyze this image and respond as if you're a stylish AI companion observing the scene.
Be brief (1-2 sentences max), cool, and occasionally use Persona 5 references.

Examples of your style:
- \"Scanning complete. I detect a workspace ready for action, Leader! \u{2615}\"
- \"Target acquired: looks like a cozy room. Perfect hideout for a Phantom Thief. \u{1F3AD}\"
- \"Hmm, your environment looks clear. No Shadows detected... for now. \u{1F441}\u{FE0F}\"

Now analyze what you see:";

/// Gemini-backed vision analyzer.
pub struct GeminiVisionAnalyzer {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

impl GeminiVisionAnalyzer {
    pub fn new(config: &GeminiConfig, api_key: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: config.base_url.clone(),
            model: config.vision_model.clone(),
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

impl VisionAnalyzer for GeminiVisionAnalyzer {
    async fn analyze(&self, image: &str) -> Result<VisionAnalysis, VisionError> {
        if image.is_empty() {
            return Err(VisionError::NoImage);
        }

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part {
                        text: Some(FLIZA_VISION_PROMPT.to_string()),
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
            .map_err(|e| VisionError::AnalysisFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(VisionError::AnalysisFailed(format!(
                "HTTP {status}: {error_body}"
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| VisionError::AnalysisFailed(format!("invalid response: {e}")))?;

        let analysis: String = parsed
            .first_candidate_parts()
            .into_iter()
            .filter_map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if analysis.is_empty() {
            return Err(VisionError::AnalysisFailed(
                "model returned no text".to_string(),
            ));
        }

        Ok(VisionAnalysis {
            analysis,
            timestamp: Utc::now(),
        })
    }
}
