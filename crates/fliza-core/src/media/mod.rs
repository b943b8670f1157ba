//! Media adapter traits: camera-frame vision analysis and design-image
//! generation. Gemini-backed implementations live in fliza-infra.

use fliza_types::agent::{DesignArtifact, VisionAnalysis};
use fliza_types::error::{DesignError, VisionError};

/// Analyzes a still camera frame and returns a scene description for
/// injection into the next chat send.
pub trait VisionAnalyzer: Send + Sync {
    /// `image` is base64-encoded JPEG/PNG, with or without a `data:` URL
    /// prefix.
    fn analyze(
        &self,
        image: &str,
    ) -> impl std::future::Future<Output = Result<VisionAnalysis, VisionError>> + Send;
}

/// Generates a stylized design image from a source frame and a prompt.
pub trait DesignGenerator: Send + Sync {
    fn generate(
        &self,
        prompt: &str,
        image: &str,
    ) -> impl std::future::Future<Output = Result<DesignArtifact, DesignError>> + Send;
}
