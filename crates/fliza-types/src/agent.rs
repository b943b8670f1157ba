//! Agent reply and media artifact types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reply text extracted from the agent backend's response envelope,
/// together with optional metadata the backend attaches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReply {
    pub text: String,
    /// The agent's internal reasoning, when the backend exposes it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
    /// Action tags the agent attached to the reply.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
}

impl AgentReply {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            thought: None,
            actions: Vec::new(),
        }
    }
}

/// Result of a camera-frame vision analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionAnalysis {
    /// Scene description injected into the next chat send as a bracketed
    /// context annotation.
    pub analysis: String,
    pub timestamp: DateTime<Utc>,
}

/// A generated design image with optional accompanying text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignArtifact {
    /// Generated image as a `data:` URL.
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}
