//! Configuration types for Fliza.
//!
//! Deserialized from `{data_dir}/config.toml`; every field has a default
//! so a missing or partial file still yields a working configuration.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlizaConfig {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Remote agent backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Base URL of the agent service.
    #[serde(default = "default_agent_base_url")]
    pub base_url: String,
    /// Agent identifier used when creating sessions.
    #[serde(default = "default_agent_id")]
    pub agent_id: String,
    /// Bounded timeout for each remote call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Session lifetime assumed when the backend omits an expiry.
    #[serde(default = "default_session_ttl_secs")]
    pub default_session_ttl_secs: u64,
    /// Margin subtracted from the server expiry before caching, so a
    /// cached handle is never used right as it expires server-side.
    #[serde(default = "default_expiry_safety_margin_secs")]
    pub expiry_safety_margin_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            base_url: default_agent_base_url(),
            agent_id: default_agent_id(),
            request_timeout_secs: default_request_timeout_secs(),
            default_session_ttl_secs: default_session_ttl_secs(),
            expiry_safety_margin_secs: default_expiry_safety_margin_secs(),
        }
    }
}

/// Gemini vision/design model settings. The API key is read from the
/// `GEMINI_API_KEY` environment variable, never from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    /// Model used for camera-frame scene analysis.
    #[serde(default = "default_vision_model")]
    pub vision_model: String,
    /// Image-generation model used for the design workflow.
    #[serde(default = "default_design_model")]
    pub design_model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            vision_model: default_vision_model(),
            design_model: default_design_model(),
        }
    }
}

/// Local database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database filename inside the data directory.
    #[serde(default = "default_database_filename")]
    pub filename: String,
    /// Size of the read pool. Writes always serialize on one connection.
    #[serde(default = "default_max_read_connections")]
    pub max_read_connections: u32,
    /// How long a connection waits on a locked database before giving up.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            filename: default_database_filename(),
            max_read_connections: default_max_read_connections(),
            busy_timeout_secs: default_busy_timeout_secs(),
        }
    }
}

fn default_agent_base_url() -> String {
    "https://fliza-agent-production.up.railway.app".to_string()
}

fn default_agent_id() -> String {
    "16f68732-3783-05ea-b38a-ad1e1c7ea90c".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_session_ttl_secs() -> u64 {
    3600
}

fn default_expiry_safety_margin_secs() -> u64 {
    300
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_vision_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_design_model() -> String {
    "gemini-3-pro-image-preview".to_string()
}

fn default_database_filename() -> String {
    "fliza.db".to_string()
}

fn default_max_read_connections() -> u32 {
    8
}

fn default_busy_timeout_secs() -> u64 {
    5
}
