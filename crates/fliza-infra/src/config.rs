//! Configuration loader for Fliza.
//!
//! Reads `config.toml` from the data directory (`~/.fliza/` in production)
//! and deserializes it into [`FlizaConfig`]. Falls back to defaults when
//! the file is missing or malformed.

use std::path::Path;

use fliza_types::config::FlizaConfig;

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`FlizaConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config(data_dir: &Path) -> FlizaConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No config.toml found at {}, using defaults",
                config_path.display()
            );
            return FlizaConfig::default();
        }
        Err(err) => {
            tracing::warn!(
                "Failed to read {}: {err}, using defaults",
                config_path.display()
            );
            return FlizaConfig::default();
        }
    };

    match toml::from_str::<FlizaConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            FlizaConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config.agent.expiry_safety_margin_secs, 300);
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[agent]
base_url = "http://localhost:3001"
request_timeout_secs = 10

[gemini]
vision_model = "gemini-2.5-flash"
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.agent.base_url, "http://localhost:3001");
        assert_eq!(config.agent.request_timeout_secs, 10);
        assert_eq!(config.gemini.vision_model, "gemini-2.5-flash");
        // Unset fields keep their defaults.
        assert_eq!(config.agent.default_session_ttl_secs, 3600);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.agent.request_timeout_secs, 30);
    }
}
