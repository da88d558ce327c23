//! Typed application configuration.
//!
//! Loaded from `config.yml` (user data dir first, then project root) with
//! environment overrides for secrets and the listen port. Every tunable the
//! pipeline consumes is an enumerated field here; nothing reads raw config
//! values at call sites.

pub mod paths;
pub mod validation;

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::core::errors::ApiError;

pub use paths::AppPaths;
pub use validation::validate_config;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per query.
    pub max_results: usize,
    /// Number of previous exchanges kept per session.
    pub max_history: usize,
    /// Overrides the default `<project_root>/docs` ingestion directory.
    pub docs_dir: Option<PathBuf>,
    pub server: ServerConfig,
    pub anthropic: AnthropicConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    pub base_url: String,
    pub model: String,
    /// Normally supplied via `ANTHROPIC_API_KEY` rather than the config file.
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 100,
            max_results: 5,
            max_history: 2,
            docs_dir: None,
            server: ServerConfig::default(),
            anthropic: AnthropicConfig::default(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_key: None,
            max_tokens: 800,
            temperature: 0.0,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8090".to_string(),
            model: "all-MiniLM-L6-v2".to_string(),
        }
    }
}

impl AppConfig {
    /// Load the configuration, apply environment overrides, and validate it.
    pub fn load(paths: &AppPaths) -> Result<Self, ApiError> {
        let path = config_path(paths);

        let mut config = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(ApiError::internal)?;
            serde_yaml::from_str::<AppConfig>(&contents)
                .map_err(|e| ApiError::BadRequest(format!("invalid config file: {}", e)))?
        } else {
            AppConfig::default()
        };

        if let Ok(key) = env::var("ANTHROPIC_API_KEY") {
            if !key.trim().is_empty() {
                config.anthropic.api_key = Some(key);
            }
        }
        if let Ok(port) = env::var("PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.server.port = port;
            }
        }

        validate_config(&config)?;
        Ok(config)
    }
}

fn config_path(paths: &AppPaths) -> PathBuf {
    if let Ok(path) = env::var("LECTERN_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    let user_config = paths.user_data_dir.join("config.yml");
    if user_config.exists() {
        return user_config;
    }

    paths.project_root.join("config.yml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.chunk_size, 800);
        assert_eq!(config.chunk_overlap, 100);
    }

    #[test]
    fn parses_partial_yaml() {
        let config: AppConfig = serde_yaml::from_str(
            "chunk_size: 500\nanthropic:\n  model: claude-3-5-haiku-20241022\n",
        )
        .unwrap();

        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.anthropic.model, "claude-3-5-haiku-20241022");
        // Unspecified fields keep their defaults
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.server.port, 8000);
    }
}
