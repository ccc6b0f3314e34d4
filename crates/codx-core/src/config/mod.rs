//! Configuration management for Codx.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `codx.toml` file
//! 3. User config `~/.config/codx/config.toml`
//! 4. Built-in defaults (lowest priority)

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod defaults;

pub use defaults::*;

use crate::knowledge::SearchType;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Knowledge index configuration.
    pub knowledge: KnowledgeConfig,

    /// LLM provider configuration.
    pub llm: LlmConfig,

    /// Background watch configuration.
    pub watch: WatchConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./codx.toml` (project local)
    /// 2. `~/.config/codx/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new("codx.toml").exists() {
            return Self::from_file("codx.toml");
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("codx").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // LLM overrides
        if let Ok(provider) = std::env::var("CODX_LLM_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Ok(model) = std::env::var("CODX_LLM_MODEL") {
            self.llm.model = Some(model);
        }
        if let Ok(url) = std::env::var("CODX_LLM_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Ok(key) = std::env::var("CODX_LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }

        // Knowledge overrides
        if let Ok(cutoff) = std::env::var("CODX_RELEVANCE_CUTOFF") {
            if let Ok(n) = cutoff.parse() {
                self.knowledge.relevance_cutoff = n;
            }
        }
        if let Ok(enrich) = std::env::var("CODX_ENRICH_DOCUMENTS") {
            self.knowledge.enrich_documents = matches!(enrich.as_str(), "1" | "true" | "yes");
        }
    }
}

/// Knowledge index configuration.
///
/// Consumed read-only by the indexing and relevance layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Minimum relevance score (0..=1) for a document to be kept.
    /// A value <= 0 disables scoring entirely.
    pub relevance_cutoff: f32,

    /// Vector store search strategy.
    pub search_type: SearchType,

    /// Number of documents requested per query.
    pub result_count: usize,

    /// Path substrings excluded from indexing.
    pub ignore_patterns: Vec<String>,

    /// Whether documents are LLM-enriched (summarized) before indexing.
    pub enrich_documents: bool,

    /// Custom enrichment prompt template. `{{ page_content }}` and
    /// `{{ language }}` are substituted.
    pub enrich_prompt: Option<String>,

    /// Fixed-size fallback chunk size in estimated tokens.
    pub chunk_size_tokens: usize,

    /// Data directory (relative to the project root) for the status cache.
    pub data_dir: String,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            relevance_cutoff: DEFAULT_RELEVANCE_CUTOFF,
            search_type: SearchType::default(),
            result_count: DEFAULT_RESULT_COUNT,
            ignore_patterns: DEFAULT_IGNORE_PATTERNS.iter().map(|s| s.to_string()).collect(),
            enrich_documents: false,
            enrich_prompt: None,
            chunk_size_tokens: DEFAULT_CHUNK_SIZE_TOKENS,
            data_dir: DEFAULT_DATA_DIR.to_string(),
        }
    }
}

/// LLM provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "openai", "anthropic", "ollama", or "openai-compatible".
    pub provider: String,

    /// Model name (provider-specific).
    pub model: Option<String>,

    /// Base URL for API (for openai-compatible providers).
    pub base_url: Option<String>,

    /// API key (can also be set via environment variable).
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Maximum tokens for responses.
    pub max_tokens: u32,

    /// API version (for Anthropic).
    pub api_version: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_LLM_PROVIDER.to_string(),
            model: None,
            base_url: None,
            api_key: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            api_version: Some(DEFAULT_ANTHROPIC_API_VERSION.to_string()),
        }
    }
}

impl LlmConfig {
    /// Get the model name, falling back to provider defaults.
    pub fn model_or_default(&self) -> String {
        self.model.clone().unwrap_or_else(|| match self.provider.as_str() {
            "anthropic" | "claude" => DEFAULT_ANTHROPIC_MODEL.to_string(),
            "ollama" => DEFAULT_OLLAMA_MODEL.to_string(),
            _ => DEFAULT_OPENAI_MODEL.to_string(),
        })
    }

    /// Get the API key from config or environment.
    pub fn api_key_or_env(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("CODX_LLM_API_KEY").ok())
            .or_else(|| match self.provider.as_str() {
                "anthropic" | "claude" => std::env::var("ANTHROPIC_API_KEY").ok(),
                _ => std::env::var("OPENAI_API_KEY").ok(),
            })
    }
}

/// Background watch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Poll interval in seconds.
    pub interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_WATCH_INTERVAL_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.knowledge.relevance_cutoff, DEFAULT_RELEVANCE_CUTOFF);
        assert_eq!(config.knowledge.result_count, DEFAULT_RESULT_COUNT);
        assert_eq!(config.llm.provider, DEFAULT_LLM_PROVIDER);
        assert_eq!(config.watch.interval_secs, DEFAULT_WATCH_INTERVAL_SECS);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[knowledge]"));
        assert!(toml_str.contains("[llm]"));
        assert!(toml_str.contains("[watch]"));
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
[knowledge]
relevance_cutoff = 0.5
search_type = "similarity"
result_count = 4

[llm]
provider = "ollama"
model = "codellama"

[watch]
interval_secs = 10
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.knowledge.relevance_cutoff, 0.5);
        assert_eq!(config.knowledge.search_type, SearchType::Similarity);
        assert_eq!(config.knowledge.result_count, 4);
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.watch.interval_secs, 10);
    }

    #[test]
    fn test_model_or_default() {
        let mut config = LlmConfig::default();

        config.provider = "anthropic".to_string();
        assert_eq!(config.model_or_default(), DEFAULT_ANTHROPIC_MODEL);

        config.provider = "ollama".to_string();
        assert_eq!(config.model_or_default(), DEFAULT_OLLAMA_MODEL);

        config.model = Some("custom-model".to_string());
        assert_eq!(config.model_or_default(), "custom-model");
    }
}
