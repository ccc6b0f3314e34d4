use super::{ClaudeClient, Llm, LlmError, OpenAiClient};
use crate::config::{LlmConfig, DEFAULT_OLLAMA_MODEL, DEFAULT_OPENAI_MODEL, DEFAULT_OPENAI_URL};

/// LLM provider selection.
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI-compatible endpoint (default, most universal)
    OpenAi {
        base_url: Option<String>,
        api_key: Option<String>,
        model: Option<String>,
    },
    /// Anthropic Claude
    Anthropic {
        api_key: Option<String>,
        model: Option<String>,
    },
    /// Local Ollama instance
    Ollama { model: String },
}

impl Default for Provider {
    fn default() -> Self {
        Provider::OpenAi {
            base_url: None,
            api_key: None,
            model: None,
        }
    }
}

impl Provider {
    /// Creates a provider from LlmConfig.
    pub fn from_config(config: &LlmConfig) -> Self {
        match config.provider.as_str() {
            "anthropic" | "claude" => Provider::Anthropic {
                api_key: config.api_key_or_env(),
                model: config.model.clone(),
            },
            "ollama" => Provider::Ollama {
                model: config
                    .model
                    .clone()
                    .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            },
            _ => Provider::OpenAi {
                base_url: config.base_url.clone(),
                api_key: config.api_key_or_env(),
                model: config.model.clone(),
            },
        }
    }

    /// Creates an LLM client from the provider configuration.
    pub fn build(self) -> Result<Box<dyn Llm>, LlmError> {
        match self {
            Provider::OpenAi { base_url, api_key, model } => {
                let base = base_url
                    .or_else(|| std::env::var("CODX_LLM_BASE_URL").ok())
                    .unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string());
                let key = api_key
                    .or_else(|| std::env::var("CODX_LLM_API_KEY").ok())
                    .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                    .unwrap_or_default();
                let mdl = model
                    .or_else(|| std::env::var("CODX_LLM_MODEL").ok())
                    .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
                Ok(Box::new(OpenAiClient::new(base, key, mdl)))
            }

            Provider::Anthropic { api_key, model } => {
                let key = api_key
                    .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
                    .ok_or(LlmError::MissingApiKey)?;
                let mut client = ClaudeClient::new(key);
                if let Some(mdl) = model {
                    client = client.with_model(mdl);
                }
                Ok(Box::new(client))
            }

            Provider::Ollama { model } => Ok(Box::new(OpenAiClient::ollama(model))),
        }
    }

    /// Auto-detect a provider from environment variables.
    ///
    /// Detection order:
    /// 1. CODX_LLM_PROVIDER explicitly set
    /// 2. CODX_LLM_BASE_URL set -> OpenAI-compatible
    /// 3. ANTHROPIC_API_KEY set -> Anthropic
    /// 4. OPENAI_API_KEY set -> OpenAI
    /// 5. Default to OpenAI-compatible (works with local servers too)
    pub fn from_env() -> Result<Box<dyn Llm>, LlmError> {
        if let Ok(provider) = std::env::var("CODX_LLM_PROVIDER") {
            return match provider.to_lowercase().as_str() {
                "openai" | "openai-compatible" => Provider::default().build(),
                "anthropic" | "claude" => Provider::Anthropic {
                    api_key: None,
                    model: None,
                }
                .build(),
                "ollama" => {
                    let model = std::env::var("CODX_LLM_MODEL")
                        .unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string());
                    Provider::Ollama { model }.build()
                }
                other => Err(LlmError::UnknownProvider(other.to_string())),
            };
        }

        if std::env::var("CODX_LLM_BASE_URL").is_ok() {
            return Provider::default().build();
        }
        if std::env::var("ANTHROPIC_API_KEY").is_ok() {
            return Provider::Anthropic {
                api_key: None,
                model: None,
            }
            .build();
        }

        Provider::default().build()
    }
}
