use super::base::ProviderConfig;
use crate::errors::{ExplorerError, ExplorerResult};

pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const HOST_VAR: &str = "OPENROUTER_API_HOST";
pub const MODEL_VAR: &str = "OPENROUTER_MODEL";

pub const DEFAULT_HOST: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "openai/gpt-4o";

/// Settings for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiProviderConfig {
    pub api_key: String,
    /// Base url, `/chat/completions` is appended.
    pub host: String,
    pub model: String,
}

impl OpenAiProviderConfig {
    pub fn new(api_key: String, host: String, model: String) -> Self {
        Self {
            api_key,
            host,
            model,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.host.trim_end_matches('/'))
    }
}

impl OpenAiProviderConfig {
    /// Like [`ProviderConfig::from_env`], but any value passed in wins over
    /// the environment.
    pub fn from_env_with(
        api_key: Option<String>,
        host: Option<String>,
        model: Option<String>,
    ) -> ExplorerResult<Self> {
        let api_key = match api_key.filter(|key| !key.trim().is_empty()) {
            Some(key) => key,
            None => Self::get_env(API_KEY_VAR, false, None)?.ok_or_else(|| {
                ExplorerError::Config(format!("{} not found in environment", API_KEY_VAR))
            })?,
        };

        let host = match host {
            Some(host) => host,
            None => Self::get_env(HOST_VAR, false, None)?
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        };

        let model = match model {
            Some(model) => model,
            None => Self::get_env(MODEL_VAR, false, None)?
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        };

        Ok(Self::new(api_key, host, model))
    }
}

impl ProviderConfig for OpenAiProviderConfig {
    fn from_env() -> ExplorerResult<Self> {
        Self::from_env_with(None, None, None)
    }
}
