use reqwest::blocking::Client; // blocking: one synchronous round-trip per call
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use super::{
    base::{Provider, Usage},
    configs::base::ProviderConfig,
    configs::openai::OpenAiProviderConfig,
    types::{
        message::{validate_conversation, Message},
        tool::Tool,
    },
    utils::{
        get_usage, messages_to_openai_spec, openai_error, openai_response_to_message,
        tools_to_openai_spec,
    },
};
use crate::errors::{ExplorerError, ExplorerResult};
use crate::transparency::{NoopLogger, Observation, TransparencyLogger};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Client for any OpenAI-compatible `/chat/completions` endpoint
/// (OpenRouter by default).
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
    logger: Arc<dyn TransparencyLogger>,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> ExplorerResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ExplorerError::Config("API key must not be empty".to_string()));
        }

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            config,
            logger: Arc::new(NoopLogger),
        })
    }

    /// Show raw request and response bodies through `logger`.
    pub fn with_logger(mut self, logger: Arc<dyn TransparencyLogger>) -> Self {
        self.logger = logger;
        self
    }

    fn build_payload(&self, messages: &[Message], tools: &[Tool]) -> ExplorerResult<Value> {
        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_to_openai_spec(messages),
        });

        if !tools.is_empty() {
            payload["tools"] = json!(tools_to_openai_spec(tools)?);
            payload["tool_choice"] = json!("auto");
        }

        Ok(payload)
    }

    fn post(&self, payload: &Value) -> ExplorerResult<Value> {
        let response = self
            .client
            .post(self.config.endpoint())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(payload)
            .send()?;

        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            // Prefer the provider's own error description when it sent one.
            if let Some(error) = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|value| value.get("error").cloned())
            {
                return Err(openai_error(&error));
            }
            return Err(ExplorerError::Transport(format!(
                "Request failed: {}: {}",
                status, body
            )));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl Provider for OpenAiProvider {
    fn from_env() -> ExplorerResult<Self> {
        let config = OpenAiProviderConfig::from_env()?;
        Self::new(config)
    }

    fn complete(&self, messages: &[Message], tools: &[Tool]) -> ExplorerResult<(Message, Usage)> {
        validate_conversation(messages)?;

        let payload = self.build_payload(messages, tools)?;
        self.logger.render(&Observation::Request(&payload));
        tracing::debug!(
            model = %self.config.model,
            messages = messages.len(),
            tools = tools.len(),
            "sending chat completion request"
        );

        let response = self.post(&payload)?;
        self.logger.render(&Observation::Response(&response));

        if let Some(error) = response.get("error") {
            return Err(openai_error(error));
        }

        let message = openai_response_to_message(&response)?;
        let usage = get_usage(&response);
        tracing::debug!(
            tool_calls = message.tool_calls().len(),
            total_tokens = ?usage.total_tokens,
            "received chat completion"
        );

        Ok((message, usage))
    }
}
