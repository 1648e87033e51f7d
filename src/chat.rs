use std::sync::Arc;

use crate::errors::ExplorerResult;
use crate::providers::base::Provider;
use crate::providers::types::message::Message;
use crate::transparency::{NoopLogger, Observation, TransparencyLogger};

const LOG_LABEL: &str = "Basic LLM";

/// Plain completion with no tools. The caller owns the conversation and
/// appends both sides of each turn; whatever it passes is all the model sees.
pub struct BasicChat {
    provider: Arc<dyn Provider>,
    logger: Arc<dyn TransparencyLogger>,
}

impl BasicChat {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            logger: Arc::new(NoopLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn TransparencyLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn respond(&self, conversation: &[Message]) -> ExplorerResult<String> {
        self.logger.render(&Observation::Conversation {
            label: LOG_LABEL,
            messages: conversation,
        });
        let (response, _usage) = self.provider.complete(conversation, &[])?;
        Ok(response.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::MockProvider;
    use anyhow::Result;

    #[test]
    fn test_respond_sends_conversation_without_tools() -> Result<()> {
        let provider = Arc::new(MockProvider::new(vec![Message::assistant("Your name is Ada.")?]));
        let chat = BasicChat::new(provider.clone());

        let conversation = vec![
            Message::user("My name is Ada.")?,
            Message::assistant("Nice to meet you, Ada.")?,
            Message::user("What is my name?")?,
        ];
        assert_eq!(chat.respond(&conversation)?, "Your name is Ada.");

        let calls = provider.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].messages, conversation);
        assert!(calls[0].tool_names.is_empty());
        Ok(())
    }

    #[test]
    fn test_tool_calls_are_not_followed() -> Result<()> {
        use crate::providers::types::content::ToolCallRequest;

        let provider = Arc::new(MockProvider::new(vec![Message::assistant_tool_calls(
            Some("partial"),
            vec![ToolCallRequest::new("1", "magic_calculator", serde_json::json!({}))],
        )?]));
        let chat = BasicChat::new(provider.clone());

        assert_eq!(chat.respond(&[Message::user("2 + 2?")?])?, "partial");
        assert_eq!(provider.calls().len(), 1);
        Ok(())
    }
}
