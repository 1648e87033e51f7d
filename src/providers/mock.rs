use std::sync::Mutex;

use super::base::{Provider, Usage};
use super::types::{message::Message, tool::Tool};
use crate::errors::{ExplorerError, ExplorerResult};

/// What the provider was asked on one call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub tool_names: Vec<String>,
}

/// A mock provider that returns pre-configured responses for testing
pub struct MockProvider {
    responses: Mutex<Vec<ExplorerResult<Message>>>,
    // Returned forever once `responses` runs dry.
    fallback: Option<Message>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(responses: Vec<ExplorerResult<Message>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A provider that answers every call with `response`.
    pub fn repeating(response: Message) -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            fallback: Some(response),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Provider for MockProvider {
    fn from_env() -> ExplorerResult<Self> {
        Ok(Self::new(Vec::new()))
    }

    fn complete(&self, messages: &[Message], tools: &[Tool]) -> ExplorerResult<(Message, Usage)> {
        self.calls.lock().unwrap().push(RecordedCall {
            messages: messages.to_vec(),
            tool_names: tools.iter().map(|tool| tool.name.clone()).collect(),
        });

        let mut responses = self.responses.lock().unwrap();
        let next = if responses.is_empty() {
            match &self.fallback {
                Some(message) => Ok(message.clone()),
                None => Err(ExplorerError::Transport(
                    "mock provider has no more responses".to_string(),
                )),
            }
        } else {
            responses.remove(0)
        };

        next.map(|message| (message, Usage::new(Some(1), Some(1), Some(2))))
    }
}
