use std::sync::Arc;

use crate::errors::ExplorerResult;
use crate::providers::base::{Provider, Usage};
use crate::providers::types::message::Message;
use crate::tools::ToolRegistry;
use crate::transparency::{NoopLogger, Observation, TransparencyLogger};

/// Provider round-trips allowed per reply.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

pub const MAX_ITERATIONS_REPLY: &str = "Error: Maximum iterations reached";

const LOG_LABEL: &str = "Agent";

/// How a reply ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The model answered without requesting tools.
    Done,
    /// The round-trip budget ran out while the model kept calling tools.
    IterationLimitReached,
}

#[derive(Debug, Clone)]
pub struct AgentReply {
    pub content: String,
    pub outcome: Outcome,
    pub round_trips: usize,
    pub usage: Usage,
    /// Every message of the exchange, ending with the final assistant message
    /// when the outcome is `Done`.
    pub transcript: Vec<Message>,
}

/// Agent integrates a model with the local tools it may call.
///
/// Each reply starts a fresh conversation from the user's text; nothing is
/// carried between replies.
pub struct Agent {
    provider: Arc<dyn Provider>,
    registry: ToolRegistry,
    logger: Arc<dyn TransparencyLogger>,
    max_iterations: usize,
}

impl Agent {
    pub fn new(provider: Arc<dyn Provider>, registry: ToolRegistry) -> Self {
        Self {
            provider,
            registry,
            logger: Arc::new(NoopLogger),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn TransparencyLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Run the tool-calling loop for one user turn.
    ///
    /// Tool calls are executed in the order the model emitted them, each
    /// answered by a tool message carrying the call's id. Provider errors are
    /// returned as-is; tool failures become tool messages and the loop goes on.
    pub fn reply(&self, user_text: &str) -> ExplorerResult<AgentReply> {
        let mut messages = vec![Message::user(user_text)?];
        let mut usage = Usage::default();

        for round in 1..=self.max_iterations {
            self.logger.render(&Observation::Conversation {
                label: LOG_LABEL,
                messages: &messages,
            });

            let (response, round_usage) = self.provider.complete(&messages, self.registry.tools())?;
            usage += round_usage;

            let tool_calls = response.tool_calls();
            if tool_calls.is_empty() {
                tracing::debug!(round, "agent reply complete");
                let content = response.text();
                messages.push(response);
                return Ok(AgentReply {
                    content,
                    outcome: Outcome::Done,
                    round_trips: round,
                    usage,
                    transcript: messages,
                });
            }

            tracing::debug!(round, calls = tool_calls.len(), "executing tool calls");
            messages.push(response);

            for call in &tool_calls {
                self.logger.render(&Observation::ToolCall(call));
                let result = self.registry.dispatch(call);
                self.logger.render(&Observation::ToolResult(&result));
                messages.push(Message::tool(result)?);
            }
        }

        tracing::warn!(
            max_iterations = self.max_iterations,
            "agent stopped at the iteration limit"
        );
        Ok(AgentReply {
            content: MAX_ITERATIONS_REPLY.to_string(),
            outcome: Outcome::IterationLimitReached,
            round_trips: self.max_iterations,
            usage,
            transcript: messages,
        })
    }
}
