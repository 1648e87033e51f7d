use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

use super::types::{message::Message, tool::Tool};
use crate::errors::ExplorerResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

fn add_counts(left: Option<i32>, right: Option<i32>) -> Option<i32> {
    match (left, right) {
        (Some(l), Some(r)) => Some(l + r),
        (l, r) => l.or(r),
    }
}

impl AddAssign for Usage {
    fn add_assign(&mut self, other: Self) {
        self.input_tokens = add_counts(self.input_tokens, other.input_tokens);
        self.output_tokens = add_counts(self.output_tokens, other.output_tokens);
        self.total_tokens = add_counts(self.total_tokens, other.total_tokens);
    }
}

/// A chat-completion backend.
///
/// `complete` sends the conversation verbatim (plus tool schemas when `tools`
/// is non-empty) and returns the assistant message of the first choice. One
/// call is one network round-trip; implementations do not retry.
pub trait Provider: Send + Sync {
    /// Create a provider instance from environment variables
    fn from_env() -> ExplorerResult<Self>
    where
        Self: Sized;

    fn complete(&self, messages: &[Message], tools: &[Tool]) -> ExplorerResult<(Message, Usage)>;
}
