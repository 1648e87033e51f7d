use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::content::{Content, Text, ToolCallRequest, ToolResult};
use crate::errors::{ExplorerError, ExplorerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// One entry of a conversation. The ordered list of messages is the whole
/// model input; nothing else is remembered between calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub id: String,
    pub created: i64,
    pub content: Vec<Content>,
}

pub fn create_object_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

impl Message {
    pub fn new(role: Role, content: Vec<Content>) -> ExplorerResult<Self> {
        let msg = Self {
            role,
            id: create_object_id("msg"),
            created: chrono::Utc::now().timestamp(),
            content,
        };
        msg.validate()?;
        Ok(msg)
    }

    fn validate(&self) -> ExplorerResult<()> {
        let invalid = |reason: &str| Err(ExplorerError::InvalidMessage(reason.to_string()));
        match self.role {
            Role::System | Role::User => {
                if !self.has_text() {
                    return invalid(&format!("{} message must include a Text", self.role.as_str()));
                }
                if self.has_tool_calls() || self.has_tool_result() {
                    return invalid(&format!(
                        "{} message only supports Text",
                        self.role.as_str()
                    ));
                }
            }
            Role::Assistant => {
                if !self.has_text() && !self.has_tool_calls() {
                    return invalid("Assistant message must include a Text or ToolCall");
                }
                if self.has_tool_result() {
                    return invalid("Assistant message does not support ToolResult");
                }
            }
            Role::Tool => {
                if self.content.len() != 1 || !self.has_tool_result() {
                    return invalid("Tool message must hold exactly one ToolResult");
                }
            }
        }
        Ok(())
    }

    pub fn user(text: &str) -> ExplorerResult<Self> {
        Self::new(Role::User, vec![Content::text(text)])
    }

    pub fn assistant(text: &str) -> ExplorerResult<Self> {
        Self::new(Role::Assistant, vec![Content::text(text)])
    }

    /// An assistant turn that requests tools, optionally with accompanying text.
    pub fn assistant_tool_calls(
        text: Option<&str>,
        calls: Vec<ToolCallRequest>,
    ) -> ExplorerResult<Self> {
        let mut content: Vec<Content> = text.map(Content::text).into_iter().collect();
        content.extend(calls.into_iter().map(Content::ToolCall));
        Self::new(Role::Assistant, content)
    }

    pub fn tool(result: ToolResult) -> ExplorerResult<Self> {
        Self::new(Role::Tool, vec![Content::ToolResult(result)])
    }

    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|content| match content {
                Content::Text(Text { text }) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn tool_calls(&self) -> Vec<ToolCallRequest> {
        self.content
            .iter()
            .filter_map(|content| match content {
                Content::ToolCall(call) => Some(call.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn tool_result(&self) -> Option<&ToolResult> {
        self.content.iter().find_map(|content| match content {
            Content::ToolResult(result) => Some(result),
            _ => None,
        })
    }

    pub fn has_text(&self) -> bool {
        self.content.iter().any(|c| matches!(c, Content::Text(_)))
    }

    pub fn has_tool_calls(&self) -> bool {
        self.content.iter().any(|c| matches!(c, Content::ToolCall(_)))
    }

    fn has_tool_result(&self) -> bool {
        self.content.iter().any(|c| matches!(c, Content::ToolResult(_)))
    }
}

/// Checks that every tool message answers a tool call emitted by an earlier
/// assistant message and not yet answered. An id used by several calls must
/// be answered once per call.
pub fn validate_conversation(messages: &[Message]) -> ExplorerResult<()> {
    let mut pending: HashMap<String, usize> = HashMap::new();

    for (index, message) in messages.iter().enumerate() {
        match message.role {
            Role::Assistant => {
                for call in message.tool_calls() {
                    *pending.entry(call.id).or_default() += 1;
                }
            }
            Role::Tool => {
                let Some(result) = message.tool_result() else {
                    continue;
                };
                match pending.get_mut(&result.tool_call_id) {
                    Some(count) if *count > 0 => *count -= 1,
                    _ => {
                        return Err(ExplorerError::InvalidConversation(format!(
                            "message {} answers tool call '{}' which is not pending",
                            index, result.tool_call_id
                        )))
                    }
                }
            }
            Role::System | Role::User => {}
        }
    }
    Ok(())
}
