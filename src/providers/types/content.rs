use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
}

/// A tool invocation requested by the model inside an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    /// Set when the model emitted a call we cannot execute as-is
    /// (bad function name, undecodable arguments).
    #[serde(default)]
    pub is_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ToolCallRequest {
    pub fn new<I, N>(id: I, name: N, arguments: Value) -> Self
    where
        I: Into<String>,
        N: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
            is_error: false,
            error_message: None,
        }
    }
}

/// The output of one tool call, bound to the id of the request it answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    pub name: String,
    pub output: String,
    #[serde(default)]
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Content {
    Text(Text),
    ToolCall(ToolCallRequest),
    ToolResult(ToolResult),
}

impl Content {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Content::Text(Text { text: text.into() })
    }

    pub fn summary(&self) -> String {
        match self {
            Content::Text(t) => t.text.clone(),
            Content::ToolCall(call) => format!(
                "tool_call[{}]: {}({})",
                call.id,
                call.name,
                serde_json::to_string(&call.arguments).unwrap_or_default()
            ),
            Content::ToolResult(result) => format!(
                "tool_result[{}]{}: {}",
                result.tool_call_id,
                if result.is_error { " (error)" } else { "" },
                result.output
            ),
        }
    }
}
