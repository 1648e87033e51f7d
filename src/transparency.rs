//! A side channel showing exactly what goes to and comes back from the model.
//!
//! Nothing here affects control flow: every logger may be swapped for
//! [`NoopLogger`] without changing a reply.

use console::style;
use serde_json::Value;

use crate::providers::types::content::{Content, ToolCallRequest, ToolResult};
use crate::providers::types::message::Message;

const RULE_WIDTH: usize = 80;

/// Something worth showing to a learner watching the exchange.
#[derive(Debug, Clone, Copy)]
pub enum Observation<'a> {
    /// The conversation as it stands before a model call.
    Conversation {
        label: &'a str,
        messages: &'a [Message],
    },
    /// The exact JSON body posted to the model.
    Request(&'a Value),
    /// The exact JSON body the model returned.
    Response(&'a Value),
    ToolCall(&'a ToolCallRequest),
    ToolResult(&'a ToolResult),
}

pub trait TransparencyLogger: Send + Sync {
    fn render(&self, observation: &Observation<'_>);
}

/// Discards every observation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl TransparencyLogger for NoopLogger {
    fn render(&self, _observation: &Observation<'_>) {}
}

/// Prints observations to stdout, dimmed so they stand apart from replies.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleLogger;

impl TransparencyLogger for ConsoleLogger {
    fn render(&self, observation: &Observation<'_>) {
        println!("{}", style(format_observation(observation)).dim());
    }
}

/// Render an observation as plain text. Message content is reproduced
/// verbatim, labelled with its role and 1-based position.
pub fn format_observation(observation: &Observation<'_>) -> String {
    match observation {
        Observation::Conversation { label, messages } => format_conversation(label, messages),
        Observation::Request(payload) => format_payload("API Request", payload),
        Observation::Response(payload) => format_payload("API Response", payload),
        Observation::ToolCall(call) => match &call.error_message {
            Some(error) => format!("Tool: {}({}) rejected: {}", call.name, call.arguments, error),
            None => format!("Tool: {}({})", call.name, call.arguments),
        },
        Observation::ToolResult(result) => format!("Result: {}", result.output),
    }
}

fn format_conversation(label: &str, messages: &[Message]) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut lines = vec![
        rule.clone(),
        format!("TRANSPARENCY LOG: {} Mode - Full Message Payload", label),
        rule.clone(),
    ];

    for (index, message) in messages.iter().enumerate() {
        lines.push(String::new());
        lines.push(format!("[{}] Role: {}", index + 1, message.role.as_str()));
        for content in &message.content {
            match content {
                Content::Text(text) => lines.push(format!("    Content: {}", text.text)),
                Content::ToolCall(_) => lines.push(format!("    Tool call: {}", content.summary())),
                Content::ToolResult(result) => {
                    lines.push(format!("    Content: {}", result.output));
                    lines.push(format!(
                        "    Answers: {} ({})",
                        result.tool_call_id, result.name
                    ));
                }
            }
        }
    }

    lines.push(rule);
    lines.join("\n")
}

fn format_payload(title: &str, payload: &Value) -> String {
    let body = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
    format!("--- {} ---\n{}", title, body)
}
