use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashSet;

use super::base::Usage;
use super::types::{
    content::{Content, Text, ToolCallRequest},
    message::{create_object_id, Message, Role},
    tool::Tool,
};
use crate::errors::{ExplorerError, ExplorerResult};

lazy_static! {
    static ref INVALID_NAME_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
    static ref VALID_NAME: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Convert internal Message format to OpenAI's API message specification
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut converted = json!({
            "role": message.role
        });

        for content in &message.content {
            match content {
                Content::Text(Text { text }) => {
                    converted["content"] = json!(text);
                }
                Content::ToolCall(call) => {
                    let entry = json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": sanitize_function_name(&call.name),
                            "arguments": arguments_to_string(&call.arguments),
                        }
                    });
                    match converted.get_mut("tool_calls").and_then(Value::as_array_mut) {
                        Some(calls) => calls.push(entry),
                        None => converted["tool_calls"] = json!([entry]),
                    }
                }
                Content::ToolResult(result) => {
                    converted["tool_call_id"] = json!(result.tool_call_id);
                    converted["name"] = json!(result.name);
                    converted["content"] = json!(result.output);
                }
            }
        }

        messages_spec.push(converted);
    }

    messages_spec
}

// The model sends arguments as a JSON-encoded string; calls that failed to
// decode keep the raw string, which goes back unchanged.
fn arguments_to_string(arguments: &Value) -> String {
    match arguments {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

/// Convert internal Tool format to OpenAI's API tool specification
pub fn tools_to_openai_spec(tools: &[Tool]) -> ExplorerResult<Vec<Value>> {
    let mut tool_names = HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(ExplorerError::DuplicateTool(tool.name.clone()));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters,
            }
        }));
    }

    Ok(result)
}

/// Convert OpenAI's API response to internal Message format
pub fn openai_response_to_message(response: &Value) -> ExplorerResult<Message> {
    let original = response
        .pointer("/choices/0/message")
        .filter(|message| message.is_object())
        .ok_or_else(|| {
            ExplorerError::MalformedResponse("response has no choices[0].message".to_string())
        })?;
    let mut content = Vec::new();

    if let Some(text) = original.get("content").and_then(Value::as_str) {
        content.push(Content::text(text));
    }

    if let Some(tool_calls) = original.get("tool_calls").and_then(Value::as_array) {
        for tool_call in tool_calls {
            content.push(Content::ToolCall(parse_tool_call(tool_call)));
        }
    }

    // Content may legitimately be null; treat a bare reply as empty text.
    if content.is_empty() {
        content.push(Content::text(""));
    }

    Message::new(Role::Assistant, content)
}

fn parse_tool_call(tool_call: &Value) -> ToolCallRequest {
    // Some backends omit ids; every call still needs its own answer.
    let id = match tool_call["id"].as_str() {
        Some(id) if !id.trim().is_empty() => id.to_string(),
        _ => create_object_id("call"),
    };
    let function_name = tool_call["function"]["name"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let raw_arguments = &tool_call["function"]["arguments"];

    if !is_valid_function_name(&function_name) {
        let error = format!(
            "The provided function name '{}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+",
            function_name
        );
        return failed_call(id, function_name, raw_arguments.clone(), error);
    }

    let parsed = match raw_arguments {
        Value::String(arguments) if arguments.trim().is_empty() => Ok(json!({})),
        Value::String(arguments) => serde_json::from_str::<Value>(arguments),
        Value::Null => Ok(json!({})),
        other => Ok(other.clone()),
    };

    match parsed {
        Ok(arguments) => ToolCallRequest::new(id, function_name, arguments),
        Err(_) => {
            let error = format!(
                "Could not interpret tool use parameters for id {}: {}",
                id,
                arguments_to_string(raw_arguments)
            );
            failed_call(id, function_name, raw_arguments.clone(), error)
        }
    }
}

fn failed_call(id: String, name: String, arguments: Value, error: String) -> ToolCallRequest {
    ToolCallRequest {
        id,
        name,
        arguments,
        is_error: true,
        error_message: Some(error),
    }
}

/// Read token counts from the `usage` object, tolerating its absence.
pub fn get_usage(data: &Value) -> Usage {
    let Some(usage) = data.get("usage") else {
        return Usage::default();
    };

    let count = |key: &str| usage.get(key).and_then(Value::as_i64).map(|v| v as i32);
    let input_tokens = count("prompt_tokens");
    let output_tokens = count("completion_tokens");
    let total_tokens = count("total_tokens").or(match (input_tokens, output_tokens) {
        (Some(input), Some(output)) => Some(input + output),
        _ => None,
    });

    Usage::new(input_tokens, output_tokens, total_tokens)
}

fn sanitize_function_name(name: &str) -> String {
    INVALID_NAME_CHARS.replace_all(name, "_").to_string()
}

fn is_valid_function_name(name: &str) -> bool {
    VALID_NAME.is_match(name)
}

/// Map a top-level `error` object from the provider to an error.
pub fn openai_error(error: &Value) -> ExplorerError {
    let message = error
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string());

    match error.get("code").and_then(Value::as_str) {
        Some("context_length_exceeded") | Some("string_above_max_length") => {
            ExplorerError::ContextLengthExceeded(message)
        }
        _ => ExplorerError::Api(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::types::content::ToolResult;
    use anyhow::Result;

    const OPENAI_TOOL_USE_RESPONSE: &str = r#"{
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {
                        "name": "magic_calculator",
                        "arguments": "{\"expression\": \"15 * 23\"}"
                    }
                }]
            }
        }],
        "usage": {
            "prompt_tokens": 10,
            "completion_tokens": 25
        }
    }"#;

    #[test]
    fn test_messages_to_openai_spec() -> Result<()> {
        let message = Message::user("Hello")?;
        let spec = messages_to_openai_spec(&[message]);

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0], json!({"role": "user", "content": "Hello"}));
        Ok(())
    }

    #[test]
    fn test_messages_to_openai_spec_tool_round() -> Result<()> {
        let messages = vec![
            Message::user("What is 15 * 23?")?,
            Message::assistant_tool_calls(
                None,
                vec![ToolCallRequest::new(
                    "call_1",
                    "magic_calculator",
                    json!({"expression": "15 * 23"}),
                )],
            )?,
            Message::tool(ToolResult {
                tool_call_id: "call_1".to_string(),
                name: "magic_calculator".to_string(),
                output: "345".to_string(),
                is_error: false,
            })?,
        ];

        let spec = messages_to_openai_spec(&messages);

        assert_eq!(spec.len(), 3);
        assert_eq!(spec[1]["role"], "assistant");
        assert!(spec[1].get("content").is_none());
        assert_eq!(spec[1]["tool_calls"][0]["id"], "call_1");
        assert_eq!(spec[1]["tool_calls"][0]["type"], "function");
        assert_eq!(
            spec[1]["tool_calls"][0]["function"]["arguments"],
            r#"{"expression":"15 * 23"}"#
        );
        assert_eq!(
            spec[2],
            json!({
                "role": "tool",
                "tool_call_id": "call_1",
                "name": "magic_calculator",
                "content": "345"
            })
        );
        Ok(())
    }

    #[test]
    fn test_tools_to_openai_spec() -> Result<()> {
        let tool = Tool::new("test_tool", "A test tool", json!({"type": "object"}), |_| {
            Ok(String::new())
        });

        let spec = tools_to_openai_spec(&[tool])?;

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["type"], "function");
        assert_eq!(spec[0]["function"]["name"], "test_tool");
        assert_eq!(spec[0]["function"]["parameters"]["type"], "object");
        Ok(())
    }

    #[test]
    fn test_tools_to_openai_spec_duplicate() {
        let make = || Tool::new("test_tool", "Test tool", json!({}), |_| Ok(String::new()));
        let result = tools_to_openai_spec(&[make(), make()]);
        assert_eq!(
            result.unwrap_err(),
            ExplorerError::DuplicateTool("test_tool".to_string())
        );
    }

    #[test]
    fn test_sanitize_function_name() {
        assert_eq!(sanitize_function_name("hello-world"), "hello-world");
        assert_eq!(sanitize_function_name("hello world"), "hello_world");
        assert_eq!(sanitize_function_name("hello@world"), "hello_world");
    }

    #[test]
    fn test_openai_response_to_message_text() -> Result<()> {
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": "Hello!"}}]
        });

        let message = openai_response_to_message(&response)?;
        assert_eq!(message.text(), "Hello!");
        assert_eq!(message.role, Role::Assistant);
        assert!(!message.has_tool_calls());
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_null_content() -> Result<()> {
        let response = json!({"choices": [{"message": {"role": "assistant", "content": null}}]});
        let message = openai_response_to_message(&response)?;
        assert_eq!(message.text(), "");
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_valid_tool_call() -> Result<()> {
        let response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        let message = openai_response_to_message(&response)?;

        assert!(!message.has_text());
        let calls = message.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].name, "magic_calculator");
        assert_eq!(calls[0].arguments, json!({"expression": "15 * 23"}));
        assert!(!calls[0].is_error);
        Ok(())
    }

    #[test]
    fn test_tool_calls_without_ids_get_distinct_ids() -> Result<()> {
        let response = json!({
            "choices": [{"message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [
                    {"type": "function", "function": {"name": "time_checker", "arguments": "{}"}},
                    {"id": "", "type": "function", "function": {"name": "time_checker", "arguments": "{}"}}
                ]
            }}]
        });
        let message = openai_response_to_message(&response)?;

        let calls = message.tool_calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].id.starts_with("call_"));
        assert!(calls[1].id.starts_with("call_"));
        assert_ne!(calls[0].id, calls[1].id);
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_empty_arguments() -> Result<()> {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        response["choices"][0]["message"]["tool_calls"][0]["function"] =
            json!({"name": "time_checker", "arguments": ""});

        let calls = openai_response_to_message(&response)?.tool_calls();
        assert_eq!(calls[0].arguments, json!({}));
        assert!(!calls[0].is_error);
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_invalid_func_name() -> Result<()> {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        response["choices"][0]["message"]["tool_calls"][0]["function"]["name"] =
            json!("invalid fn");

        let calls = openai_response_to_message(&response)?.tool_calls();
        assert_eq!(calls[0].name, "invalid fn");
        assert!(calls[0].is_error);
        assert!(calls[0]
            .error_message
            .as_deref()
            .unwrap_or_default()
            .starts_with("The provided function name"));
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_json_decode_error() -> Result<()> {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        response["choices"][0]["message"]["tool_calls"][0]["function"]["arguments"] =
            json!("invalid json {");

        let message = openai_response_to_message(&response)?;
        let calls = message.tool_calls();
        assert!(calls[0].is_error);
        assert!(calls[0]
            .error_message
            .as_deref()
            .unwrap_or_default()
            .starts_with("Could not interpret tool use parameters"));

        // the raw arguments go back to the model unchanged
        let spec = messages_to_openai_spec(&[message]);
        assert_eq!(spec[0]["tool_calls"][0]["function"]["arguments"], "invalid json {");
        Ok(())
    }

    #[test]
    fn test_openai_response_without_choices_is_malformed() {
        let err = openai_response_to_message(&json!({"choices": []})).unwrap_err();
        assert!(matches!(err, ExplorerError::MalformedResponse(_)));

        let err = openai_response_to_message(&json!({"choices": [{"message": "hi"}]})).unwrap_err();
        assert!(matches!(err, ExplorerError::MalformedResponse(_)));
    }

    #[test]
    fn test_get_usage() -> Result<()> {
        let response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        assert_eq!(get_usage(&response), Usage::new(Some(10), Some(25), Some(35)));
        assert_eq!(get_usage(&json!({})), Usage::default());
        Ok(())
    }

    #[test]
    fn test_openai_error() {
        let error = json!({
            "code": "context_length_exceeded",
            "message": "This message is too long"
        });
        assert_eq!(
            openai_error(&error).to_string(),
            "Input message too long. Message: This message is too long"
        );

        let error = json!({"code": 401, "message": "No auth credentials found"});
        assert_eq!(
            openai_error(&error),
            ExplorerError::Api("No auth credentials found".to_string())
        );
    }
}
