use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;

use super::{calculator_tool, time_checker_tool};
use crate::errors::{ExplorerError, ExplorerResult};
use crate::providers::types::content::{ToolCallRequest, ToolResult};
use crate::providers::types::tool::Tool;
use crate::providers::utils::tools_to_openai_spec;

/// The tools a model may call, in registration order.
///
/// Invoking a tool never fails from the caller's point of view: unknown
/// names, tool errors and panics all come back as error text, so one bad
/// tool degrades a conversation instead of ending it.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `magic_calculator` and `time_checker`.
    pub fn with_default_tools() -> Self {
        Self {
            tools: vec![calculator_tool(), time_checker_tool()],
        }
    }

    pub fn register(&mut self, tool: Tool) -> ExplorerResult<()> {
        if self.tools.iter().any(|existing| existing.name == tool.name) {
            return Err(ExplorerError::DuplicateTool(tool.name));
        }
        self.tools.push(tool);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> ExplorerResult<&Tool> {
        self.tools
            .iter()
            .find(|tool| tool.name == name)
            .ok_or_else(|| ExplorerError::ToolNotFound(name.to_string()))
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Schemas as advertised to the model.
    pub fn list_schemas(&self) -> ExplorerResult<Vec<Value>> {
        tools_to_openai_spec(&self.tools)
    }

    /// Run a tool by name; failures are returned as text.
    pub fn invoke(&self, name: &str, arguments: &Value) -> String {
        self.try_invoke(name, arguments)
            .unwrap_or_else(|e| e.to_string())
    }

    /// Answer one model-issued tool call.
    pub fn dispatch(&self, call: &ToolCallRequest) -> ToolResult {
        let outcome = if call.is_error {
            Err(ExplorerError::ToolExecution(
                call.error_message
                    .clone()
                    .unwrap_or_else(|| format!("malformed call to '{}'", call.name)),
            ))
        } else {
            self.try_invoke(&call.name, &call.arguments)
        };

        let (output, is_error) = match outcome {
            Ok(output) => (output, false),
            Err(e) => {
                tracing::warn!(tool = %call.name, id = %call.id, error = %e, "tool call failed");
                (e.to_string(), true)
            }
        };

        ToolResult {
            tool_call_id: call.id.clone(),
            name: call.name.clone(),
            output,
            is_error,
        }
    }

    fn try_invoke(&self, name: &str, arguments: &Value) -> ExplorerResult<String> {
        let tool = self.lookup(name)?;
        match panic::catch_unwind(AssertUnwindSafe(|| tool.call(arguments))) {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(ExplorerError::ToolExecution(format!("{}: {}", name, e))),
            Err(payload) => Err(ExplorerError::ToolExecution(format!(
                "{} panicked: {}",
                name,
                panic_message(payload.as_ref())
            ))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
