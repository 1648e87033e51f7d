use serde_json::Value;
use std::fmt::Debug;

/// The callable behind a tool: JSON arguments in, text out.
pub type ToolFunction = Box<dyn Fn(&Value) -> anyhow::Result<String> + Send + Sync>;

/// A tool that can be used by a model.
pub struct Tool {
    /// The name of the tool
    pub name: String,
    /// A description of what the tool does
    pub description: String,
    /// A json schema of the function signature
    pub parameters: Value,
    /// The function that powers the tool
    pub function: ToolFunction,
}

impl Tool {
    pub fn new<N, D>(
        name: N,
        description: D,
        parameters: Value,
        function: impl Fn(&Value) -> anyhow::Result<String> + Send + Sync + 'static,
    ) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Tool {
            name: name.into(),
            description: description.into(),
            parameters,
            function: Box::new(function),
        }
    }

    pub fn call(&self, arguments: &Value) -> anyhow::Result<String> {
        (self.function)(arguments)
    }
}

impl Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .field("function", &"<function>")
            .finish()
    }
}
