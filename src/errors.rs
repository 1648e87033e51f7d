use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExplorerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Input message too long. Message: {0}")]
    ContextLengthExceeded(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Invalid conversation: {0}")]
    InvalidConversation(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    #[error("Tool execution failed: {0}")]
    ToolExecution(String),
}

pub type ExplorerResult<T> = Result<T, ExplorerError>;

impl From<reqwest::Error> for ExplorerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ExplorerError::MalformedResponse(err.to_string())
        } else {
            ExplorerError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ExplorerError {
    fn from(err: serde_json::Error) -> Self {
        ExplorerError::MalformedResponse(err.to_string())
    }
}
