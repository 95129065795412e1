//! Structured errors for the smartnav server.
//!
//! Tool failures that have no counterpart in the core error type.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Structured errors raised by tool handlers.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Invalid input parameters (e.g., empty store name).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Neither the network nor any cache store answered.
    #[error("NO_RESPONSE: {0}")]
    NoResponse(String),

    /// Output could not be serialized.
    #[error("INTERNAL: {0}")]
    Serialize(String),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let (code, message) = match &err {
            ToolError::InvalidInput(msg) => (-32602, msg.clone()),
            ToolError::NoResponse(msg) => (-32007, format!("no response for {msg}")),
            ToolError::Serialize(msg) => (-32603, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::Serialize(err.to_string())
    }
}
