//! Error types for the agent MCP server.

use thiserror::Error;

use crate::agent::AgentError;
use crate::config::MissingCredential;
use crate::gateway::SchemaError;

/// Server error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Unsupported agent provider: {0}")]
    UnsupportedProvider(String),

    #[error("MCP transport error: {0}")]
    Mcp(String),
}

/// Failure of a single tool invocation.
///
/// Never escapes the gateway: every variant is rendered into a failure
/// envelope by `ToolResult::from`.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("invalid input: {0}")]
    Validation(#[from] SchemaError),

    #[error("{0}")]
    Configuration(#[from] MissingCredential),

    #[error("failed to run goose agent: {0}")]
    Delegation(#[from] AgentError),
}
