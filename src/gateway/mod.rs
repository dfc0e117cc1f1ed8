//! Tool invocation gateway for `goose-run`.
//!
//! Validates raw arguments, resolves credentials, hands the prompt to an
//! agent executor and shapes the outcome into a [`ToolResult`]. Every
//! failure becomes an error envelope; nothing is retried.

pub mod schema;
#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::agent::{AgentFactory, GitHubBinding, SessionOptions};
use crate::config::{CredentialSource, Credentials};
use crate::error::ToolError;
use crate::mcp::ToolResult;

pub use schema::{InputSchema, SchemaError, ValidatedInput};

pub const TOOL_NAME: &str = "goose-run";
pub const TOOL_DESCRIPTION: &str = "Run a goose agent";

/// Input schema of `goose-run`.
pub fn goose_run_schema() -> InputSchema {
    InputSchema::new()
        .required_string("name", "goose agent name")
        .required_string("prompt", "prompt to run")
        .string("instruction", "instruction to run")
        .required_string("repo", "repository to run")
}

/// A validated `goose-run` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRequest {
    pub name: String,
    pub prompt: String,
    pub instruction: Option<String>,
    pub repo: String,
}

impl ToolRequest {
    fn from_input(input: &ValidatedInput) -> Result<Self, SchemaError> {
        Ok(Self {
            name: input.required("name")?.to_string(),
            prompt: input.required("prompt")?.to_string(),
            instruction: input.get("instruction").map(str::to_string),
            repo: input.required("repo")?.to_string(),
        })
    }
}

pub struct Gateway {
    schema: InputSchema,
    factory: Arc<dyn AgentFactory>,
    credentials: Arc<dyn CredentialSource>,
    github_host: String,
}

impl Gateway {
    pub fn new(
        factory: Arc<dyn AgentFactory>,
        credentials: Arc<dyn CredentialSource>,
        github_host: impl Into<String>,
    ) -> Self {
        Self {
            schema: goose_run_schema(),
            factory,
            credentials,
            github_host: github_host.into(),
        }
    }

    pub fn schema(&self) -> &InputSchema {
        &self.schema
    }

    /// Run one `goose-run` call. Always returns an envelope.
    pub async fn invoke(&self, cancel: &CancellationToken, raw: &Value) -> ToolResult {
        match self.try_invoke(cancel, raw).await {
            Ok(text) => ToolResult::text(text),
            Err(err) => {
                warn!(error = %err, "goose-run failed");
                ToolResult::from(err)
            }
        }
    }

    async fn try_invoke(
        &self,
        cancel: &CancellationToken,
        raw: &Value,
    ) -> Result<String, ToolError> {
        let input = self.schema.validate(raw)?;
        let request = ToolRequest::from_input(&input)?;
        let credentials = Credentials::resolve(self.credentials.as_ref())?;

        let options = SessionOptions {
            session_id: request.name,
            instruction: request.instruction.unwrap_or_default(),
            github: GitHubBinding {
                host: self.github_host.clone(),
                repo: request.repo,
                token: credentials.github_token,
            },
            api_key: credentials.openrouter_api_key,
        };

        info!(
            session = %options.session_id,
            repo = %options.github.repo,
            "Delegating to agent"
        );

        let agent = self.factory.create(options)?;
        let data = agent.execute(cancel, &request.prompt).await?;

        debug!(bytes = data.len(), "Agent returned");
        Ok(String::from_utf8_lossy(&data).into_owned())
    }
}
