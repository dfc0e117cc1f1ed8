//! Agent execution.
//!
//! The gateway only sees [`AgentFactory`] and [`AgentExecutor`]; what runs
//! behind them (model selection, tool use, retries) is opaque to it.

pub mod goose;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use goose::{GooseAgent, GooseFactory, GooseSettings};

/// Errors raised while building or running an agent.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("invalid session: {0}")]
    InvalidSession(String),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("clone of {repo} failed: {stderr}")]
    Clone { repo: String, stderr: String },

    #[error("agent exited with {status}: {stderr}")]
    Exited { status: String, stderr: String },

    #[error("cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Repository an agent session works against.
#[derive(Clone, PartialEq, Eq)]
pub struct GitHubBinding {
    /// Host endpoint, e.g. `https://github.com`.
    pub host: String,
    /// Repository identifier, `owner/name`.
    pub repo: String,
    pub token: String,
}

impl fmt::Debug for GitHubBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubBinding")
            .field("host", &self.host)
            .field("repo", &self.repo)
            .field("token", &"***")
            .finish()
    }
}

/// Everything needed to build an executor for one session.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub session_id: String,
    /// Supplementary guidance; empty when the caller gave none.
    pub instruction: String,
    pub github: GitHubBinding,
    /// Key for the model routing provider.
    pub api_key: String,
}

impl fmt::Debug for SessionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionOptions")
            .field("session_id", &self.session_id)
            .field("instruction", &self.instruction)
            .field("github", &self.github)
            .field("api_key", &"***")
            .finish()
    }
}

/// Runs a single task for a session.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    /// Run `prompt` to completion and return the agent's raw output.
    ///
    /// Implementations must stop and return [`AgentError::Cancelled`] once
    /// `cancel` fires.
    async fn execute(&self, cancel: &CancellationToken, prompt: &str)
        -> Result<Vec<u8>, AgentError>;
}

/// Builds an executor bound to one session.
pub trait AgentFactory: Send + Sync {
    fn create(&self, options: SessionOptions) -> Result<Box<dyn AgentExecutor>, AgentError>;
}
