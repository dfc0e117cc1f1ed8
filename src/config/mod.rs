//! Server configuration.
//!
//! Handles loading `~/.agent-mcp/config.toml`. Credentials are not part of
//! the file; see [`credentials`].

pub mod credentials;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub use credentials::{
    Credentials, CredentialSource, EnvSource, MissingCredential, GITHUB_TOKEN_VAR,
    OPENROUTER_API_KEY_VAR,
};

/// Default GitHub endpoint that repositories are cloned from.
pub const GITHUB_HOST: &str = "https://github.com";

/// Global server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Agent execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Agent backend. Only `goose` is supported.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Path or name of the goose executable.
    #[serde(default = "default_goose_bin")]
    pub goose_bin: String,

    /// LLM provider goose routes requests through.
    #[serde(default = "default_goose_provider")]
    pub goose_provider: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Directory holding one checkout per session.
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            goose_bin: default_goose_bin(),
            goose_provider: default_goose_provider(),
            model: None,
            workspace_dir: default_workspace_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_github_host")]
    pub host: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            host: default_github_host(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_provider() -> String {
    "goose".to_string()
}

fn default_goose_bin() -> String {
    "goose".to_string()
}

fn default_goose_provider() -> String {
    "openrouter".to_string()
}

fn default_workspace_dir() -> PathBuf {
    Config::global_dir().join("sessions")
}

fn default_github_host() -> String {
    GITHUB_HOST.to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load config from ~/.agent-mcp/config.toml
    pub fn load() -> Result<Self, Error> {
        Self::load_from(&Self::path())
    }

    /// Load config from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Path to global config directory (~/.agent-mcp/)
    pub fn global_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".agent-mcp")
    }

    /// Path to config file
    pub fn path() -> PathBuf {
        Self::global_dir().join("config.toml")
    }
}
