//! `start` command: wire config, agent factory and gateway into the MCP server.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use tracing::info;

use crate::agent::{GooseFactory, GooseSettings};
use crate::config::{Config, EnvSource};
use crate::error::Error;
use crate::gateway::Gateway;
use crate::mcp::GooseServer;

/// Agent backends. Only goose for now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AgentProvider {
    Goose,
}

impl AgentProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentProvider::Goose => "goose",
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct StartArgs {
    /// Agent type (e.g. chat, copilot)
    #[arg(long)]
    pub agent_type: Option<String>,

    /// Agent provider
    #[arg(long, value_enum)]
    pub agent_provider: Option<AgentProvider>,

    /// Directory holding per-session repository checkouts
    #[arg(long)]
    pub workspace_dir: Option<PathBuf>,

    /// Config file (defaults to ~/.agent-mcp/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl StartArgs {
    /// Load the config file and apply command-line overrides.
    pub fn load_config(&self) -> Result<Config, Error> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        Ok(self.apply(config))
    }

    fn apply(&self, mut config: Config) -> Config {
        if let Some(provider) = self.agent_provider {
            config.agent.provider = provider.as_str().to_string();
        }
        if let Some(dir) = &self.workspace_dir {
            config.agent.workspace_dir = dir.clone();
        }
        config
    }
}

/// Build the `goose-run` gateway for `config`.
pub fn build_gateway(config: &Config) -> Result<Gateway, Error> {
    if config.agent.provider != AgentProvider::Goose.as_str() {
        return Err(Error::UnsupportedProvider(config.agent.provider.clone()));
    }

    let factory = GooseFactory::new(GooseSettings::from(&config.agent));
    Ok(Gateway::new(
        Arc::new(factory),
        Arc::new(EnvSource),
        config.github.host.clone(),
    ))
}

/// Run the MCP server on stdio until EOF or Ctrl-C.
pub async fn run(config: Config, args: &StartArgs) -> Result<(), Error> {
    info!(
        agent_type = args.agent_type.as_deref().unwrap_or("default"),
        provider = %config.agent.provider,
        workspace = %config.agent.workspace_dir.display(),
        "Starting agent MCP server"
    );

    let gateway = build_gateway(&config)?;
    GooseServer::new(Arc::new(gateway)).serve_stdio().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> StartArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Some(Commands::Start(args)) => args,
            None => panic!("expected start command"),
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = parse(&[
            "agent-mcp-server",
            "start",
            "--agent-type=chat",
            "--agent-provider=goose",
            "--workspace-dir",
            "/tmp/ws",
        ]);
        assert_eq!(args.agent_type.as_deref(), Some("chat"));
        assert_eq!(args.agent_provider, Some(AgentProvider::Goose));
        assert_eq!(args.workspace_dir, Some(PathBuf::from("/tmp/ws")));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[agent]\nprovider = \"other\"\nworkspace_dir = \"/from/file\"\n",
        )
        .unwrap();

        let args = StartArgs {
            agent_provider: Some(AgentProvider::Goose),
            workspace_dir: Some(PathBuf::from("/from/flag")),
            config: Some(path),
            ..Default::default()
        };
        let config = args.load_config().unwrap();
        assert_eq!(config.agent.provider, "goose");
        assert_eq!(config.agent.workspace_dir, PathBuf::from("/from/flag"));
    }

    #[test]
    fn test_build_gateway() {
        let gateway = build_gateway(&Config::default()).unwrap();
        let tool = GooseServer::new(Arc::new(gateway)).tool();
        assert_eq!(tool.name, "goose-run");
    }

    #[test]
    fn test_build_gateway_unsupported_provider() {
        let mut config = Config::default();
        config.agent.provider = "codex".to_string();
        assert!(matches!(
            build_gateway(&config),
            Err(Error::UnsupportedProvider(p)) if p == "codex"
        ));
    }
}
