//! CLI commands for the agent MCP server.

pub mod start;

use clap::{Parser, Subcommand};

/// agent-mcp-server - MCP server that runs coding agents against repositories
#[derive(Parser)]
#[command(name = "agent-mcp-server")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the MCP server with the specified agent type
    ///
    /// Serves the `goose-run` tool over stdio. Requires OPENROUTER_API_KEY
    /// and GITHUB_TOKEN in the environment at call time.
    ///
    /// Example:
    ///   agent-mcp-server start --agent-type=chat --agent-provider=goose
    Start(start::StartArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["agent-mcp-server"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(Cli::try_parse_from(["agent-mcp-server", "start", "--agent-provider", "codex"])
            .is_err());
    }
}
