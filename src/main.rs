//! agent-mcp-server - MCP server that runs coding agents against repositories.

use clap::{CommandFactory, Parser};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agent_mcp_server::cli::{self, Cli, Commands};
use agent_mcp_server::Error;

/// Log to stderr; stdout carries the MCP transport.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("agent_mcp_server={}", level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            // Show help when no command provided
            Cli::command().print_help()?;
            println!();
        }
        Some(Commands::Start(args)) => {
            let config = args.load_config()?;
            init_logging(&config.server.log_level);
            cli::start::run(config, &args).await?;
        }
    }

    Ok(())
}
