//! Agent MCP server library.
//!
//! Serves the `goose-run` tool over the Model Context Protocol.

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod mcp;

pub use error::Error;
