//! MCP (Model Context Protocol) server for AI tools.
//!
//! Served over stdio with rmcp.

pub mod server;
pub mod tools;

pub use server::GooseServer;
pub use tools::{ToolContent, ToolResult};
