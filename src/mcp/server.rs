//! MCP server exposing the `goose-run` gateway.
//!
//! Framing, the initialize handshake and request dispatch are rmcp's. Each
//! `tools/call` runs with the request's own cancellation token, so a client
//! cancel or a closed transport stops the agent run.

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, JsonObject, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::transport::stdio;
use rmcp::{ErrorData, RoleServer, ServerHandler, ServiceExt};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::Error;
use crate::gateway::{Gateway, TOOL_DESCRIPTION, TOOL_NAME};

const SERVER_NAME: &str = "agent-mcp-server";

#[derive(Clone)]
pub struct GooseServer {
    gateway: Arc<Gateway>,
}

impl GooseServer {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// The `goose-run` tool as listed by `tools/list`.
    pub fn tool(&self) -> Tool {
        let schema = match self.gateway.schema().to_json() {
            Value::Object(map) => map,
            _ => JsonObject::new(),
        };
        Tool::new(TOOL_NAME, TOOL_DESCRIPTION, Arc::new(schema))
    }

    /// Dispatch one tool call. Unknown tools are a protocol error; anything
    /// the gateway reports comes back as an envelope.
    pub async fn call(
        &self,
        cancel: &CancellationToken,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, ErrorData> {
        if name != TOOL_NAME {
            return Err(ErrorData::invalid_params(
                format!("Unknown tool: {}", name),
                None,
            ));
        }
        let arguments = Value::Object(arguments.unwrap_or_default());
        Ok(self.gateway.invoke(cancel, &arguments).await.into())
    }

    /// Serve on stdin/stdout until the client disconnects or Ctrl-C.
    pub async fn serve_stdio(self) -> Result<(), Error> {
        let service = self
            .serve(stdio())
            .await
            .inspect_err(|e| error!(error = %e, "MCP initialization failed"))
            .map_err(|e| Error::Mcp(e.to_string()))?;
        info!("MCP server ready");

        tokio::select! {
            quit = service.waiting() => {
                quit?;
                info!("Client disconnected");
            }
            _ = tokio::signal::ctrl_c() => info!("Interrupted, shutting down"),
        }
        Ok(())
    }
}

impl ServerHandler for GooseServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Use goose-run to run a goose agent against a GitHub repository.".to_string(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(vec![self.tool()]))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        debug!(tool = %request.name, "tools/call");
        self.call(&context.ct, &request.name, request.arguments).await
    }
}
