//! MCP server front door for agent integration.
//!
//! Exposes `list-refs` and `rename` as MCP tools over stdio. Both tools take
//! an absolute file path and return the same text the CLI prints; failures
//! come back as tool errors carrying the one-line diagnostic.
//!
//! Tool calls are serialized: a rename rewrites files that a concurrent
//! `list-refs` could be reading.

#![cfg(feature = "mcp")]

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::cli::{run_list_refs, run_rename, OutputFormat};
use goref_core::error::RefactorError;
use goref_core::ops::RenameOptions;

/// Name reported in `initialize`.
pub const SERVER_NAME: &str = "go-refactor-mcp-server";

const INSTRUCTIONS: &str = "This is an MCP server for refactoring in Go language.
This server provides tools to list symbols (such as structs and functions) within a Go module and rename them.
The following tools are available:
- list-refs: Search for all references to a specified symbol and obtain a list.
- rename: Rename a specified symbol.";

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the list-refs tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListRefsParams {
    /// Absolute path of the file declaring the symbol.
    #[schemars(description = "Absolute path of the file where the symbol is defined")]
    pub file: String,

    /// Symbol name, optionally `Type.Member`.
    #[schemars(description = "Symbol name to search for, e.g. Greet or Server.Start")]
    pub symbol: String,
}

/// Parameters for the rename tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RenameParams {
    /// Absolute path of the file declaring the symbol.
    #[schemars(description = "Absolute path of the file where the symbol is defined")]
    pub file: String,

    #[schemars(description = "Current symbol name, e.g. Greet or Server.Start")]
    #[serde(rename = "oldSymbol")]
    pub old_symbol: String,

    #[schemars(description = "New symbol name")]
    #[serde(rename = "newSymbol")]
    pub new_symbol: String,
}

// ============================================================================
// MCP Server
// ============================================================================

/// MCP server for goref operations.
#[derive(Clone)]
pub struct GorefServer {
    tool_router: ToolRouter<Self>,
    /// Held for the duration of every tool call.
    lock: Arc<Mutex<()>>,
    version: String,
}

#[tool_router]
impl GorefServer {
    /// Create a server reporting the crate version.
    pub fn new() -> Self {
        Self::with_version(env!("CARGO_PKG_VERSION"))
    }

    /// Create a server reporting `version` in `initialize`.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            lock: Arc::new(Mutex::new(())),
            version: version.into(),
        }
    }

    #[tool(
        name = "list-refs",
        description = "List all references to a symbol (function, type, variable, constant, field or method) declared in the given Go file. Returns one path:line:col per line, paths relative to the module root."
    )]
    async fn list_refs(
        &self,
        Parameters(params): Parameters<ListRefsParams>,
    ) -> Result<CallToolResult, McpError> {
        let _guard = self.lock.lock().await;
        debug!(file = %params.file, symbol = %params.symbol, "list-refs called");
        let result = run_list_refs(&PathBuf::from(&params.file), &params.symbol, OutputFormat::Text);
        Ok(into_tool_result(result))
    }

    #[tool(
        name = "rename",
        description = "Rename a symbol declared in the given Go file and every reference to it across the module. Fails without modifying files if the new name is invalid or collides with an existing declaration."
    )]
    async fn rename(
        &self,
        Parameters(params): Parameters<RenameParams>,
    ) -> Result<CallToolResult, McpError> {
        let _guard = self.lock.lock().await;
        debug!(
            file = %params.file,
            old = %params.old_symbol,
            new = %params.new_symbol,
            "rename called"
        );
        let result = run_rename(
            &PathBuf::from(&params.file),
            &params.old_symbol,
            &params.new_symbol,
            RenameOptions::default(),
            OutputFormat::Text,
        );
        Ok(into_tool_result(result))
    }
}

/// Operation failures are tool errors, not protocol errors.
fn into_tool_result(result: Result<String, RefactorError>) -> CallToolResult {
    match result {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(err) => {
            debug!(kind = err.kind(), "tool call failed: {}", err);
            CallToolResult::error(vec![Content::text(err.to_string())])
        }
    }
}

impl Default for GorefServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for GorefServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: self.version.clone(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}

/// Run the MCP server over stdio until the client disconnects.
pub async fn run_mcp_server(version: &str) -> Result<(), RefactorError> {
    info!(version, "starting MCP server on stdio");
    let server = GorefServer::with_version(version);
    let service = server
        .serve(stdio())
        .await
        .map_err(|e| RefactorError::internal(format!("MCP server failed to start: {}", e)))?;

    service
        .waiting()
        .await
        .map_err(|e| RefactorError::internal(format!("MCP server error: {}", e)))?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn greet_module() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("go.mod"), "module example.com/greet\n").unwrap();
        fs::write(temp.path().join("a.go"), "package main\n\nfunc Greet() {}\n").unwrap();
        fs::write(
            temp.path().join("b.go"),
            "package main\n\nfunc main() {\n\tGreet()\n}\n",
        )
        .unwrap();
        temp
    }

    fn extract_text_from_result(result: &CallToolResult) -> Option<String> {
        result.content.first().and_then(|content| {
            serde_json::to_value(content)
                .ok()
                .and_then(|v| v.get("text").and_then(|t| t.as_str()).map(String::from))
        })
    }

    mod info {
        use super::*;

        #[test]
        fn identity_and_capabilities() {
            let info = GorefServer::new().get_info();
            assert_eq!(info.server_info.name, "go-refactor-mcp-server");
            assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
            assert!(info.capabilities.tools.is_some());
            assert_eq!(info.protocol_version, ProtocolVersion::V_2024_11_05);
        }

        #[test]
        fn custom_version() {
            let info = GorefServer::with_version("9.9.9").get_info();
            assert_eq!(info.server_info.version, "9.9.9");
        }

        #[test]
        fn instructions_name_both_tools() {
            let instructions = GorefServer::default().get_info().instructions.unwrap();
            assert!(instructions.contains("- list-refs:"));
            assert!(instructions.contains("- rename:"));
        }

        #[test]
        fn tool_names() {
            let server = GorefServer::new();
            let tools = server.tool_router.list_all();
            let mut names: Vec<&str> = tools.iter().map(|t| &*t.name).collect();
            names.sort_unstable();
            assert_eq!(names, vec!["list-refs", "rename"]);
            for tool in &tools {
                assert!(tool.description.as_ref().is_some_and(|d| !d.is_empty()));
            }
        }

        #[test]
        fn rename_params_use_camel_case_keys() {
            let params: RenameParams = serde_json::from_value(serde_json::json!({
                "file": "/tmp/a.go",
                "oldSymbol": "Greet",
                "newSymbol": "Hello",
            }))
            .unwrap();
            assert_eq!(params.old_symbol, "Greet");
            assert_eq!(params.new_symbol, "Hello");
        }
    }

    mod tools {
        use super::*;

        #[test]
        fn list_refs_returns_locations() {
            let temp = greet_module();
            let server = GorefServer::new();
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let params = Parameters(ListRefsParams {
                    file: temp.path().join("a.go").display().to_string(),
                    symbol: "Greet".to_string(),
                });
                let result = server.list_refs(params).await.unwrap();
                assert_ne!(result.is_error, Some(true));
                assert_eq!(extract_text_from_result(&result).unwrap(), "b.go:4:2\n");
            });
        }

        #[test]
        fn rename_rewrites_files() {
            let temp = greet_module();
            let server = GorefServer::new();
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let params = Parameters(RenameParams {
                    file: temp.path().join("a.go").display().to_string(),
                    old_symbol: "Greet".to_string(),
                    new_symbol: "Hello".to_string(),
                });
                let result = server.rename(params).await.unwrap();
                let text = extract_text_from_result(&result).unwrap();
                assert!(text.starts_with("Renamed 'Greet' -> 'Hello' in:\n"));
            });
            let b = fs::read_to_string(temp.path().join("b.go")).unwrap();
            assert!(b.contains("\tHello()\n"));
        }

        #[test]
        fn failures_are_tool_errors() {
            let temp = greet_module();
            let server = GorefServer::new();
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let params = Parameters(ListRefsParams {
                    file: temp.path().join("a.go").display().to_string(),
                    symbol: "Missing".to_string(),
                });
                let result = server.list_refs(params).await.unwrap();
                assert_eq!(result.is_error, Some(true));
                let text = extract_text_from_result(&result).unwrap();
                assert!(text.starts_with("symbol Missing not found in file"));
            });
        }
    }
}
