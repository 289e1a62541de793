//! CLI front door.
//!
//! Thin adapters over the core operations: each `run_*` function runs one
//! operation with the Go adapter and renders its report in the requested
//! format. The binary prints the returned string; the MCP server returns it
//! as the tool payload.
//!
//! ## Error Handling
//!
//! All functions return `Result<String, RefactorError>`. Rendering of errors
//! is left to the caller ([`render_error`]), since the CLI and MCP surfaces
//! deliver them differently.

use std::path::Path;

use clap::ValueEnum;

use goref_core::error::RefactorError;
use goref_core::ops::{self, RenameOptions};
use goref_core::output::{emit_response, ErrorResponse, ListRefsResponse, RenameResponse};
use goref_go::GoAdapter;
use serde::Serialize;

/// Output format for reports and errors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text: `path:line:col` lines, or the rename summary.
    #[default]
    Text,
    /// JSON envelope with `status` and `schema_version`.
    Json,
}

fn to_json<T: Serialize>(response: &T) -> Result<String, RefactorError> {
    let mut buf = Vec::new();
    emit_response(response, &mut buf)
        .map_err(|e| RefactorError::internal(format!("failed to serialize response: {}", e)))?;
    String::from_utf8(buf).map_err(|e| RefactorError::internal(e.to_string()))
}

/// List every reference to `symbol` declared in `file`.
pub fn run_list_refs(file: &Path, symbol: &str, format: OutputFormat) -> Result<String, RefactorError> {
    let report = ops::list_refs(&GoAdapter::new(), file, symbol)?;
    match format {
        OutputFormat::Text => Ok(report.render_text()),
        OutputFormat::Json => to_json(&ListRefsResponse::new(&report)),
    }
}

/// Rename `old_symbol` declared in `file` to `new_symbol` across the module.
pub fn run_rename(
    file: &Path,
    old_symbol: &str,
    new_symbol: &str,
    options: RenameOptions,
    format: OutputFormat,
) -> Result<String, RefactorError> {
    let report = ops::rename(&GoAdapter::new(), file, old_symbol, new_symbol, options)?;
    match format {
        OutputFormat::Text => Ok(report.render_text()),
        OutputFormat::Json => to_json(&RenameResponse::new(&report)),
    }
}

/// Render an error: a one-line diagnostic, or the JSON error envelope.
pub fn render_error(err: &RefactorError, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format!("Error: {}\n", err),
        OutputFormat::Json => to_json(&ErrorResponse::from_error(err))
            .unwrap_or_else(|_| format!("Error: {}\n", err)),
    }
}
