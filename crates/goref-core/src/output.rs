//! Report types and rendering for CLI and MCP responses.
//!
//! Every operation has two renderings:
//!
//! - **Text**: the line formats consumed by people and scripts
//!   (`path:line:col` per reference; `Renamed 'Old' -> 'New' in:` followed by
//!   `- path (N occurrences)` per file).
//! - **JSON**: a versioned envelope with `status` first, matching across
//!   success and error responses.

use std::io::{self, Write};

use serde::Serialize;

use crate::error::{OutputErrorCode, RefactorError};
use crate::facts::{FactsStore, Symbol};
use crate::refs::ReferenceLocation;
use crate::rewrite::{FileRewrite, RewriteResult};

/// Current schema version for all JSON responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Shared Types
// ============================================================================

/// Summary of a resolved declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolInfo {
    /// Stable within one invocation only.
    pub id: String,
    pub name: String,
    pub kind: String,
    /// Owning type for methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub file: String,
    pub line: u32,
    pub col: u32,
}

impl SymbolInfo {
    /// Build from a declaration of `store`.
    pub fn from_symbol(store: &FactsStore, symbol: &Symbol) -> Self {
        let file = store
            .file(symbol.decl_file_id)
            .map(|f| f.rel_path.clone())
            .unwrap_or_default();
        SymbolInfo {
            id: symbol.symbol_id.to_string(),
            name: symbol.name.clone(),
            kind: symbol.kind.to_string(),
            owner: symbol.owner_type_name().map(str::to_string),
            file,
            line: symbol.decl_pos.line,
            col: symbol.decl_pos.col,
        }
    }
}

// ============================================================================
// list-refs
// ============================================================================

/// Result of `list-refs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRefsReport {
    pub symbol: SymbolInfo,
    pub references: Vec<ReferenceLocation>,
}

impl ListRefsReport {
    /// One `path:line:col` line per reference.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for reference in &self.references {
            out.push_str(&reference.render());
            out.push('\n');
        }
        out
    }
}

/// JSON envelope for `list-refs`.
#[derive(Debug, Clone, Serialize)]
pub struct ListRefsResponse<'a> {
    pub status: &'static str,
    pub schema_version: &'static str,
    pub symbol: &'a SymbolInfo,
    pub references: &'a [ReferenceLocation],
    pub count: usize,
}

impl<'a> ListRefsResponse<'a> {
    pub fn new(report: &'a ListRefsReport) -> Self {
        ListRefsResponse {
            status: "ok",
            schema_version: SCHEMA_VERSION,
            symbol: &report.symbol,
            references: &report.references,
            count: report.references.len(),
        }
    }
}

// ============================================================================
// rename
// ============================================================================

/// Result of `rename`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameReport {
    /// Old symbol as the caller spelled it.
    pub old_symbol: String,
    /// New symbol as the caller spelled it.
    pub new_symbol: String,
    /// Bare name written into the files.
    pub new_name: String,
    pub symbol: SymbolInfo,
    pub result: RewriteResult,
}

impl RenameReport {
    /// Header line plus one line per rewritten file.
    pub fn render_text(&self) -> String {
        let mut out = format!(
            "Renamed '{}' -> '{}' in:\n",
            self.old_symbol, self.new_symbol
        );
        for file in &self.result.files {
            out.push_str(&format!("- {} ({} occurrences)\n", file.file, file.count));
        }
        out
    }
}

/// JSON envelope for `rename`.
#[derive(Debug, Clone, Serialize)]
pub struct RenameResponse<'a> {
    pub status: &'static str,
    pub schema_version: &'static str,
    pub old_symbol: &'a str,
    pub new_symbol: &'a str,
    pub new_name: &'a str,
    pub symbol: &'a SymbolInfo,
    pub files: &'a [FileRewrite],
    pub total: usize,
}

impl<'a> RenameResponse<'a> {
    pub fn new(report: &'a RenameReport) -> Self {
        RenameResponse {
            status: "ok",
            schema_version: SCHEMA_VERSION,
            old_symbol: &report.old_symbol,
            new_symbol: &report.new_symbol,
            new_name: &report.new_name,
            symbol: &report.symbol,
            files: &report.result.files,
            total: report.result.total(),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error details for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Numeric error code, same as the CLI exit code.
    pub code: u8,
    /// Stable error kind name.
    pub kind: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    pub fn from_error(err: &RefactorError) -> Self {
        let details = match err {
            RefactorError::AmbiguousSymbol { count, .. } => {
                Some(serde_json::json!({ "matches": count }))
            }
            RefactorError::Io { path, written, .. } => Some(serde_json::json!({
                "path": path.display().to_string(),
                "written": written,
            })),
            _ => None,
        };
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            kind: err.kind(),
            message: err.to_string(),
            details,
        }
    }
}

/// JSON envelope for any failed operation.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub schema_version: &'static str,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &RefactorError) -> Self {
        ErrorResponse {
            status: "error",
            schema_version: SCHEMA_VERSION,
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::ContentHash;
    use std::path::PathBuf;

    fn symbol_info() -> SymbolInfo {
        SymbolInfo {
            id: "sym_0".to_string(),
            name: "Greet".to_string(),
            kind: "function".to_string(),
            owner: None,
            file: "a.go".to_string(),
            line: 3,
            col: 6,
        }
    }

    fn file_rewrite(file: &str, count: usize) -> FileRewrite {
        FileRewrite {
            file: file.to_string(),
            count,
            skipped: 0,
            before_hash: ContentHash::compute(b"before"),
            after_hash: ContentHash::compute(b"after"),
        }
    }

    fn rename_report() -> RenameReport {
        RenameReport {
            old_symbol: "Greet".to_string(),
            new_symbol: "Hello".to_string(),
            new_name: "Hello".to_string(),
            symbol: symbol_info(),
            result: RewriteResult {
                files: vec![file_rewrite("a.go", 1), file_rewrite("b.go", 2)],
            },
        }
    }

    mod text {
        use super::*;

        #[test]
        fn list_refs_lines() {
            let report = ListRefsReport {
                symbol: symbol_info(),
                references: vec![
                    ReferenceLocation {
                        file: "b.go".to_string(),
                        line: 4,
                        col: 2,
                    },
                    ReferenceLocation {
                        file: "b.go".to_string(),
                        line: 5,
                        col: 2,
                    },
                ],
            };
            assert_eq!(report.render_text(), "b.go:4:2\nb.go:5:2\n");
        }

        #[test]
        fn list_refs_empty() {
            let report = ListRefsReport {
                symbol: symbol_info(),
                references: vec![],
            };
            assert_eq!(report.render_text(), "");
        }

        #[test]
        fn rename_summary() {
            assert_eq!(
                rename_report().render_text(),
                "Renamed 'Greet' -> 'Hello' in:\n- a.go (1 occurrences)\n- b.go (2 occurrences)\n"
            );
        }
    }

    mod json {
        use super::*;

        #[test]
        fn rename_envelope() {
            let report = rename_report();
            let value = serde_json::to_value(RenameResponse::new(&report)).unwrap();
            assert_eq!(value["status"], "ok");
            assert_eq!(value["schema_version"], SCHEMA_VERSION);
            assert_eq!(value["total"], 3);
            assert_eq!(value["files"][1]["file"], "b.go");
            assert_eq!(
                value["files"][0]["after_hash"],
                ContentHash::compute(b"after").0
            );
        }

        #[test]
        fn owner_omitted_for_functions() {
            let json = serde_json::to_string(&symbol_info()).unwrap();
            assert!(!json.contains("owner"));
        }

        #[test]
        fn error_envelope() {
            let err = RefactorError::AmbiguousSymbol {
                symbol: "x".to_string(),
                count: 2,
            };
            let value = serde_json::to_value(ErrorResponse::from_error(&err)).unwrap();
            assert_eq!(value["status"], "error");
            assert_eq!(value["error"]["code"], 3);
            assert_eq!(value["error"]["kind"], "ambiguous");
            assert_eq!(value["error"]["details"]["matches"], 2);
        }

        #[test]
        fn io_error_details_list_written_files() {
            let err = RefactorError::Io {
                op: "write",
                path: PathBuf::from("/w/b.go"),
                message: "denied".to_string(),
                written: vec!["a.go".to_string()],
            };
            let info = ErrorInfo::from_error(&err);
            assert_eq!(info.code, 4);
            let details = info.details.unwrap();
            assert_eq!(details["written"][0], "a.go");
        }

        #[test]
        fn emit_writes_trailing_newline() {
            let report = rename_report();
            let mut buf = Vec::new();
            emit_response(&RenameResponse::new(&report), &mut buf).unwrap();
            let text = String::from_utf8(buf).unwrap();
            assert!(text.ends_with("}\n"));
            assert!(text.starts_with("{\n  \"status\": \"ok\""));
        }
    }
}
