//! Error types and error code constants for goref.
//!
//! This module provides a unified error type (`RefactorError`) that bridges
//! the domain-specific errors of each subsystem (root location, model
//! loading, resolution, validation, rewriting) into a common format suitable
//! for text diagnostics, JSON output, and MCP tool results.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments (malformed symbol spec or new name)
//! - `3`: Resolution errors (root not found, file not in program, symbol
//!   not found, ambiguous symbol)
//! - `4`: Apply errors (name conflict, no occurrences, file I/O)
//! - `5`: Analysis errors (semantic model could not be loaded)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::resolve::ResolveError;
use crate::rewrite::RewriteError;
use crate::validate::ValidationError;
use crate::workspace::LocateError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable error codes, used as CLI exit codes and in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (root, file, or symbol could not be resolved).
    ResolutionError = 3,
    /// Apply errors (unsafe rename or failed to write changes).
    ApplyError = 4,
    /// The program could not be analyzed.
    AnalysisError = 5,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for every goref operation.
///
/// Each variant corresponds to one error kind a caller must be able to
/// distinguish. The `Display` text is the single-line diagnostic shown by the
/// CLI and returned as the MCP tool error payload.
#[derive(Debug, Error)]
pub enum RefactorError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// No program-root marker above the given file.
    #[error("{marker} not found, cannot determine module root for {file}")]
    RootNotFound { file: PathBuf, marker: String },

    /// The semantic model could not be built.
    #[error("failed to load packages: {message}")]
    LoadError { message: String },

    /// The given file is not part of any loaded package.
    #[error("file {file} not part of module packages")]
    FileNotInProgram { file: PathBuf },

    /// The symbol spec matched nothing in the target file.
    #[error("symbol {symbol} not found in file {file}")]
    SymbolNotFound { symbol: String, file: PathBuf },

    /// The symbol spec matched more than one declaration.
    #[error("symbol {symbol} is ambiguous ({count} matches)")]
    AmbiguousSymbol { symbol: String, count: usize },

    /// The new name is already owned by a distinct declaration in scope.
    #[error("new symbol name {name} conflicts with existing symbol")]
    Conflict { name: String },

    /// Resolution succeeded but nothing was rewritten.
    #[error("no occurrences of symbol {symbol} found")]
    NoOccurrences { symbol: String },

    /// A file could not be read or written while rewriting.
    ///
    /// `written` lists the files already rewritten before the failure.
    #[error("failed to {op} {path}: {message}{}", partial_note(.written))]
    Io {
        op: &'static str,
        path: PathBuf,
        message: String,
        written: Vec<String>,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

fn partial_note(written: &[String]) -> String {
    if written.is_empty() {
        String::new()
    } else {
        format!(
            " (partial rename: already rewritten {})",
            written.join(", ")
        )
    }
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&RefactorError> for OutputErrorCode {
    fn from(err: &RefactorError) -> Self {
        match err {
            RefactorError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            RefactorError::RootNotFound { .. } => OutputErrorCode::ResolutionError,
            RefactorError::FileNotInProgram { .. } => OutputErrorCode::ResolutionError,
            RefactorError::SymbolNotFound { .. } => OutputErrorCode::ResolutionError,
            RefactorError::AmbiguousSymbol { .. } => OutputErrorCode::ResolutionError,
            RefactorError::Conflict { .. } => OutputErrorCode::ApplyError,
            RefactorError::NoOccurrences { .. } => OutputErrorCode::ApplyError,
            RefactorError::Io { .. } => OutputErrorCode::ApplyError,
            RefactorError::LoadError { .. } => OutputErrorCode::AnalysisError,
            RefactorError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<RefactorError> for OutputErrorCode {
    fn from(err: RefactorError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridges: subsystem errors -> RefactorError
// ============================================================================

impl From<LocateError> for RefactorError {
    fn from(err: LocateError) -> Self {
        match err {
            LocateError::RootNotFound { file, marker } => {
                RefactorError::RootNotFound { file, marker }
            }
            LocateError::Io { path, source } => RefactorError::InvalidArguments {
                message: format!("cannot access {}: {}", path.display(), source),
            },
        }
    }
}

impl From<ValidationError> for RefactorError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Conflict { name } => RefactorError::Conflict { name },
            other => RefactorError::InvalidArguments {
                message: other.to_string(),
            },
        }
    }
}

impl From<RewriteError> for RefactorError {
    fn from(err: RewriteError) -> Self {
        match err {
            RewriteError::NoOccurrences { name } => RefactorError::NoOccurrences { symbol: name },
            RewriteError::Read {
                path,
                source,
                written,
            } => RefactorError::Io {
                op: "read",
                path,
                message: source.to_string(),
                written,
            },
            RewriteError::Write {
                path,
                source,
                written,
            } => RefactorError::Io {
                op: "write",
                path,
                message: source.to_string(),
                written,
            },
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl RefactorError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        RefactorError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        RefactorError::Internal {
            message: message.into(),
        }
    }

    /// Wrap a semantic model provider failure.
    pub fn load_error(err: &dyn std::error::Error) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        RefactorError::LoadError { message }
    }

    /// Attach the target file to a resolver error.
    pub fn from_resolve(err: ResolveError, file: impl Into<PathBuf>) -> Self {
        match err {
            ResolveError::NotFound { symbol } => RefactorError::SymbolNotFound {
                symbol,
                file: file.into(),
            },
            ResolveError::Ambiguous { symbol, count } => {
                RefactorError::AmbiguousSymbol { symbol, count }
            }
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }

    /// Stable snake_case name of the error kind, used in JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            RefactorError::InvalidArguments { .. } => "invalid_arguments",
            RefactorError::RootNotFound { .. } => "root_not_found",
            RefactorError::LoadError { .. } => "load_error",
            RefactorError::FileNotInProgram { .. } => "file_not_in_program",
            RefactorError::SymbolNotFound { .. } => "not_found",
            RefactorError::AmbiguousSymbol { .. } => "ambiguous",
            RefactorError::Conflict { .. } => "conflict",
            RefactorError::NoOccurrences { .. } => "no_occurrences",
            RefactorError::Io { .. } => "io_error",
            RefactorError::Internal { .. } => "internal",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
