//! Go language support for goref.
//!
//! This crate is the semantic model provider for Go modules:
//! - Source discovery under a `go.mod` root (tests included)
//! - Parsing with tree-sitter
//! - Scope-aware declaration and use-site analysis
//! - Go identifier validation for rename targets
//!
//! The entry point is [`GoAdapter`], which implements
//! [`goref_core::adapter::LanguageAdapter`].

pub mod analyzer;
pub mod files;
pub mod parse;
pub mod scope;
pub mod types;
pub mod validation;

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use goref_core::adapter::LanguageAdapter;
use goref_core::facts::FactsStore;

pub use analyzer::analyze;
pub use files::{collect_go_files, read_module_path, FileError, GoLoadConfig, SourceFile};
pub use parse::{go_parser, parse_file, ParseError, ParsedFile};
pub use validation::validate_go_identifier;

/// Errors loading a Go module.
#[derive(Debug, Error)]
pub enum GoError {
    #[error(transparent)]
    Files(#[from] FileError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Go semantic model provider.
#[derive(Debug, Clone, Default)]
pub struct GoAdapter {
    config: GoLoadConfig,
}

impl GoAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: GoLoadConfig) -> Self {
        GoAdapter { config }
    }

    pub fn config(&self) -> &GoLoadConfig {
        &self.config
    }
}

impl LanguageAdapter for GoAdapter {
    type Error = GoError;

    fn language(&self) -> &'static str {
        "Go"
    }

    fn root_marker(&self) -> &'static str {
        "go.mod"
    }

    fn load(&self, root: &Path) -> Result<FactsStore, GoError> {
        let module_path = read_module_path(root)?;
        let sources = collect_go_files(root, &self.config)?;
        debug!(module = %module_path, files = sources.len(), "collected Go sources");

        let mut parser = go_parser()?;
        let parsed = sources
            .into_iter()
            .map(|source| parse_file(&mut parser, source))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(analyze(root, &module_path, &parsed))
    }

    fn check_identifier(&self, name: &str) -> Result<(), String> {
        validate_go_identifier(name)
    }
}
