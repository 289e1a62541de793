//! Go source discovery.
//!
//! Walks a module root the way the `./...` package pattern does: every
//! `.go` file, tests included, skipping directories named `testdata` or
//! `vendor`, directories starting with `.` or `_`, and nested modules
//! (subdirectories carrying their own `go.mod`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

use goref_core::workspace::relative_path;

// ============================================================================
// Error Types
// ============================================================================

/// Error type for file discovery.
#[derive(Debug, Error)]
pub enum FileError {
    /// `go.mod` exists but declares no module path.
    #[error("no module directive in {path}")]
    NoModuleDirective { path: PathBuf },

    /// Directory walk failed.
    #[error("walking {path}: {message}")]
    Walk { path: PathBuf, message: String },

    /// IO error.
    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// ============================================================================
// Configuration
// ============================================================================

/// Options controlling which files make up the program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoLoadConfig {
    /// Include `_test.go` files.
    pub include_tests: bool,
    /// Directory names skipped wherever they appear.
    pub skip_dirs: Vec<String>,
    /// Skip subdirectories that carry their own `go.mod`.
    pub skip_nested_modules: bool,
}

impl Default for GoLoadConfig {
    fn default() -> Self {
        GoLoadConfig {
            include_tests: true,
            skip_dirs: vec!["testdata".to_string(), "vendor".to_string()],
            skip_nested_modules: true,
        }
    }
}

// ============================================================================
// Discovery
// ============================================================================

/// A discovered Go source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the module root, `/`-separated.
    pub rel_path: String,
    /// Directory relative to the module root (`""` for the root).
    pub rel_dir: String,
    /// File content.
    pub content: String,
}

/// Read the module path from `<root>/go.mod`.
pub fn read_module_path(root: &Path) -> Result<String, FileError> {
    let path = root.join("go.mod");
    let content = fs::read_to_string(&path).map_err(|source| FileError::Io {
        path: path.clone(),
        source,
    })?;
    parse_module_directive(&content).ok_or(FileError::NoModuleDirective { path })
}

/// Extract the module path from go.mod content.
pub fn parse_module_directive(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or("").trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let module = rest.trim().trim_matches('"');
        (!module.is_empty()).then(|| module.to_string())
    })
}

fn is_skipped_dir(entry: &DirEntry, root: &Path, config: &GoLoadConfig) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') || name.starts_with('_') {
        return true;
    }
    if config.skip_dirs.iter().any(|d| d == name.as_ref()) {
        return true;
    }
    config.skip_nested_modules && entry.path() != root && entry.path().join("go.mod").is_file()
}

/// Does the file opt out of every build via `//go:build ignore`?
fn is_ignored_by_build_tag(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .take_while(|line| line.is_empty() || line.starts_with("//"))
        .any(|line| line == "//go:build ignore" || line == "// +build ignore")
}

/// Collect every Go source file under `root`, sorted by relative path.
pub fn collect_go_files(root: &Path, config: &GoLoadConfig) -> Result<Vec<SourceFile>, FileError> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e, root, config));

    for entry in walker {
        let entry = entry.map_err(|e| FileError::Walk {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf()),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "go") {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if file_name.starts_with('.') || file_name.starts_with('_') {
            continue;
        }
        if !config.include_tests && file_name.ends_with("_test.go") {
            continue;
        }

        let content = fs::read_to_string(path).map_err(|source| FileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if is_ignored_by_build_tag(&content) {
            tracing::debug!("skipping {} (build ignore)", path.display());
            continue;
        }

        let rel_path = relative_path(root, path);
        let rel_dir = path
            .parent()
            .map(|dir| relative_path(root, dir))
            .unwrap_or_default();
        files.push(SourceFile {
            path: path.to_path_buf(),
            rel_path,
            rel_dir,
            content,
        });
    }

    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(files)
}
