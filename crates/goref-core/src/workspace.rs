//! Program Root Locator.
//!
//! Walks upward from a source file through its ancestor directories until a
//! directory containing the root marker (for Go, `go.mod`) is found.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors from root location.
#[derive(Debug, Error)]
pub enum LocateError {
    /// No ancestor directory carries the marker.
    #[error("{marker} not found above {file}")]
    RootNotFound { file: PathBuf, marker: String },

    /// The starting path could not be made absolute.
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Make `path` absolute without requiring it to exist.
///
/// Existing paths are canonicalized so that symlinked checkouts compare equal
/// to the paths produced by directory walking.
pub fn absolute_path(path: &Path) -> Result<PathBuf, LocateError> {
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|source| LocateError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Find the nearest ancestor directory of `file` containing `marker`.
///
/// The search starts at the file's own directory and stops at the
/// filesystem root.
pub fn find_program_root(file: &Path, marker: &str) -> Result<PathBuf, LocateError> {
    let file = absolute_path(file)?;
    let mut dir = if file.is_dir() {
        Some(file.as_path())
    } else {
        file.parent()
    };

    while let Some(candidate) = dir {
        if candidate.join(marker).is_file() {
            debug!(root = %candidate.display(), "located program root");
            return Ok(candidate.to_path_buf());
        }
        dir = candidate.parent();
    }

    Err(LocateError::RootNotFound {
        file,
        marker: marker.to_string(),
    })
}

/// Path of `path` relative to `root`, `/`-separated.
///
/// Paths outside `root` are returned unchanged.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
