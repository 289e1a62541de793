//! Offset-Based Rewriter.
//!
//! Applies a rename to every file of an [`OccurrenceSet`], substituting the
//! new name at byte offsets that still hold the old name as a whole
//! identifier.
//!
//! Per file:
//! 1. Read the current content.
//! 2. Visit offsets from highest to lowest, so an edit never shifts an offset
//!    that is still to be processed.
//! 3. Re-validate each offset: the bytes must equal the old name and be
//!    bounded by non-identifier bytes or file boundaries. Stale offsets are
//!    skipped, not fatal.
//! 4. Splice the new name into the buffer.
//! 5. Write the buffer back only if something was replaced.
//!
//! Files are visited in lexical order of their relative path. There is no
//! rollback: an I/O failure reports the files already written.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::text::{byte_offset_to_position, is_identifier_at};

// ============================================================================
// Errors
// ============================================================================

/// Errors from rewriting.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
        written: Vec<String>,
    },

    /// A file could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
        written: Vec<String>,
    },

    /// No offset survived re-validation in any file.
    #[error("no occurrences of symbol {name} found")]
    NoOccurrences { name: String },
}

// ============================================================================
// Content Hashes
// ============================================================================

/// SHA-256 of file content, hex-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ContentHash(pub String);

impl ContentHash {
    /// Compute SHA-256 hash of the given bytes.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Occurrence Set
// ============================================================================

/// Offsets to rewrite in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOccurrences {
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Byte offsets of the old name, deduplicated.
    pub offsets: BTreeSet<usize>,
}

/// All rename locations (declaration and uses), grouped by file.
///
/// Keyed by path relative to the program root so iteration is lexical.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceSet {
    files: BTreeMap<String, FileOccurrences>,
}

impl OccurrenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence. Duplicate offsets collapse.
    pub fn add(&mut self, rel_path: impl Into<String>, path: impl Into<PathBuf>, offset: usize) {
        let path = path.into();
        self.files
            .entry(rel_path.into())
            .or_insert_with(|| FileOccurrences {
                path,
                offsets: BTreeSet::new(),
            })
            .offsets
            .insert(offset);
    }

    /// Files in lexical order of relative path.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileOccurrences)> {
        self.files.iter().map(|(rel, occ)| (rel.as_str(), occ))
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn offset_count(&self) -> usize {
        self.files.values().map(|f| f.offsets.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

// ============================================================================
// Results
// ============================================================================

/// How rewritten content reaches the disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate and overwrite the file.
    #[default]
    InPlace,
    /// Write a temp file in the same directory, then rename over the original.
    Atomic,
}

/// Outcome for one rewritten file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRewrite {
    /// Path relative to the program root.
    pub file: String,
    /// Occurrences actually replaced.
    pub count: usize,
    /// Offsets that failed re-validation.
    pub skipped: usize,
    pub before_hash: ContentHash,
    pub after_hash: ContentHash,
}

/// Outcome of a whole rewrite. Files with zero replacements are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewriteResult {
    pub files: Vec<FileRewrite>,
}

impl RewriteResult {
    /// Total replacements across all files.
    pub fn total(&self) -> usize {
        self.files.iter().map(|f| f.count).sum()
    }

    /// Count for one file, if it was rewritten.
    pub fn count_for(&self, rel_path: &str) -> Option<usize> {
        self.files
            .iter()
            .find(|f| f.file == rel_path)
            .map(|f| f.count)
    }
}

// ============================================================================
// Rewriting
// ============================================================================

/// Outcome of rewriting one in-memory buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferRewrite {
    /// Occurrences replaced.
    pub count: usize,
    /// Original offsets that failed re-validation, in descending order.
    pub skipped: Vec<usize>,
}

/// Replace `old` with `new` at each valid offset of `content`.
///
/// Offsets are visited in descending order; each is re-validated against the
/// buffer as it stands, which for a descending walk is the original content
/// at that position.
pub fn rewrite_buffer(
    content: &mut Vec<u8>,
    offsets: &BTreeSet<usize>,
    old: &str,
    new: &str,
) -> BufferRewrite {
    let old_bytes = old.as_bytes();
    let mut outcome = BufferRewrite::default();

    for &offset in offsets.iter().rev() {
        if !is_identifier_at(content, offset, old_bytes) {
            outcome.skipped.push(offset);
            continue;
        }
        content.splice(offset..offset + old_bytes.len(), new.bytes());
        outcome.count += 1;
    }

    outcome
}

/// Rename `old` to `new` at every occurrence, mutating files on disk.
///
/// Returns per-file counts for files that changed. Fails with
/// [`RewriteError::NoOccurrences`] if nothing was replaced anywhere.
pub fn rewrite(
    occurrences: &OccurrenceSet,
    old: &str,
    new: &str,
    mode: WriteMode,
) -> Result<RewriteResult, RewriteError> {
    let mut result = RewriteResult::default();

    for (rel_path, file) in occurrences.iter() {
        let written = || -> Vec<String> { result.files.iter().map(|f| f.file.clone()).collect() };

        let original = fs::read(&file.path).map_err(|source| RewriteError::Read {
            path: file.path.clone(),
            source,
            written: written(),
        })?;
        let mut content = original.clone();

        let outcome = rewrite_buffer(&mut content, &file.offsets, old, new);
        for &offset in &outcome.skipped {
            let (line, col) = byte_offset_to_position(&original, offset);
            warn!(
                file = rel_path,
                line,
                col,
                "skipping stale occurrence of {old}"
            );
        }
        if outcome.count == 0 {
            debug!(file = rel_path, "no valid occurrences, file left untouched");
            continue;
        }

        write_file(&file.path, &content, mode).map_err(|source| RewriteError::Write {
            path: file.path.clone(),
            source,
            written: written(),
        })?;
        info!(file = rel_path, count = outcome.count, "rewrote file");

        result.files.push(FileRewrite {
            file: rel_path.to_string(),
            count: outcome.count,
            skipped: outcome.skipped.len(),
            before_hash: ContentHash::compute(&original),
            after_hash: ContentHash::compute(&content),
        });
    }

    if result.total() == 0 {
        return Err(RewriteError::NoOccurrences {
            name: old.to_string(),
        });
    }
    Ok(result)
}

fn write_file(path: &Path, data: &[u8], mode: WriteMode) -> io::Result<()> {
    match mode {
        WriteMode::InPlace => fs::write(path, data),
        WriteMode::Atomic => {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let permissions = fs::metadata(path)?.permissions();
            let mut temp = NamedTempFile::new_in(dir)?;
            temp.write_all(data)?;
            temp.as_file().sync_all()?;
            fs::set_permissions(temp.path(), permissions)?;
            temp.persist(path).map_err(|e| e.error)?;
            Ok(())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
