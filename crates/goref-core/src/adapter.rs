//! Language adapter trait.
//!
//! A [`LanguageAdapter`] is the Semantic Model Provider: given a program
//! root, it parses every source file of the program (tests included) and
//! returns a fully populated [`FactsStore`]. The core never inspects source
//! syntax itself; resolution, enumeration, validation, and rewriting all run
//! against the store.
//!
//! # ID Ownership
//!
//! The store owns ID generation (`next_*_id()`). Adapters allocate IDs while
//! inserting and must visit files in a deterministic order so that IDs, and
//! therefore tie-breaking, are stable across runs.
//!
//! # Failure
//!
//! Any analysis error in any file must fail the whole load. Partial models
//! are never returned.

use std::path::Path;

use crate::facts::FactsStore;

/// Pluggable semantic model provider for one language.
pub trait LanguageAdapter {
    /// The error type for this adapter.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Human-readable language name.
    fn language(&self) -> &'static str;

    /// File name marking the program root (e.g. `go.mod`).
    fn root_marker(&self) -> &'static str;

    /// Load the semantic model of the program rooted at `root`.
    ///
    /// `root` is absolute. File paths in the returned store are absolute,
    /// with relative paths computed against `root`.
    fn load(&self, root: &Path) -> Result<FactsStore, Self::Error>;

    /// Check that `name` is a legal, non-reserved identifier.
    ///
    /// Returns the reason on rejection.
    fn check_identifier(&self, name: &str) -> Result<(), String>;
}
