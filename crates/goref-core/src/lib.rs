//! Core infrastructure for goref.
//!
//! This crate provides the language-agnostic refactoring engine:
//! - Facts store of declarations and use sites with opaque identities
//! - Language adapter trait for pluggable semantic model providers
//! - Program root location
//! - Symbol spec parsing and resolution
//! - Reference enumeration
//! - Rename safety validation
//! - Offset-based rewriting with identifier-boundary checks
//! - Error types, error codes, and report types for CLI/MCP responses

pub mod adapter;
pub mod error;
pub mod facts;
pub mod ops;
pub mod output;
pub mod refs;
pub mod resolve;
pub mod rewrite;
pub mod symbol;
pub mod text;
pub mod validate;
pub mod workspace;
