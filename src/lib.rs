//! goref: symbol reference listing and safe program-wide rename for Go.
//!
//! Two operations over one Go module: list every use of a symbol declared in
//! a given file, and rename that symbol everywhere it is used. Both are
//! exposed through the CLI and an MCP server.

// Core infrastructure - re-exported from goref-core
pub use goref_core::adapter;
pub use goref_core::error;
pub use goref_core::facts;
pub use goref_core::ops;
pub use goref_core::output;
pub use goref_core::rewrite;
pub use goref_core::text;

// Language support
pub use goref_go::GoAdapter;

// Front doors for agents
pub mod cli;
#[cfg(feature = "mcp")]
pub mod mcp;
