//! Parsing of symbol arguments: `Name` or `Type.Member`.
//!
//! A symbol spec is either a bare name (`Greet`) or a name qualified by its
//! owning type (`Server.Start`). Splitting happens at the first `.` only.

use std::fmt;

/// A parsed symbol spec.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolSpec {
    /// Owning type name; empty when the spec is unqualified.
    pub owner: String,
    /// Bare name.
    pub name: String,
}

impl SymbolSpec {
    /// Parse a user-supplied symbol string.
    ///
    /// `"Server.Start"` yields owner `Server` and name `Start`.
    /// `"a.b.c"` yields owner `a` and name `b.c`, which can match nothing.
    pub fn parse(input: &str) -> Self {
        match input.split_once('.') {
            Some((owner, name)) => SymbolSpec {
                owner: owner.to_string(),
                name: name.to_string(),
            },
            None => SymbolSpec {
                owner: String::new(),
                name: input.to_string(),
            },
        }
    }

    /// Does the spec carry an owning-type component?
    pub fn is_qualified(&self) -> bool {
        !self.owner.is_empty()
    }
}

impl fmt::Display for SymbolSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_qualified() {
            write!(f, "{}.{}", self.owner, self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}
