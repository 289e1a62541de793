//! Lexical scopes for local declarations.
//!
//! Only function-local scopes live here. File scope (imports) and package
//! scope are consulted by the analyzer after the local frames miss.

use std::collections::HashMap;

use goref_core::facts::SymbolId;

/// Stack of local scope frames, innermost last.
#[derive(Debug, Default)]
pub struct Scopes {
    frames: Vec<HashMap<String, SymbolId>>,
}

impl Scopes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Bind `name` in the innermost frame.
    pub fn declare(&mut self, name: &str, id: SymbolId) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), id);
        }
    }

    /// Is `name` bound in the innermost frame?
    pub fn declared_in_innermost(&self, name: &str) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| frame.contains_key(name))
    }

    /// Look `name` up from the innermost frame outwards.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).copied())
    }
}
