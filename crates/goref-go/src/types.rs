//! Static type approximations used to resolve selectors.
//!
//! The analyzer does not type-check Go. It tracks just enough type
//! structure to answer "which declaration does `x.f` select": named types
//! (by the identity of their declaration), pointers, element types of
//! containers, and anonymous struct types.

use goref_core::facts::SymbolId;

/// Identity of a syntax node: (file index, start byte).
pub type NodeKey = (usize, usize);

/// An approximate Go type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TypeRef {
    /// A named type declared in the program.
    Named(SymbolId),
    /// `*T`.
    Pointer(Box<TypeRef>),
    /// Slice or array with the given element type.
    Slice(Box<TypeRef>),
    /// Map with the given value type.
    Map(Box<TypeRef>),
    /// Channel with the given element type.
    Chan(Box<TypeRef>),
    /// An anonymous struct type, identified by its `struct_type` node.
    Struct(NodeKey),
    /// Anything else: predeclared, external, or not inferred.
    #[default]
    Unknown,
}

impl TypeRef {
    pub fn pointer(inner: TypeRef) -> Self {
        match inner {
            TypeRef::Unknown => TypeRef::Unknown,
            other => TypeRef::Pointer(Box::new(other)),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TypeRef::Unknown)
    }

    /// Strip one level of pointer.
    pub fn deref(&self) -> &TypeRef {
        match self {
            TypeRef::Pointer(inner) => inner,
            other => other,
        }
    }

    /// Element type produced by indexing or ranging over a value of this type.
    pub fn element(&self) -> TypeRef {
        match self.deref() {
            TypeRef::Slice(elem) | TypeRef::Map(elem) | TypeRef::Chan(elem) => (**elem).clone(),
            _ => TypeRef::Unknown,
        }
    }
}
