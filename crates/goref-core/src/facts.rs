//! Facts model: the program symbol table consumed by the refactoring core.
//!
//! This module provides the semantic program data model for goref:
//! - [`File`]: Source files of the loaded program
//! - [`Package`]: Packages with their package-level scope
//! - [`Symbol`]: Declarations (functions, methods, types, variables, ...)
//! - [`Reference`]: Use sites, each resolved to exactly one [`Symbol`]
//!
//! The [`FactsStore`] is produced by a [`LanguageAdapter`](crate::adapter::LanguageAdapter)
//! and is immutable from the core's point of view.
//!
//! # Identity
//!
//! Declarations are compared by [`SymbolId`], never by name. Two declarations
//! named `x` in different scopes carry distinct IDs and are never conflated.
//! IDs are allocated by the store (`next_*_id`) and are only meaningful within
//! one loaded store.
//!
//! # Deterministic Ordering
//!
//! Primary tables are `BTreeMap`s keyed by ID, so iteration order follows ID
//! allocation order, which adapters make deterministic by visiting files in
//! sorted path order.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a file within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a new file ID.
    pub fn new(id: u32) -> Self {
        FileId(id)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file_{}", self.0)
    }
}

/// Unique identifier for a package within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct PackageId(pub u32);

impl PackageId {
    /// Create a new package ID.
    pub fn new(id: u32) -> Self {
        PackageId(id)
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pkg_{}", self.0)
    }
}

/// Unique identifier for a declaration within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl SymbolId {
    /// Create a new symbol ID.
    pub fn new(id: u32) -> Self {
        SymbolId(id)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sym_{}", self.0)
    }
}

/// Unique identifier for a use site within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ReferenceId(pub u32);

impl ReferenceId {
    /// Create a new reference ID.
    pub fn new(id: u32) -> Self {
        ReferenceId(id)
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ref_{}", self.0)
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Kind of declared symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    /// Function without a receiver.
    Function,
    /// Function bound to an owning type (concrete method or interface method).
    Method,
    /// Named type or type alias.
    Type,
    /// Variable (package-level or local).
    Variable,
    /// Constant.
    Constant,
    /// Function parameter, named result, or receiver.
    Parameter,
    /// Struct field.
    Field,
    /// Type parameter of a generic function or type.
    TypeParameter,
    /// Explicit import name (`import alias "path"`).
    PackageName,
}

impl SymbolKind {
    /// Returns the string used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Type => "type",
            SymbolKind::Variable => "variable",
            SymbolKind::Constant => "constant",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Field => "field",
            SymbolKind::TypeParameter => "type_parameter",
            SymbolKind::PackageName => "package_name",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver type expression of a method, as written at the declaration.
///
/// `func (s Server) M()` is `Named("Server")`, `func (s *Server) M()` is
/// `Pointer(Named("Server"))`. Generic receivers (`*List[T]`) are recorded by
/// their base name. Anything the adapter cannot express is `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReceiverType {
    Named(String),
    Pointer(Box<ReceiverType>),
    Other,
}

impl ReceiverType {
    /// Name of the owning type, unwrapping at most one level of pointer.
    pub fn owner_name(&self) -> Option<&str> {
        match self {
            ReceiverType::Named(name) => Some(name),
            ReceiverType::Pointer(inner) => match inner.as_ref() {
                ReceiverType::Named(name) => Some(name),
                _ => None,
            },
            ReceiverType::Other => None,
        }
    }
}

// ============================================================================
// Positions
// ============================================================================

/// A byte-accurate source position.
///
/// `line` and `col` are 1-indexed, `col` counts bytes (as Go's `token.Position`
/// does). `offset` is the 0-indexed byte offset from the start of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub col: u32,
    pub offset: usize,
}

impl Position {
    pub fn new(line: u32, col: u32, offset: usize) -> Self {
        Position { line, col, offset }
    }
}

// ============================================================================
// Facts Tables
// ============================================================================

/// A source file of the loaded program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Unique identifier for this file.
    pub file_id: FileId,
    /// Absolute path on disk.
    pub path: PathBuf,
    /// Path relative to the program root, `/`-separated.
    pub rel_path: String,
    /// Package this file belongs to.
    pub package_id: PackageId,
}

impl File {
    /// Create a new file entry.
    pub fn new(
        file_id: FileId,
        path: impl Into<PathBuf>,
        rel_path: impl Into<String>,
        package_id: PackageId,
    ) -> Self {
        File {
            file_id,
            path: path.into(),
            rel_path: rel_path.into(),
            package_id,
        }
    }
}

/// A package: a set of files sharing one package-level scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Unique identifier for this package.
    pub package_id: PackageId,
    /// Package name from the package clause.
    pub name: String,
    /// Directory relative to the program root (`""` for the root itself).
    pub dir: String,
    /// Files of the package, in load order.
    pub files: Vec<FileId>,
    /// Package-level scope: name -> declaration.
    scope: BTreeMap<String, SymbolId>,
}

impl Package {
    /// Create a new, empty package.
    pub fn new(package_id: PackageId, name: impl Into<String>, dir: impl Into<String>) -> Self {
        Package {
            package_id,
            name: name.into(),
            dir: dir.into(),
            files: Vec::new(),
            scope: BTreeMap::new(),
        }
    }

    /// Look up a name in the package-level scope.
    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.scope.get(name).copied()
    }

    /// Names declared in the package-level scope, sorted.
    pub fn scope_names(&self) -> impl Iterator<Item = &str> {
        self.scope.keys().map(String::as_str)
    }
}

/// A declaration (Declaration Object).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Unique identifier for this declaration.
    pub symbol_id: SymbolId,
    /// Kind of declaration.
    pub kind: SymbolKind,
    /// Declared name.
    pub name: String,
    /// File containing the declaring identifier.
    pub decl_file_id: FileId,
    /// Position of the declaring identifier.
    pub decl_pos: Position,
    /// Package that owns the declaration.
    pub package_id: PackageId,
    /// Receiver type for methods.
    pub receiver: Option<ReceiverType>,
}

impl Symbol {
    /// Create a new declaration without a receiver.
    pub fn new(
        symbol_id: SymbolId,
        kind: SymbolKind,
        name: impl Into<String>,
        decl_file_id: FileId,
        decl_pos: Position,
        package_id: PackageId,
    ) -> Self {
        Symbol {
            symbol_id,
            kind,
            name: name.into(),
            decl_file_id,
            decl_pos,
            package_id,
            receiver: None,
        }
    }

    /// Set the receiver type.
    pub fn with_receiver(mut self, receiver: ReceiverType) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Name of the owning type for methods (one pointer level unwrapped).
    pub fn owner_type_name(&self) -> Option<&str> {
        self.receiver.as_ref().and_then(ReceiverType::owner_name)
    }
}

/// A use site (Reference), resolved to exactly one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Unique identifier for this use site.
    pub ref_id: ReferenceId,
    /// The declaration being referenced.
    pub symbol_id: SymbolId,
    /// File containing the use.
    pub file_id: FileId,
    /// Position of the referencing identifier.
    pub pos: Position,
}

impl Reference {
    /// Create a new reference entry.
    pub fn new(ref_id: ReferenceId, symbol_id: SymbolId, file_id: FileId, pos: Position) -> Self {
        Reference {
            ref_id,
            symbol_id,
            file_id,
            pos,
        }
    }
}

// ============================================================================
// FactsStore
// ============================================================================

/// In-memory symbol table for one loaded program.
#[derive(Debug, Clone)]
pub struct FactsStore {
    /// Program root directory (absolute).
    root: PathBuf,

    // Primary storage (BTreeMap for deterministic iteration)
    files: BTreeMap<FileId, File>,
    packages: BTreeMap<PackageId, Package>,
    symbols: BTreeMap<SymbolId, Symbol>,
    references: BTreeMap<ReferenceId, Reference>,

    // Secondary indexes
    /// Absolute file path -> FileId.
    file_by_path: HashMap<PathBuf, FileId>,
    /// file_id -> symbol_ids[] (declarations whose identifier is in the file).
    symbols_by_file: HashMap<FileId, Vec<SymbolId>>,

    next_file_id: u32,
    next_package_id: u32,
    next_symbol_id: u32,
    next_reference_id: u32,
}

impl FactsStore {
    /// Create an empty store for the program rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FactsStore {
            root: root.into(),
            files: BTreeMap::new(),
            packages: BTreeMap::new(),
            symbols: BTreeMap::new(),
            references: BTreeMap::new(),
            file_by_path: HashMap::new(),
            symbols_by_file: HashMap::new(),
            next_file_id: 0,
            next_package_id: 0,
            next_symbol_id: 0,
            next_reference_id: 0,
        }
    }

    /// Program root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ------------------------------------------------------------------------
    // ID generation
    // ------------------------------------------------------------------------

    pub fn next_file_id(&mut self) -> FileId {
        let id = FileId::new(self.next_file_id);
        self.next_file_id += 1;
        id
    }

    pub fn next_package_id(&mut self) -> PackageId {
        let id = PackageId::new(self.next_package_id);
        self.next_package_id += 1;
        id
    }

    pub fn next_symbol_id(&mut self) -> SymbolId {
        let id = SymbolId::new(self.next_symbol_id);
        self.next_symbol_id += 1;
        id
    }

    pub fn next_reference_id(&mut self) -> ReferenceId {
        let id = ReferenceId::new(self.next_reference_id);
        self.next_reference_id += 1;
        id
    }

    // ------------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------------

    /// Insert a package.
    pub fn insert_package(&mut self, package: Package) {
        self.packages.insert(package.package_id, package);
    }

    /// Insert a file and attach it to its package.
    pub fn insert_file(&mut self, file: File) {
        self.file_by_path.insert(file.path.clone(), file.file_id);
        if let Some(package) = self.packages.get_mut(&file.package_id) {
            package.files.push(file.file_id);
        }
        self.files.insert(file.file_id, file);
    }

    /// Insert a declaration.
    pub fn insert_symbol(&mut self, symbol: Symbol) {
        self.symbols_by_file
            .entry(symbol.decl_file_id)
            .or_default()
            .push(symbol.symbol_id);
        self.symbols.insert(symbol.symbol_id, symbol);
    }

    /// Bind a declaration in its package-level scope.
    ///
    /// Returns the previously bound declaration, if any.
    pub fn bind_package_scope(&mut self, symbol_id: SymbolId) -> Option<SymbolId> {
        let symbol = self.symbols.get(&symbol_id)?;
        let name = symbol.name.clone();
        let package = self.packages.get_mut(&symbol.package_id)?;
        package.scope.insert(name, symbol_id)
    }

    /// Insert a use site.
    pub fn insert_reference(&mut self, reference: Reference) {
        self.references.insert(reference.ref_id, reference);
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    pub fn file(&self, id: FileId) -> Option<&File> {
        self.files.get(&id)
    }

    pub fn package(&self, id: PackageId) -> Option<&Package> {
        self.packages.get(&id)
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(&id)
    }

    pub fn reference(&self, id: ReferenceId) -> Option<&Reference> {
        self.references.get(&id)
    }

    /// Find a file by its absolute path.
    pub fn file_by_path(&self, path: &Path) -> Option<&File> {
        self.file_by_path
            .get(path)
            .and_then(|id| self.files.get(id))
    }

    /// Declarations whose declaring identifier lies in the given file.
    pub fn symbols_in_file(&self, file_id: FileId) -> Vec<&Symbol> {
        self.symbols_by_file
            .get(&file_id)
            .map(|ids| ids.iter().filter_map(|id| self.symbols.get(id)).collect())
            .unwrap_or_default()
    }

    /// Look up a name in a package-level scope.
    pub fn lookup_package_scope(&self, package_id: PackageId, name: &str) -> Option<SymbolId> {
        self.packages.get(&package_id)?.lookup(name)
    }

    // ------------------------------------------------------------------------
    // Iteration
    // ------------------------------------------------------------------------

    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.files.values()
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn references(&self) -> impl Iterator<Item = &Reference> {
        self.references.values()
    }

    // ------------------------------------------------------------------------
    // Counts
    // ------------------------------------------------------------------------

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn reference_count(&self) -> usize {
        self.references.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
