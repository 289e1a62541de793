//! Go analyzer: declaration and use-site collection over tree-sitter trees.
//!
//! Builds a [`FactsStore`] for a whole module in two passes:
//!
//! - Pass 1 declares every package-level object (functions, methods, types,
//!   variables, constants), struct fields and interface methods reachable
//!   from package-level types, and explicit import names. Methods are bound
//!   to their receiver type once every type in the package is known.
//! - Pass 2 walks each file with a stack of lexical scopes, declaring locals
//!   and recording a use for every identifier that resolves to a declaration.
//!
//! Selectors (`x.f`) are resolved with a small static type approximation
//! ([`TypeRef`]): enough to follow variables, fields, call results, pointers,
//! container elements and embedded-field promotion. Selectors whose operand
//! type cannot be inferred record no use.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use tree_sitter::Node;

use goref_core::facts::{
    FactsStore, File, FileId, Package, PackageId, Position, ReceiverType, Reference, Symbol,
    SymbolId, SymbolKind,
};

use crate::parse::ParsedFile;
use crate::scope::Scopes;
use crate::types::{NodeKey, TypeRef};

/// Bound on type evaluation and inference recursion.
const MAX_DEPTH: usize = 16;

/// Bound on embedded-field promotion depth.
const MAX_EMBED_DEPTH: usize = 5;

/// Node kinds that denote types when they appear in expression position.
const TYPE_KINDS: &[&str] = &[
    "type_identifier",
    "qualified_type",
    "pointer_type",
    "generic_type",
    "struct_type",
    "interface_type",
    "function_type",
    "map_type",
    "slice_type",
    "array_type",
    "implicit_length_array_type",
    "channel_type",
    "parenthesized_type",
    "negated_type",
    "type_elem",
    "type_constraint",
];

// ============================================================================
// Analysis tables
// ============================================================================

/// One Go package: the files of one directory sharing a package clause.
#[derive(Debug)]
struct PackageUnit {
    id: PackageId,
    name: String,
    files: Vec<usize>,
}

/// What an identifier in expression position refers to.
#[derive(Debug, Clone, Copy)]
enum Binding {
    Symbol(SymbolId),
    Import(ImportBinding),
}

/// A file-scope import name.
#[derive(Debug, Clone, Copy)]
struct ImportBinding {
    /// Index of the imported package when it belongs to the module.
    package: Option<usize>,
    /// The explicit import name declaration, if any.
    alias: Option<SymbolId>,
}

/// Per-file import table.
#[derive(Debug, Default)]
struct FileImports {
    names: HashMap<String, ImportBinding>,
    dot: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
struct NamedType<'a> {
    type_expr: Node<'a>,
    file: usize,
    alias: bool,
}

#[derive(Debug, Default)]
struct StructInfo<'a> {
    fields: BTreeMap<String, SymbolId>,
    /// Embedded field types with the file they appear in.
    embedded: Vec<(Node<'a>, usize)>,
}

/// Where the type of a value declaration comes from.
#[derive(Debug, Clone)]
enum TypeSource<'a> {
    Known(TypeRef),
    TypeExpr(Node<'a>, usize),
    /// Result `index` of `expr`.
    Value {
        expr: Node<'a>,
        file: usize,
        index: usize,
    },
}

/// Result types of a function or method, with the file they appear in.
#[derive(Debug, Clone)]
struct Results<'a> {
    types: Vec<Node<'a>>,
    file: usize,
}

/// Type and values of one var/const spec.
#[derive(Debug, Clone, Default)]
struct SpecShape<'a> {
    ty: Option<Node<'a>>,
    values: Vec<Node<'a>>,
}

// ============================================================================
// Entry point
// ============================================================================

/// Analyze every parsed file of the module rooted at `root`.
///
/// `files` must be sorted by relative path; declaration and reference ids are
/// assigned in that order.
pub fn analyze(root: &Path, module_path: &str, files: &[ParsedFile]) -> FactsStore {
    let mut analyzer = Analyzer::new(root, files);
    analyzer.group_packages(module_path);
    analyzer.declare_package_level();
    analyzer.bind_methods();
    analyzer.collect_uses();

    tracing::debug!(
        packages = analyzer.store.package_count(),
        files = analyzer.store.file_count(),
        symbols = analyzer.store.symbol_count(),
        references = analyzer.store.reference_count(),
        "go analysis complete"
    );
    analyzer.store
}

struct Analyzer<'a> {
    files: &'a [ParsedFile],
    store: FactsStore,

    packages: Vec<PackageUnit>,
    pkg_by_import: HashMap<String, usize>,
    file_ids: Vec<FileId>,
    file_pkg: Vec<usize>,
    imports: Vec<FileImports>,

    named: HashMap<SymbolId, NamedType<'a>>,
    methods: HashMap<SymbolId, BTreeMap<String, SymbolId>>,
    iface_embeds: HashMap<SymbolId, Vec<(Node<'a>, usize)>>,
    structs: HashMap<NodeKey, StructInfo<'a>>,
    interfaces: HashSet<NodeKey>,
    sym_types: HashMap<SymbolId, TypeSource<'a>>,
    results: HashMap<SymbolId, Results<'a>>,
    /// Methods awaiting their receiver type: (method, base type name, file).
    pending_methods: Vec<(SymbolId, String, usize)>,

    scopes: Scopes,
    cur_file: usize,
}

impl<'a> Analyzer<'a> {
    fn new(root: &Path, files: &'a [ParsedFile]) -> Self {
        Analyzer {
            files,
            store: FactsStore::new(root),
            packages: Vec::new(),
            pkg_by_import: HashMap::new(),
            file_ids: vec![FileId::new(0); files.len()],
            file_pkg: vec![0; files.len()],
            imports: (0..files.len()).map(|_| FileImports::default()).collect(),
            named: HashMap::new(),
            methods: HashMap::new(),
            iface_embeds: HashMap::new(),
            structs: HashMap::new(),
            interfaces: HashSet::new(),
            sym_types: HashMap::new(),
            results: HashMap::new(),
            pending_methods: Vec::new(),
            scopes: Scopes::new(),
            cur_file: 0,
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn text_in(&self, node: Node<'a>, file: usize) -> &'a str {
        let files: &'a [ParsedFile] = self.files;
        files[file].text(node)
    }

    fn text(&self, node: Node<'a>) -> &'a str {
        self.text_in(node, self.cur_file)
    }

    fn root_node(&self, file: usize) -> Node<'a> {
        let files: &'a [ParsedFile] = self.files;
        files[file].tree.root_node()
    }

    fn package_id_of(&self, file: usize) -> PackageId {
        self.packages[self.file_pkg[file]].id
    }

    fn declare(&mut self, kind: SymbolKind, name_node: Node<'a>, file: usize) -> Option<SymbolId> {
        self.declare_with(kind, name_node, file, None)
    }

    fn declare_with(
        &mut self,
        kind: SymbolKind,
        name_node: Node<'a>,
        file: usize,
        receiver: Option<ReceiverType>,
    ) -> Option<SymbolId> {
        let name = self.text_in(name_node, file);
        if name.is_empty() || name == "_" {
            return None;
        }
        let id = self.store.next_symbol_id();
        let mut symbol = Symbol::new(
            id,
            kind,
            name,
            self.file_ids[file],
            position(name_node),
            self.package_id_of(file),
        );
        if let Some(receiver) = receiver {
            symbol = symbol.with_receiver(receiver);
        }
        self.store.insert_symbol(symbol);
        Some(id)
    }

    /// Declare a local in the innermost scope of the current file.
    fn declare_local(&mut self, kind: SymbolKind, name_node: Node<'a>, ty: TypeRef) -> Option<SymbolId> {
        let id = self.declare(kind, name_node, self.cur_file)?;
        let name = self.text(name_node);
        self.scopes.declare(name, id);
        self.sym_types.insert(id, TypeSource::Known(ty));
        Some(id)
    }

    fn record(&mut self, symbol_id: SymbolId, node: Node<'a>) {
        let ref_id = self.store.next_reference_id();
        self.store.insert_reference(Reference::new(
            ref_id,
            symbol_id,
            self.file_ids[self.cur_file],
            position(node),
        ));
    }

    fn kind_of(&self, id: SymbolId) -> Option<SymbolKind> {
        self.store.symbol(id).map(|s| s.kind)
    }

    // ------------------------------------------------------------------------
    // Packages and files
    // ------------------------------------------------------------------------

    fn group_packages(&mut self, module_path: &str) {
        let mut groups: BTreeMap<(&'a str, &'a str), Vec<usize>> = BTreeMap::new();
        let files: &'a [ParsedFile] = self.files;
        for (index, file) in files.iter().enumerate() {
            groups
                .entry((file.source.rel_dir.as_str(), file.package_name.as_str()))
                .or_default()
                .push(index);
        }

        for ((dir, name), members) in groups {
            let id = self.store.next_package_id();
            self.store.insert_package(Package::new(id, name, dir));
            let unit = self.packages.len();

            if !name.ends_with("_test") {
                let import_path = if dir.is_empty() {
                    module_path.to_string()
                } else {
                    format!("{}/{}", module_path, dir)
                };
                self.pkg_by_import.entry(import_path).or_insert(unit);
            }

            for &index in &members {
                let source = &files[index].source;
                let file_id = self.store.next_file_id();
                self.store.insert_file(File::new(
                    file_id,
                    source.path.clone(),
                    source.rel_path.clone(),
                    id,
                ));
                self.file_ids[index] = file_id;
                self.file_pkg[index] = unit;
            }

            self.packages.push(PackageUnit {
                id,
                name: name.to_string(),
                files: members,
            });
        }
    }

    // ------------------------------------------------------------------------
    // Pass 1: package-level declarations
    // ------------------------------------------------------------------------

    fn declare_package_level(&mut self) {
        let order: Vec<usize> = self
            .packages
            .iter()
            .flat_map(|p| p.files.iter().copied())
            .collect();
        for file in order {
            let root = self.root_node(file);
            for decl in named_children(root) {
                match decl.kind() {
                    "import_declaration" => self.declare_imports(decl, file),
                    "function_declaration" => self.declare_function(decl, file),
                    "method_declaration" => self.declare_method(decl, file),
                    "type_declaration" => {
                        for spec in type_specs(decl) {
                            self.declare_type_spec(spec, file, true);
                        }
                    }
                    "var_declaration" => self.declare_package_values(decl, file, SymbolKind::Variable),
                    "const_declaration" => self.declare_package_values(decl, file, SymbolKind::Constant),
                    _ => {}
                }
            }
        }
    }

    fn declare_imports(&mut self, decl: Node<'a>, file: usize) {
        for spec in descendants_of_kind(decl, "import_spec") {
            let Some(path_node) = spec.child_by_field_name("path") else {
                continue;
            };
            let path = self
                .text_in(path_node, file)
                .trim_matches(|c| c == '"' || c == '`');
            let target = self.pkg_by_import.get(path).copied();

            match spec.child_by_field_name("name") {
                Some(name) if name.kind() == "dot" => {
                    if let Some(target) = target {
                        self.imports[file].dot.push(target);
                    }
                }
                Some(name) if name.kind() == "blank_identifier" => {}
                Some(name) => {
                    let alias = self.declare(SymbolKind::PackageName, name, file);
                    let local = self.text_in(name, file).to_string();
                    self.imports[file].names.insert(
                        local,
                        ImportBinding {
                            package: target,
                            alias,
                        },
                    );
                }
                None => {
                    let local = match target {
                        Some(unit) => self.packages[unit].name.clone(),
                        None => default_import_name(path).to_string(),
                    };
                    self.imports[file].names.insert(
                        local,
                        ImportBinding {
                            package: target,
                            alias: None,
                        },
                    );
                }
            }
        }
    }

    fn declare_function(&mut self, decl: Node<'a>, file: usize) {
        let Some(name) = decl.child_by_field_name("name") else {
            return;
        };
        let Some(id) = self.declare(SymbolKind::Function, name, file) else {
            return;
        };
        if self.text_in(name, file) != "init" {
            self.store.bind_package_scope(id);
        }
        let results = self.result_types(decl.child_by_field_name("result"), file);
        self.results.insert(id, results);
    }

    fn declare_method(&mut self, decl: Node<'a>, file: usize) {
        let Some(name) = decl.child_by_field_name("name") else {
            return;
        };
        let receiver_type = decl
            .child_by_field_name("receiver")
            .and_then(|list| named_children(list).into_iter().find(is_parameter))
            .and_then(|param| param.child_by_field_name("type"));
        let (receiver, base) = match receiver_type {
            Some(ty) => self.receiver_shape(ty, file),
            None => (ReceiverType::Other, None),
        };
        let Some(id) = self.declare_with(SymbolKind::Method, name, file, Some(receiver)) else {
            return;
        };
        let results = self.result_types(decl.child_by_field_name("result"), file);
        self.results.insert(id, results);
        if let Some(base) = base {
            self.pending_methods.push((id, base, file));
        }
    }

    /// Receiver type shape and base type name.
    fn receiver_shape(&self, ty: Node<'a>, file: usize) -> (ReceiverType, Option<String>) {
        match ty.kind() {
            "pointer_type" | "parenthesized_type" => {
                let Some(inner) = named_children(ty).into_iter().next() else {
                    return (ReceiverType::Other, None);
                };
                let (shape, base) = self.receiver_shape(inner, file);
                if ty.kind() == "pointer_type" {
                    (ReceiverType::Pointer(Box::new(shape)), base)
                } else {
                    (shape, base)
                }
            }
            "generic_type" => match ty.child_by_field_name("type") {
                Some(inner) => self.receiver_shape(inner, file),
                None => (ReceiverType::Other, None),
            },
            "type_identifier" => {
                let name = self.text_in(ty, file).to_string();
                (ReceiverType::Named(name.clone()), Some(name))
            }
            _ => (ReceiverType::Other, None),
        }
    }

    fn declare_type_spec(&mut self, spec: Node<'a>, file: usize, package_level: bool) -> Option<SymbolId> {
        let name = spec.child_by_field_name("name")?;
        let type_expr = spec.child_by_field_name("type")?;
        let id = self.declare(SymbolKind::Type, name, file)?;
        if package_level {
            self.store.bind_package_scope(id);
        }
        self.named.insert(
            id,
            NamedType {
                type_expr,
                file,
                alias: spec.kind() == "type_alias",
            },
        );
        match type_expr.kind() {
            "struct_type" => {
                self.declare_struct(type_expr, file);
            }
            "interface_type" => self.declare_interface(type_expr, file, Some(id)),
            _ => self.declare_members_in(type_expr, file),
        }
        Some(id)
    }

    fn declare_package_values(&mut self, decl: Node<'a>, file: usize, kind: SymbolKind) {
        let mut prev = SpecShape::default();
        for spec in value_specs(decl) {
            let shape = self.spec_shape(spec, kind, &mut prev);
            let names = field_children(spec, "name");
            if let Some(ty) = shape.ty {
                self.declare_members_in(ty, file);
            }
            for (i, name) in names.iter().enumerate() {
                let Some(id) = self.declare(kind, *name, file) else {
                    continue;
                };
                self.store.bind_package_scope(id);
                let source = value_source(&shape, i, names.len(), file);
                self.sym_types.insert(id, source);
            }
        }
    }

    /// Type and values of a spec, inheriting the previous spec in a
    /// constant group when both are omitted.
    fn spec_shape(&self, spec: Node<'a>, kind: SymbolKind, prev: &mut SpecShape<'a>) -> SpecShape<'a> {
        let shape = SpecShape {
            ty: spec.child_by_field_name("type"),
            values: spec
                .child_by_field_name("value")
                .map(named_children)
                .unwrap_or_default(),
        };
        if kind == SymbolKind::Constant {
            if shape.ty.is_none() && shape.values.is_empty() {
                return prev.clone();
            }
            *prev = shape.clone();
        }
        shape
    }

    fn result_types(&self, result: Option<Node<'a>>, file: usize) -> Results<'a> {
        let mut types = Vec::new();
        if let Some(result) = result {
            if result.kind() == "parameter_list" {
                for param in named_children(result).into_iter().filter(is_parameter) {
                    let Some(ty) = param.child_by_field_name("type") else {
                        continue;
                    };
                    let count = field_children(param, "name").len().max(1);
                    types.extend(std::iter::repeat_n(ty, count));
                }
            } else {
                types.push(result);
            }
        }
        Results { types, file }
    }

    /// Declare the fields of a struct type, once per node.
    fn declare_struct(&mut self, node: Node<'a>, file: usize) -> NodeKey {
        let key = (file, node.start_byte());
        if self.structs.contains_key(&key) {
            return key;
        }
        self.structs.insert(key, StructInfo::default());

        let mut info = StructInfo::default();
        let mut nested = Vec::new();
        for list in named_children(node) {
            if list.kind() != "field_declaration_list" {
                continue;
            }
            for decl in named_children(list) {
                if decl.kind() != "field_declaration" {
                    continue;
                }
                let Some(ty) = decl.child_by_field_name("type") else {
                    continue;
                };
                let names = field_children(decl, "name");
                if names.is_empty() {
                    // embedded: the field is named after the type
                    if let Some(base) = embedded_base(ty) {
                        if let Some(id) = self.declare(SymbolKind::Field, base, file) {
                            info.fields.insert(self.text_in(base, file).to_string(), id);
                            self.sym_types.insert(id, TypeSource::TypeExpr(ty, file));
                        }
                    }
                    info.embedded.push((ty, file));
                } else {
                    for name in names {
                        if let Some(id) = self.declare(SymbolKind::Field, name, file) {
                            info.fields.insert(self.text_in(name, file).to_string(), id);
                            self.sym_types.insert(id, TypeSource::TypeExpr(ty, file));
                        }
                    }
                }
                nested.push(ty);
            }
        }
        self.structs.insert(key, info);

        for ty in nested {
            self.declare_members_in(ty, file);
        }
        key
    }

    /// Declare the methods of an interface type, once per node.
    fn declare_interface(&mut self, node: Node<'a>, file: usize, owner: Option<SymbolId>) {
        if !self.interfaces.insert((file, node.start_byte())) {
            return;
        }
        let receiver = match owner.and_then(|id| self.store.symbol(id)) {
            Some(symbol) => ReceiverType::Named(symbol.name.clone()),
            None => ReceiverType::Other,
        };
        for elem in named_children(node) {
            match elem.kind() {
                "method_elem" | "method_spec" => {
                    let Some(name) = elem.child_by_field_name("name") else {
                        continue;
                    };
                    let Some(id) = self.declare_with(SymbolKind::Method, name, file, Some(receiver.clone()))
                    else {
                        continue;
                    };
                    let results = self.result_types(elem.child_by_field_name("result"), file);
                    self.results.insert(id, results);
                    if let Some(owner) = owner {
                        let method = self.text_in(name, file).to_string();
                        self.methods.entry(owner).or_default().insert(method, id);
                    }
                }
                "type_elem" | "constraint_elem" | "interface_type_name" | "type_identifier"
                | "qualified_type" => {
                    if let Some(owner) = owner {
                        let embedded = if elem.kind() == "type_elem" || elem.kind() == "constraint_elem" {
                            named_children(elem)
                        } else {
                            vec![elem]
                        };
                        self.iface_embeds
                            .entry(owner)
                            .or_default()
                            .extend(embedded.into_iter().map(|n| (n, file)));
                    }
                }
                _ => {}
            }
        }
    }

    /// Declare members of anonymous struct and interface types nested in a
    /// type expression.
    fn declare_members_in(&mut self, node: Node<'a>, file: usize) {
        match node.kind() {
            "struct_type" => {
                self.declare_struct(node, file);
            }
            "interface_type" => self.declare_interface(node, file, None),
            "parameter_list" | "function_type" => {}
            _ => {
                for child in named_children(node) {
                    self.declare_members_in(child, file);
                }
            }
        }
    }

    fn bind_methods(&mut self) {
        for (method, base, file) in std::mem::take(&mut self.pending_methods) {
            let Some(mut owner) = self.store.lookup_package_scope(self.package_id_of(file), &base) else {
                continue;
            };
            if self.kind_of(owner) != Some(SymbolKind::Type) {
                continue;
            }
            if let Some(named) = self.named.get(&owner).copied() {
                if named.alias {
                    match self.eval_type(named.type_expr, named.file, false, 0) {
                        TypeRef::Named(target) => owner = target,
                        _ => continue,
                    }
                }
            }
            let name = self
                .store
                .symbol(method)
                .map(|s| s.name.clone())
                .unwrap_or_default();
            self.methods.entry(owner).or_default().insert(name, method);
        }
    }

    // ------------------------------------------------------------------------
    // Name lookup
    // ------------------------------------------------------------------------

    fn lookup_name(&self, name: &str, file: usize, locals: bool) -> Option<Binding> {
        if name == "_" {
            return None;
        }
        if locals {
            if let Some(id) = self.scopes.lookup(name) {
                return Some(Binding::Symbol(id));
            }
        }
        let imports = &self.imports[file];
        if let Some(binding) = imports.names.get(name) {
            return Some(Binding::Import(*binding));
        }
        if let Some(id) = self.store.lookup_package_scope(self.package_id_of(file), name) {
            return Some(Binding::Symbol(id));
        }
        imports
            .dot
            .iter()
            .find_map(|&unit| self.exported_in(unit, name))
            .map(Binding::Symbol)
    }

    fn exported_in(&self, unit: usize, name: &str) -> Option<SymbolId> {
        if !name.starts_with(|c: char| c.is_uppercase()) {
            return None;
        }
        self.store.lookup_package_scope(self.packages[unit].id, name)
    }

    fn qualified(&self, package: &str, name: &str, file: usize) -> Option<SymbolId> {
        let unit = self.imports[file].names.get(package)?.package?;
        self.exported_in(unit, name)
    }

    // ------------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------------

    fn eval_type(&self, node: Node<'a>, file: usize, locals: bool, depth: usize) -> TypeRef {
        if depth > MAX_DEPTH {
            return TypeRef::Unknown;
        }
        let first = || named_children(node).into_iter().next();
        match node.kind() {
            "type_identifier" | "identifier" => {
                match self.lookup_name(self.text_in(node, file), file, locals) {
                    Some(Binding::Symbol(id)) => self.type_of_type_symbol(id, depth),
                    _ => TypeRef::Unknown,
                }
            }
            "qualified_type" => {
                let (Some(package), Some(name)) =
                    (node.child_by_field_name("package"), node.child_by_field_name("name"))
                else {
                    return TypeRef::Unknown;
                };
                self.qualified(self.text_in(package, file), self.text_in(name, file), file)
                    .map_or(TypeRef::Unknown, |id| self.type_of_type_symbol(id, depth))
            }
            "pointer_type" => first().map_or(TypeRef::Unknown, |inner| {
                TypeRef::pointer(self.eval_type(inner, file, locals, depth + 1))
            }),
            "parenthesized_type" | "type_elem" | "type_constraint" => {
                let children = named_children(node);
                match children.as_slice() {
                    [only] => self.eval_type(*only, file, locals, depth + 1),
                    _ => TypeRef::Unknown,
                }
            }
            "generic_type" => node
                .child_by_field_name("type")
                .map_or(TypeRef::Unknown, |inner| self.eval_type(inner, file, locals, depth + 1)),
            "slice_type" | "array_type" | "implicit_length_array_type" => {
                self.container(node, "element", file, locals, depth, TypeRef::Slice)
            }
            "map_type" => self.container(node, "value", file, locals, depth, TypeRef::Map),
            "channel_type" => self.container(node, "value", file, locals, depth, TypeRef::Chan),
            "struct_type" => {
                let key = (file, node.start_byte());
                if self.structs.contains_key(&key) {
                    TypeRef::Struct(key)
                } else {
                    TypeRef::Unknown
                }
            }
            _ => TypeRef::Unknown,
        }
    }

    fn container(
        &self,
        node: Node<'a>,
        field: &str,
        file: usize,
        locals: bool,
        depth: usize,
        wrap: fn(Box<TypeRef>) -> TypeRef,
    ) -> TypeRef {
        let elem = node
            .child_by_field_name(field)
            .map_or(TypeRef::Unknown, |e| self.eval_type(e, file, locals, depth + 1));
        wrap(Box::new(elem))
    }

    /// The type denoted by a type name, following aliases.
    fn type_of_type_symbol(&self, id: SymbolId, depth: usize) -> TypeRef {
        if self.kind_of(id) != Some(SymbolKind::Type) {
            return TypeRef::Unknown;
        }
        match self.named.get(&id) {
            Some(named) if named.alias => self.eval_type(named.type_expr, named.file, false, depth + 1),
            _ => TypeRef::Named(id),
        }
    }

    fn type_of_value_symbol(&self, id: SymbolId, depth: usize) -> TypeRef {
        if depth > MAX_DEPTH {
            return TypeRef::Unknown;
        }
        match self.sym_types.get(&id) {
            Some(TypeSource::Known(ty)) => ty.clone(),
            Some(TypeSource::TypeExpr(node, file)) => self.eval_type(*node, *file, false, depth + 1),
            Some(TypeSource::Value { expr, file, index }) => {
                self.infer(*expr, *index, *file, false, depth + 1)
            }
            None => TypeRef::Unknown,
        }
    }

    /// Infer the type of result `index` of an expression.
    fn infer(&self, node: Node<'a>, index: usize, file: usize, locals: bool, depth: usize) -> TypeRef {
        if depth > MAX_DEPTH {
            return TypeRef::Unknown;
        }
        let field = |name: &str| node.child_by_field_name(name);
        match node.kind() {
            "identifier" => match self.lookup_name(self.text_in(node, file), file, locals) {
                Some(Binding::Symbol(id)) => match self.kind_of(id) {
                    // a type in operand position, as in `(*T).M`
                    Some(SymbolKind::Type) => self.type_of_type_symbol(id, depth),
                    _ => self.type_of_value_symbol(id, depth),
                },
                _ => TypeRef::Unknown,
            },
            "parenthesized_expression" => named_children(node)
                .into_iter()
                .next()
                .map_or(TypeRef::Unknown, |inner| self.infer(inner, index, file, locals, depth + 1)),
            "composite_literal" => field("type")
                .map_or(TypeRef::Unknown, |ty| self.eval_type(ty, file, locals, depth + 1)),
            "unary_expression" => {
                let Some(operand) = field("operand") else {
                    return TypeRef::Unknown;
                };
                let operand_type = self.infer(operand, 0, file, locals, depth + 1);
                match field("operator").map(|op| self.text_in(op, file)) {
                    Some("&") => TypeRef::pointer(operand_type),
                    Some("*") => operand_type.deref().clone(),
                    Some("<-") => operand_type.element(),
                    _ => TypeRef::Unknown,
                }
            }
            "call_expression" => self.infer_call(node, index, file, locals, depth),
            "type_conversion_expression" => field("type")
                .map_or(TypeRef::Unknown, |ty| self.eval_type(ty, file, locals, depth + 1)),
            "type_assertion_expression" if index == 0 => field("type")
                .map_or(TypeRef::Unknown, |ty| self.eval_type(ty, file, locals, depth + 1)),
            "selector_expression" => self
                .resolve_selector(node, file, locals, depth + 1)
                .map_or(TypeRef::Unknown, |id| self.type_of_value_symbol(id, depth + 1)),
            "index_expression" => field("operand")
                .map_or(TypeRef::Unknown, |op| self.infer(op, 0, file, locals, depth + 1).element()),
            "slice_expression" => field("operand")
                .map_or(TypeRef::Unknown, |op| self.infer(op, 0, file, locals, depth + 1)),
            _ => TypeRef::Unknown,
        }
    }

    fn infer_call(&self, node: Node<'a>, index: usize, file: usize, locals: bool, depth: usize) -> TypeRef {
        let Some(mut function) = node.child_by_field_name("function") else {
            return TypeRef::Unknown;
        };
        while function.kind() == "parenthesized_expression" {
            match named_children(function).into_iter().next() {
                Some(inner) => function = inner,
                None => return TypeRef::Unknown,
            }
        }
        let callee = match function.kind() {
            "identifier" => match self.lookup_name(self.text_in(function, file), file, locals) {
                Some(Binding::Symbol(id)) => id,
                Some(Binding::Import(_)) => return TypeRef::Unknown,
                None => return self.infer_builtin(node, function, file, locals, depth),
            },
            "selector_expression" => match self.resolve_selector(function, file, locals, depth + 1) {
                Some(id) => id,
                None => return TypeRef::Unknown,
            },
            _ => return TypeRef::Unknown,
        };
        match self.kind_of(callee) {
            Some(SymbolKind::Function | SymbolKind::Method) => {
                let Some(results) = self.results.get(&callee) else {
                    return TypeRef::Unknown;
                };
                results.types.get(index).map_or(TypeRef::Unknown, |ty| {
                    self.eval_type(*ty, results.file, false, depth + 1)
                })
            }
            Some(SymbolKind::Type) if index == 0 => self.type_of_type_symbol(callee, depth),
            _ => TypeRef::Unknown,
        }
    }

    fn infer_builtin(
        &self,
        call: Node<'a>,
        function: Node<'a>,
        file: usize,
        locals: bool,
        depth: usize,
    ) -> TypeRef {
        let first_arg = call
            .child_by_field_name("arguments")
            .and_then(|args| named_children(args).into_iter().next());
        let Some(arg) = first_arg else {
            return TypeRef::Unknown;
        };
        match self.text_in(function, file) {
            "new" => TypeRef::pointer(self.eval_type(arg, file, locals, depth + 1)),
            "make" => self.eval_type(arg, file, locals, depth + 1),
            _ => TypeRef::Unknown,
        }
    }

    // ------------------------------------------------------------------------
    // Selectors and members
    // ------------------------------------------------------------------------

    /// The declaration selected by `operand.field`, if it can be determined.
    fn resolve_selector(&self, node: Node<'a>, file: usize, locals: bool, depth: usize) -> Option<SymbolId> {
        let operand = node.child_by_field_name("operand")?;
        let field = self.text_in(node.child_by_field_name("field")?, file);

        if operand.kind() == "identifier" {
            if let Some(Binding::Import(import)) =
                self.lookup_name(self.text_in(operand, file), file, locals)
            {
                return self.exported_in(import.package?, field);
            }
        }
        let ty = self.infer(operand, 0, file, locals, depth + 1);
        self.lookup_member(&ty, field)
    }

    /// Named types along the underlying-type chain, and the first non-named
    /// type reached.
    fn named_chain(&self, ty: &TypeRef) -> (Vec<SymbolId>, TypeRef) {
        let mut ids = Vec::new();
        let mut cur = ty.deref().clone();
        for _ in 0..MAX_DEPTH {
            let TypeRef::Named(id) = cur else {
                break;
            };
            if ids.contains(&id) {
                return (ids, TypeRef::Unknown);
            }
            ids.push(id);
            cur = match self.named.get(&id) {
                Some(named) => self.eval_type(named.type_expr, named.file, false, 1),
                None => TypeRef::Unknown,
            };
        }
        (ids, cur)
    }

    fn struct_of(&self, ty: &TypeRef) -> Option<NodeKey> {
        match self.named_chain(ty).1 {
            TypeRef::Struct(key) => Some(key),
            _ => None,
        }
    }

    /// Find a field or method by name, shallowest embedding depth first.
    fn lookup_member(&self, ty: &TypeRef, name: &str) -> Option<SymbolId> {
        if ty.is_unknown() {
            return None;
        }
        let mut level = vec![ty.deref().clone()];
        for _ in 0..MAX_EMBED_DEPTH {
            let mut next = Vec::new();
            for candidate in &level {
                let (ids, underlying) = self.named_chain(candidate);
                for id in &ids {
                    if let Some(method) = self.methods.get(id).and_then(|m| m.get(name)) {
                        return Some(*method);
                    }
                }
                if let TypeRef::Struct(key) = underlying {
                    if let Some(info) = self.structs.get(&key) {
                        if let Some(field) = info.fields.get(name) {
                            return Some(*field);
                        }
                        next.extend(
                            info.embedded
                                .iter()
                                .map(|(node, file)| self.eval_type(*node, *file, false, 1)),
                        );
                    }
                }
                for id in &ids {
                    if let Some(embeds) = self.iface_embeds.get(id) {
                        next.extend(embeds.iter().map(|(node, file)| self.eval_type(*node, *file, false, 1)));
                    }
                }
            }
            next.retain(|t| !t.is_unknown());
            if next.is_empty() {
                break;
            }
            level = next;
        }
        None
    }

    // ------------------------------------------------------------------------
    // Pass 2: uses
    // ------------------------------------------------------------------------

    fn collect_uses(&mut self) {
        let order: Vec<usize> = self
            .packages
            .iter()
            .flat_map(|p| p.files.iter().copied())
            .collect();
        for file in order {
            self.cur_file = file;
            self.scopes = Scopes::new();
            let root = self.root_node(file);
            for decl in named_children(root) {
                match decl.kind() {
                    "function_declaration" | "method_declaration" => self.walk_function(decl),
                    "type_declaration" => self.walk_type_decl(decl, true),
                    "var_declaration" => self.walk_value_decl(decl, SymbolKind::Variable, true),
                    "const_declaration" => self.walk_value_decl(decl, SymbolKind::Constant, true),
                    _ => {}
                }
            }
        }
    }

    /// Record a use of the identifier at `node`, if it resolves.
    fn use_name(&mut self, node: Node<'a>) {
        let name = self.text(node);
        match self.lookup_name(name, self.cur_file, true) {
            Some(Binding::Symbol(id)) => self.record(id, node),
            Some(Binding::Import(ImportBinding { alias: Some(alias), .. })) => self.record(alias, node),
            _ => {}
        }
    }

    fn walk_function(&mut self, decl: Node<'a>) {
        self.scopes.push();

        if let Some(receiver) = decl.child_by_field_name("receiver") {
            for param in named_children(receiver).into_iter().filter(is_parameter) {
                let Some(ty) = param.child_by_field_name("type") else {
                    continue;
                };
                self.walk_receiver_type(ty);
                let receiver_type = self.eval_type(ty, self.cur_file, true, 0);
                for name in field_children(param, "name") {
                    self.declare_local(SymbolKind::Parameter, name, receiver_type.clone());
                }
            }
        }
        if let Some(params) = decl.child_by_field_name("type_parameters") {
            self.walk_type_parameters(params);
        }
        self.walk_signature(decl);
        if let Some(body) = decl.child_by_field_name("body") {
            self.walk_statements(body);
        }

        self.scopes.pop();
    }

    /// Receiver types use the base type and declare any type parameters.
    fn walk_receiver_type(&mut self, ty: Node<'a>) {
        match ty.kind() {
            "pointer_type" | "parenthesized_type" => {
                for child in named_children(ty) {
                    self.walk_receiver_type(child);
                }
            }
            "generic_type" => {
                if let Some(base) = ty.child_by_field_name("type") {
                    self.walk_type(base);
                }
                if let Some(args) = ty.child_by_field_name("type_arguments") {
                    for arg in descendants_of_kind(args, "type_identifier") {
                        self.declare_local(SymbolKind::TypeParameter, arg, TypeRef::Unknown);
                    }
                }
            }
            _ => self.walk_type(ty),
        }
    }

    fn walk_type_parameters(&mut self, list: Node<'a>) {
        let decls: Vec<Node<'a>> = named_children(list)
            .into_iter()
            .filter(|n| n.kind() == "type_parameter_declaration")
            .collect();
        for decl in &decls {
            for name in field_children(*decl, "name") {
                self.declare_local(SymbolKind::TypeParameter, name, TypeRef::Unknown);
            }
        }
        for decl in decls {
            if let Some(constraint) = decl.child_by_field_name("type") {
                self.walk_type(constraint);
            }
        }
    }

    /// Parameters and results of a function, method, literal or function type.
    fn walk_signature(&mut self, node: Node<'a>) {
        if let Some(params) = node.child_by_field_name("parameters") {
            self.walk_params(params);
        }
        if let Some(result) = node.child_by_field_name("result") {
            if result.kind() == "parameter_list" {
                self.walk_params(result);
            } else {
                self.walk_type(result);
            }
        }
    }

    fn walk_params(&mut self, list: Node<'a>) {
        for param in named_children(list).into_iter().filter(is_parameter) {
            let Some(ty) = param.child_by_field_name("type") else {
                continue;
            };
            self.walk_type(ty);
            let mut param_type = self.eval_type(ty, self.cur_file, true, 0);
            if param.kind() == "variadic_parameter_declaration" {
                param_type = TypeRef::Slice(Box::new(param_type));
            }
            for name in field_children(param, "name") {
                self.declare_local(SymbolKind::Parameter, name, param_type.clone());
            }
        }
    }

    fn walk_type_decl(&mut self, decl: Node<'a>, package_level: bool) {
        for spec in type_specs(decl) {
            let Some(name) = spec.child_by_field_name("name") else {
                continue;
            };
            if !package_level {
                if let Some(id) = self.declare_type_spec(spec, self.cur_file, false) {
                    let name = self.text(name);
                    self.scopes.declare(name, id);
                }
            }
            let Some(ty) = spec.child_by_field_name("type") else {
                continue;
            };
            match spec.child_by_field_name("type_parameters") {
                Some(params) => {
                    self.scopes.push();
                    self.walk_type_parameters(params);
                    self.walk_type(ty);
                    self.scopes.pop();
                }
                None => self.walk_type(ty),
            }
        }
    }

    fn walk_value_decl(&mut self, decl: Node<'a>, kind: SymbolKind, package_level: bool) {
        let mut prev = SpecShape::default();
        for spec in value_specs(decl) {
            let shape = self.spec_shape(spec, kind, &mut prev);
            if let Some(ty) = spec.child_by_field_name("type") {
                self.walk_type(ty);
            }
            if let Some(values) = spec.child_by_field_name("value") {
                self.walk_expr(values);
            }
            if package_level {
                continue;
            }

            let names = field_children(spec, "name");
            let types: Vec<TypeRef> = (0..names.len())
                .map(|i| match value_source(&shape, i, names.len(), self.cur_file) {
                    TypeSource::Known(ty) => ty,
                    TypeSource::TypeExpr(node, file) => self.eval_type(node, file, true, 0),
                    TypeSource::Value { expr, file, index } => self.infer(expr, index, file, true, 0),
                })
                .collect();
            for (name, ty) in names.into_iter().zip(types) {
                self.declare_local(kind, name, ty);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    fn walk_block(&mut self, block: Node<'a>) {
        self.scopes.push();
        self.walk_statements(block);
        self.scopes.pop();
    }

    fn walk_statements(&mut self, node: Node<'a>) {
        for stmt in named_children(node) {
            self.walk_stmt(stmt);
        }
    }

    fn walk_stmt(&mut self, stmt: Node<'a>) {
        match stmt.kind() {
            "block" => self.walk_block(stmt),
            "statement_list" => self.walk_statements(stmt),
            "short_var_declaration" => self.walk_short_var(stmt),
            "var_declaration" => self.walk_value_decl(stmt, SymbolKind::Variable, false),
            "const_declaration" => self.walk_value_decl(stmt, SymbolKind::Constant, false),
            "type_declaration" => self.walk_type_decl(stmt, false),
            "if_statement" => {
                self.scopes.push();
                if let Some(init) = stmt.child_by_field_name("initializer") {
                    self.walk_stmt(init);
                }
                if let Some(cond) = stmt.child_by_field_name("condition") {
                    self.walk_expr(cond);
                }
                if let Some(then) = stmt.child_by_field_name("consequence") {
                    self.walk_block(then);
                }
                if let Some(alt) = stmt.child_by_field_name("alternative") {
                    self.walk_stmt(alt);
                }
                self.scopes.pop();
            }
            "for_statement" => self.walk_for(stmt),
            "expression_switch_statement" => self.walk_expression_switch(stmt),
            "type_switch_statement" => self.walk_type_switch(stmt),
            "select_statement" => {
                for clause in named_children(stmt) {
                    self.walk_clause(clause);
                }
            }
            "labeled_statement" => {
                for child in named_children(stmt) {
                    if child.kind() != "label_name" {
                        self.walk_stmt(child);
                    }
                }
            }
            "receive_statement" => self.walk_receive(stmt),
            "break_statement" | "continue_statement" | "goto_statement" | "fallthrough_statement"
            | "empty_statement" | "comment" => {}
            _ => self.walk_expr(stmt),
        }
    }

    /// `:=` declares the names new to the innermost scope; the rest are uses.
    fn walk_short_var(&mut self, stmt: Node<'a>) {
        let rights = stmt
            .child_by_field_name("right")
            .map(named_children)
            .unwrap_or_default();
        for right in &rights {
            self.walk_expr(*right);
        }
        let lefts = stmt
            .child_by_field_name("left")
            .map(named_children)
            .unwrap_or_default();
        let types: Vec<TypeRef> = (0..lefts.len())
            .map(|i| self.assigned_type(&rights, i, lefts.len()))
            .collect();
        for (left, ty) in lefts.into_iter().zip(types) {
            if left.kind() != "identifier" {
                self.walk_expr(left);
                continue;
            }
            let name = self.text(left);
            if name == "_" {
                continue;
            }
            if self.scopes.declared_in_innermost(name) {
                self.use_name(left);
            } else {
                self.declare_local(SymbolKind::Variable, left, ty);
            }
        }
    }

    fn assigned_type(&self, rights: &[Node<'a>], i: usize, count: usize) -> TypeRef {
        if rights.len() == count {
            self.infer(rights[i], 0, self.cur_file, true, 0)
        } else if rights.len() == 1 {
            self.infer(rights[0], i, self.cur_file, true, 0)
        } else {
            TypeRef::Unknown
        }
    }

    fn walk_for(&mut self, stmt: Node<'a>) {
        self.scopes.push();
        for child in named_children(stmt) {
            match child.kind() {
                "for_clause" => {
                    if let Some(init) = child.child_by_field_name("initializer") {
                        self.walk_stmt(init);
                    }
                    if let Some(cond) = child.child_by_field_name("condition") {
                        self.walk_expr(cond);
                    }
                    if let Some(update) = child.child_by_field_name("update") {
                        self.walk_stmt(update);
                    }
                }
                "range_clause" => self.walk_range(child),
                "block" => self.walk_block(child),
                _ => self.walk_expr(child),
            }
        }
        self.scopes.pop();
    }

    fn walk_range(&mut self, clause: Node<'a>) {
        let mut ranged = TypeRef::Unknown;
        if let Some(right) = clause.child_by_field_name("right") {
            self.walk_expr(right);
            ranged = self.infer(right, 0, self.cur_file, true, 0);
        }
        let Some(left) = clause.child_by_field_name("left") else {
            return;
        };
        if !has_token(clause, ":=") {
            self.walk_expr(left);
            return;
        }
        for (i, name) in named_children(left).into_iter().enumerate() {
            if name.kind() != "identifier" {
                continue;
            }
            let ty = match (i, ranged.deref()) {
                (0, TypeRef::Chan(_)) | (1, _) => ranged.element(),
                _ => TypeRef::Unknown,
            };
            self.declare_local(SymbolKind::Variable, name, ty);
        }
    }

    fn walk_expression_switch(&mut self, stmt: Node<'a>) {
        self.scopes.push();
        if let Some(init) = stmt.child_by_field_name("initializer") {
            self.walk_stmt(init);
        }
        if let Some(value) = stmt.child_by_field_name("value") {
            self.walk_expr(value);
        }
        for clause in named_children(stmt) {
            self.walk_clause(clause);
        }
        self.scopes.pop();
    }

    /// The guard variable of a type switch is one variable for all clauses.
    fn walk_type_switch(&mut self, stmt: Node<'a>) {
        self.scopes.push();
        if let Some(init) = stmt.child_by_field_name("initializer") {
            self.walk_stmt(init);
        }
        if let Some(value) = stmt.child_by_field_name("value") {
            self.walk_expr(value);
        }
        if let Some(alias) = stmt.child_by_field_name("alias") {
            for name in named_children(alias) {
                if name.kind() == "identifier" {
                    self.declare_local(SymbolKind::Variable, name, TypeRef::Unknown);
                }
            }
        }
        for clause in named_children(stmt) {
            self.walk_clause(clause);
        }
        self.scopes.pop();
    }

    /// A case clause of a switch or select: its head, then its body in a
    /// fresh scope. Nodes that are not clauses are ignored.
    fn walk_clause(&mut self, clause: Node<'a>) {
        let head: Vec<Node<'a>> = match clause.kind() {
            "expression_case" => clause.child_by_field_name("value").into_iter().collect(),
            "type_case" => field_children(clause, "type"),
            "communication_case" => clause.child_by_field_name("communication").into_iter().collect(),
            "default_case" => Vec::new(),
            _ => return,
        };
        let head_ids: HashSet<usize> = head.iter().map(|n| n.id()).collect();

        self.scopes.push();
        for node in &head {
            match clause.kind() {
                "type_case" => self.walk_type(*node),
                "communication_case" => self.walk_stmt(*node),
                _ => self.walk_expr(*node),
            }
        }
        for child in named_children(clause) {
            if !head_ids.contains(&child.id()) {
                self.walk_stmt(child);
            }
        }
        self.scopes.pop();
    }

    fn walk_receive(&mut self, stmt: Node<'a>) {
        let mut received = TypeRef::Unknown;
        if let Some(right) = stmt.child_by_field_name("right") {
            self.walk_expr(right);
            received = self.infer(right, 0, self.cur_file, true, 0);
        }
        let Some(left) = stmt.child_by_field_name("left") else {
            return;
        };
        if !has_token(stmt, ":=") {
            self.walk_expr(left);
            return;
        }
        for (i, name) in named_children(left).into_iter().enumerate() {
            if name.kind() == "identifier" {
                let ty = if i == 0 { received.clone() } else { TypeRef::Unknown };
                self.declare_local(SymbolKind::Variable, name, ty);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    fn walk_expr(&mut self, node: Node<'a>) {
        let kind = node.kind();
        if TYPE_KINDS.contains(&kind) {
            self.walk_type(node);
            return;
        }
        match kind {
            "identifier" => self.use_name(node),
            "selector_expression" => {
                if let Some(operand) = node.child_by_field_name("operand") {
                    self.walk_expr(operand);
                }
                if let Some(field) = node.child_by_field_name("field") {
                    if let Some(id) = self.resolve_selector(node, self.cur_file, true, 0) {
                        self.record(id, field);
                    }
                }
            }
            "composite_literal" => {
                let mut literal_type = TypeRef::Unknown;
                if let Some(ty) = node.child_by_field_name("type") {
                    self.walk_type(ty);
                    literal_type = self.eval_type(ty, self.cur_file, true, 0);
                }
                if let Some(body) = node.child_by_field_name("body") {
                    self.walk_literal_value(body, &literal_type);
                }
            }
            "func_literal" => {
                self.scopes.push();
                self.walk_signature(node);
                if let Some(body) = node.child_by_field_name("body") {
                    self.walk_statements(body);
                }
                self.scopes.pop();
            }
            "field_identifier" | "label_name" | "package_identifier" | "comment" => {}
            _ => {
                for child in named_children(node) {
                    self.walk_expr(child);
                }
            }
        }
    }

    fn walk_literal_value(&mut self, body: Node<'a>, literal_type: &TypeRef) {
        let fields = self
            .struct_of(literal_type)
            .and_then(|key| self.structs.get(&key))
            .map(|info| info.fields.clone());
        let element_type = literal_type.element();

        for child in named_children(body) {
            match child.kind() {
                "keyed_element" => {
                    let parts = named_children(child);
                    let key = child.child_by_field_name("key").or_else(|| parts.first().copied());
                    let value = child.child_by_field_name("value").or_else(|| parts.get(1).copied());
                    if let Some(key) = key {
                        let inner = unwrap_literal_element(key);
                        let field = match (&fields, inner.kind()) {
                            (Some(fields), "identifier" | "field_identifier") => {
                                fields.get(self.text(inner)).copied()
                            }
                            _ => None,
                        };
                        match field {
                            Some(id) => self.record(id, inner),
                            None if fields.is_some() => {}
                            None => self.walk_literal_element(key, &TypeRef::Unknown),
                        }
                    }
                    if let Some(value) = value {
                        let value_type = if fields.is_some() {
                            TypeRef::Unknown
                        } else {
                            element_type.clone()
                        };
                        self.walk_literal_element(value, &value_type);
                    }
                }
                "comment" => {}
                _ => self.walk_literal_element(child, &element_type),
            }
        }
    }

    /// Elements may elide their composite type, which is the container's
    /// element type.
    fn walk_literal_element(&mut self, element: Node<'a>, element_type: &TypeRef) {
        let inner = unwrap_literal_element(element);
        if inner.kind() == "literal_value" {
            self.walk_literal_value(inner, element_type);
        } else {
            self.walk_expr(inner);
        }
    }

    // ------------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------------

    fn walk_type(&mut self, node: Node<'a>) {
        match node.kind() {
            "type_identifier" | "identifier" => self.use_name(node),
            "qualified_type" => {
                if let Some(package) = node.child_by_field_name("package") {
                    self.use_name(package);
                }
                let (Some(package), Some(name)) =
                    (node.child_by_field_name("package"), node.child_by_field_name("name"))
                else {
                    return;
                };
                if let Some(id) = self.qualified(self.text(package), self.text(name), self.cur_file) {
                    self.record(id, name);
                }
            }
            "struct_type" => {
                self.declare_struct(node, self.cur_file);
                for list in named_children(node) {
                    for decl in named_children(list) {
                        if let Some(ty) = decl.child_by_field_name("type") {
                            self.walk_type(ty);
                        }
                    }
                }
            }
            "interface_type" => {
                self.declare_interface(node, self.cur_file, None);
                for elem in named_children(node) {
                    match elem.kind() {
                        "method_elem" | "method_spec" => {
                            self.scopes.push();
                            self.walk_signature(elem);
                            self.scopes.pop();
                        }
                        "comment" => {}
                        _ => self.walk_type(elem),
                    }
                }
            }
            "function_type" => {
                self.scopes.push();
                self.walk_signature(node);
                self.scopes.pop();
            }
            "array_type" => {
                if let Some(length) = node.child_by_field_name("length") {
                    self.walk_expr(length);
                }
                if let Some(element) = node.child_by_field_name("element") {
                    self.walk_type(element);
                }
            }
            "comment" => {}
            _ => {
                for child in named_children(node) {
                    self.walk_type(child);
                }
            }
        }
    }
}

// ============================================================================
// Syntax helpers
// ============================================================================

fn position(node: Node<'_>) -> Position {
    let point = node.start_position();
    Position::new(point.row as u32 + 1, point.column as u32 + 1, node.start_byte())
}

fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

fn field_children<'t>(node: Node<'t>, field: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// Does the node have an anonymous child token `token`?
fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}

fn is_parameter(node: &Node<'_>) -> bool {
    matches!(
        node.kind(),
        "parameter_declaration" | "variadic_parameter_declaration"
    )
}

fn descendants_of_kind<'t>(node: Node<'t>, kind: &str) -> Vec<Node<'t>> {
    let mut found = Vec::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if current.kind() == kind {
            found.push(current);
            continue;
        }
        let mut children = named_children(current);
        children.reverse();
        stack.extend(children);
    }
    found
}

/// `type_spec` and `type_alias` nodes of a type declaration.
fn type_specs(decl: Node<'_>) -> Vec<Node<'_>> {
    named_children(decl)
        .into_iter()
        .filter(|n| n.kind() == "type_spec" || n.kind() == "type_alias")
        .collect()
}

/// `var_spec` and `const_spec` nodes of a declaration, flattening spec lists.
fn value_specs(decl: Node<'_>) -> Vec<Node<'_>> {
    let mut specs = Vec::new();
    for child in named_children(decl) {
        match child.kind() {
            "var_spec" | "const_spec" => specs.push(child),
            kind if kind.ends_with("_spec_list") => specs.extend(value_specs(child)),
            _ => {}
        }
    }
    specs
}

fn value_source<'a>(shape: &SpecShape<'a>, i: usize, names: usize, file: usize) -> TypeSource<'a> {
    if let Some(ty) = shape.ty {
        TypeSource::TypeExpr(ty, file)
    } else if shape.values.len() == names {
        TypeSource::Value {
            expr: shape.values[i],
            file,
            index: 0,
        }
    } else if shape.values.len() == 1 {
        TypeSource::Value {
            expr: shape.values[0],
            file,
            index: i,
        }
    } else {
        TypeSource::Known(TypeRef::Unknown)
    }
}

/// The identifier naming an embedded field: `T`, `*T`, `pkg.T`, `T[A]`.
fn embedded_base(ty: Node<'_>) -> Option<Node<'_>> {
    match ty.kind() {
        "type_identifier" => Some(ty),
        "qualified_type" => ty.child_by_field_name("name"),
        "generic_type" => ty.child_by_field_name("type").and_then(embedded_base),
        "pointer_type" => named_children(ty).into_iter().next().and_then(embedded_base),
        _ => None,
    }
}

fn unwrap_literal_element(node: Node<'_>) -> Node<'_> {
    if node.kind() == "literal_element" {
        if let Some(inner) = named_children(node).into_iter().next() {
            return inner;
        }
    }
    node
}

/// Local name of an import without an explicit name: the last path element,
/// skipping a major-version suffix and trimming a `.vN`-style extension.
fn default_import_name(path: &str) -> &str {
    let mut segments = path.rsplit('/');
    let mut last = segments.next().unwrap_or(path);
    let is_version = |s: &str| {
        s.len() > 1 && s.starts_with('v') && s[1..].bytes().all(|b| b.is_ascii_digit())
    };
    if is_version(last) {
        if let Some(prev) = segments.next() {
            last = prev;
        }
    }
    let last = last.split('.').next().unwrap_or(last);
    last.strip_prefix("go-").unwrap_or(last)
}
