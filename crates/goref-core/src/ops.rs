//! The two refactoring operations: `list_refs` and `rename`.
//!
//! Both run the same front half in strict sequence:
//! locate root -> load semantic model -> find target file -> resolve symbol.
//! `list_refs` then enumerates uses; `rename` validates the new name and
//! rewrites the declaration plus every use.
//!
//! Each call loads a fresh model from disk; nothing is cached between calls.

use std::path::Path;

use tracing::{debug, info, info_span};

use crate::adapter::LanguageAdapter;
use crate::error::RefactorError;
use crate::facts::{FactsStore, Symbol, SymbolId};
use crate::output::{ListRefsReport, RenameReport, SymbolInfo};
use crate::refs::{enumerate, uses_of};
use crate::resolve::resolve;
use crate::rewrite::{rewrite, OccurrenceSet, WriteMode};
use crate::symbol::SymbolSpec;
use crate::validate::{check_collision, check_new_name};
use crate::workspace::{absolute_path, find_program_root};

/// Options for [`rename`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameOptions {
    pub write_mode: WriteMode,
}

/// A loaded program with its resolved target.
struct Resolved {
    store: FactsStore,
    target: SymbolId,
}

impl Resolved {
    fn symbol(&self) -> Result<&Symbol, RefactorError> {
        self.store
            .symbol(self.target)
            .ok_or_else(|| RefactorError::internal(format!("{} missing from store", self.target)))
    }
}

fn load_and_resolve<A: LanguageAdapter>(
    adapter: &A,
    file: &Path,
    symbol: &str,
) -> Result<Resolved, RefactorError> {
    let spec = SymbolSpec::parse(symbol);
    if spec.name.is_empty() {
        return Err(RefactorError::invalid_args("symbol name must not be empty"));
    }

    let root = find_program_root(file, adapter.root_marker())?;
    let abs_file = absolute_path(file)?;
    info!(
        "loading {} program at {}",
        adapter.language(),
        root.display()
    );

    let store = adapter
        .load(&root)
        .map_err(|e| RefactorError::load_error(&e))?;
    debug!(
        packages = store.package_count(),
        files = store.file_count(),
        symbols = store.symbol_count(),
        references = store.reference_count(),
        "semantic model loaded"
    );

    let target_file = store
        .file_by_path(&abs_file)
        .ok_or_else(|| RefactorError::FileNotInProgram {
            file: file.to_path_buf(),
        })?;

    let target = resolve(store.symbols_in_file(target_file.file_id), &spec)
        .map_err(|e| RefactorError::from_resolve(e, file))?
        .symbol_id;

    Ok(Resolved { store, target })
}

/// List every reference to `symbol`, declared in `file`, across the program.
pub fn list_refs<A: LanguageAdapter>(
    adapter: &A,
    file: &Path,
    symbol: &str,
) -> Result<ListRefsReport, RefactorError> {
    let _span = info_span!("list_refs", symbol).entered();

    let resolved = load_and_resolve(adapter, file, symbol)?;
    let target = resolved.symbol()?;

    Ok(ListRefsReport {
        symbol: SymbolInfo::from_symbol(&resolved.store, target),
        references: enumerate(&resolved.store, resolved.target),
    })
}

/// Rename `old_symbol`, declared in `file`, to `new_symbol` program-wide.
///
/// Files are mutated in place (or atomically per file with
/// [`WriteMode::Atomic`]). There is no cross-file rollback.
pub fn rename<A: LanguageAdapter>(
    adapter: &A,
    file: &Path,
    old_symbol: &str,
    new_symbol: &str,
    options: RenameOptions,
) -> Result<RenameReport, RefactorError> {
    let _span = info_span!("rename", old = old_symbol, new = new_symbol).entered();

    let resolved = load_and_resolve(adapter, file, old_symbol)?;
    let store = &resolved.store;
    let target = resolved.symbol()?;

    let new_name = check_new_name(target, new_symbol, |name| adapter.check_identifier(name))?;
    check_collision(store, target, &new_name)?;

    let occurrences = occurrence_set(store, target);
    if occurrences.is_empty() {
        return Err(RefactorError::NoOccurrences {
            symbol: old_symbol.to_string(),
        });
    }
    debug!(
        files = occurrences.file_count(),
        offsets = occurrences.offset_count(),
        "collected occurrences"
    );

    let result = rewrite(&occurrences, &target.name, &new_name, options.write_mode)?;
    info!(
        "renamed {} -> {}: {} occurrences in {} files",
        target.name,
        new_name,
        result.total(),
        result.files.len()
    );

    Ok(RenameReport {
        old_symbol: old_symbol.to_string(),
        new_symbol: new_symbol.to_string(),
        new_name,
        symbol: SymbolInfo::from_symbol(store, target),
        result,
    })
}

/// The declaring identifier plus every use of `target`, grouped by file.
pub fn occurrence_set(store: &FactsStore, target: &Symbol) -> OccurrenceSet {
    let mut set = OccurrenceSet::new();
    if let Some(file) = store.file(target.decl_file_id) {
        set.add(file.rel_path.clone(), file.path.clone(), target.decl_pos.offset);
    }
    for reference in uses_of(store.references(), target.symbol_id) {
        if let Some(file) = store.file(reference.file_id) {
            set.add(file.rel_path.clone(), file.path.clone(), reference.pos.offset);
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{File, Package, Position, Reference, SymbolKind};
    use crate::text::{byte_offset_to_position, identifier_occurrences};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[derive(Debug, thiserror::Error)]
    #[error("fixture load failed")]
    struct FixtureError;

    /// Builds a store by scanning each file for a fixed list of names.
    ///
    /// Every occurrence of a name in `decl_file` at its first position is the
    /// declaration; every other whole-identifier occurrence is a use.
    struct FixtureAdapter {
        decls: Vec<(&'static str, &'static str)>,
        fail: bool,
    }

    impl LanguageAdapter for FixtureAdapter {
        type Error = FixtureError;

        fn language(&self) -> &'static str {
            "fixture"
        }

        fn root_marker(&self) -> &'static str {
            "fixture.mod"
        }

        fn load(&self, root: &Path) -> Result<FactsStore, FixtureError> {
            if self.fail {
                return Err(FixtureError);
            }
            let mut store = FactsStore::new(root);
            let pkg = store.next_package_id();
            store.insert_package(Package::new(pkg, "p", ""));

            let mut names: Vec<PathBuf> = fs::read_dir(root)
                .map_err(|_| FixtureError)?
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "src"))
                .collect();
            names.sort();

            let mut contents = Vec::new();
            for path in names {
                let id = store.next_file_id();
                let rel = crate::workspace::relative_path(root, &path);
                contents.push((id, rel.clone(), fs::read(&path).map_err(|_| FixtureError)?));
                store.insert_file(File::new(id, path, rel, pkg));
            }

            for (name, decl_file) in &self.decls {
                let Some((file_id, _, content)) =
                    contents.iter().find(|(_, rel, _)| rel == decl_file)
                else {
                    continue;
                };
                let Some(&decl_offset) = identifier_occurrences(content, name).first() else {
                    continue;
                };
                let (line, col) = byte_offset_to_position(content, decl_offset);
                let sym = store.next_symbol_id();
                store.insert_symbol(Symbol::new(
                    sym,
                    SymbolKind::Function,
                    *name,
                    *file_id,
                    Position::new(line, col, decl_offset),
                    pkg,
                ));
                store.bind_package_scope(sym);

                for (fid, _, content) in &contents {
                    for offset in identifier_occurrences(content, name) {
                        if *fid == *file_id && offset == decl_offset {
                            continue;
                        }
                        let (line, col) = byte_offset_to_position(content, offset);
                        let rid = store.next_reference_id();
                        store.insert_reference(Reference::new(
                            rid,
                            sym,
                            *fid,
                            Position::new(line, col, offset),
                        ));
                    }
                }
            }
            Ok(store)
        }

        fn check_identifier(&self, name: &str) -> Result<(), String> {
            if name.bytes().all(crate::text::is_ident_byte) && !name.is_empty() {
                Ok(())
            } else {
                Err("not an identifier".to_string())
            }
        }
    }

    fn program() -> (TempDir, PathBuf, PathBuf) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fixture.mod"), "").unwrap();
        let a = dir.path().join("a.src");
        let b = dir.path().join("b.src");
        fs::write(&a, "func Greet() {}\nfunc Bar() {}\n").unwrap();
        fs::write(&b, "func main() {\n\tGreet()\n\tGreet()\n}\n").unwrap();
        (dir, a, b)
    }

    fn adapter() -> FixtureAdapter {
        FixtureAdapter {
            decls: vec![("Greet", "a.src"), ("Bar", "a.src")],
            fail: false,
        }
    }

    #[test]
    fn list_refs_reports_uses_only() {
        let (_dir, a, _b) = program();
        let report = list_refs(&adapter(), &a, "Greet").unwrap();
        let lines: Vec<String> = report.references.iter().map(|r| r.render()).collect();
        assert_eq!(lines, vec!["b.src:2:2", "b.src:3:2"]);
        assert_eq!(report.symbol.name, "Greet");
        assert_eq!(report.symbol.file, "a.src");
    }

    #[test]
    fn rename_rewrites_declaration_and_uses() {
        let (_dir, a, b) = program();
        let report = rename(&adapter(), &a, "Greet", "Hello", RenameOptions::default()).unwrap();
        assert_eq!(report.result.count_for("a.src"), Some(1));
        assert_eq!(report.result.count_for("b.src"), Some(2));
        assert_eq!(
            fs::read_to_string(&a).unwrap(),
            "func Hello() {}\nfunc Bar() {}\n"
        );
        assert_eq!(
            fs::read_to_string(&b).unwrap(),
            "func main() {\n\tHello()\n\tHello()\n}\n"
        );
    }

    #[test]
    fn collision_leaves_files_unchanged() {
        let (_dir, a, b) = program();
        let before_a = fs::read(&a).unwrap();
        let before_b = fs::read(&b).unwrap();

        let err = rename(&adapter(), &a, "Greet", "Bar", RenameOptions::default()).unwrap_err();
        assert!(matches!(err, RefactorError::Conflict { .. }));
        assert_eq!(err.error_code().code(), 4);
        assert_eq!(fs::read(&a).unwrap(), before_a);
        assert_eq!(fs::read(&b).unwrap(), before_b);
    }

    #[test]
    fn invalid_new_name_leaves_files_unchanged() {
        let (_dir, a, _b) = program();
        let before = fs::read(&a).unwrap();
        let err = rename(&adapter(), &a, "Greet", "not-valid", RenameOptions::default())
            .unwrap_err();
        assert!(matches!(err, RefactorError::InvalidArguments { .. }));
        assert_eq!(fs::read(&a).unwrap(), before);
    }

    #[test]
    fn symbol_declared_in_other_file_is_not_found() {
        let (_dir, _a, b) = program();
        let err = list_refs(&adapter(), &b, "Greet").unwrap_err();
        assert!(matches!(err, RefactorError::SymbolNotFound { .. }));
        assert_eq!(
            err.to_string(),
            format!("symbol Greet not found in file {}", b.display())
        );
    }

    #[test]
    fn file_outside_program_packages() {
        let (dir, _a, _b) = program();
        let stray = dir.path().join("notes.txt");
        fs::write(&stray, "Greet").unwrap();
        let err = list_refs(&adapter(), &stray, "Greet").unwrap_err();
        assert!(matches!(err, RefactorError::FileNotInProgram { .. }));
    }

    #[test]
    fn missing_root_marker() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.src");
        fs::write(&a, "func Greet() {}\n").unwrap();
        let err = list_refs(&adapter(), &a, "Greet").unwrap_err();
        assert!(matches!(err, RefactorError::RootNotFound { .. }));
        assert_eq!(err.error_code().code(), 3);
    }

    #[test]
    fn load_failure_is_load_error() {
        let (_dir, a, _b) = program();
        let failing = FixtureAdapter {
            decls: vec![],
            fail: true,
        };
        let err = list_refs(&failing, &a, "Greet").unwrap_err();
        assert!(matches!(err, RefactorError::LoadError { .. }));
        assert_eq!(err.error_code().code(), 5);
    }

    #[test]
    fn empty_symbol_is_invalid() {
        let (_dir, a, _b) = program();
        let err = list_refs(&adapter(), &a, "").unwrap_err();
        assert!(matches!(err, RefactorError::InvalidArguments { .. }));
    }
}
