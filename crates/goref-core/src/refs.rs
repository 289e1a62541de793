//! Reference Enumerator.
//!
//! Collects every use site whose resolved declaration is the target (by
//! [`SymbolId`], never by name) and orders them by relative file path, then
//! line, then column.

use serde::Serialize;

use crate::facts::{FactsStore, Reference, SymbolId};

/// One reported reference location.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ReferenceLocation {
    /// Path relative to the program root, `/`-separated.
    pub file: String,
    /// 1-indexed line.
    pub line: u32,
    /// 1-indexed byte column.
    pub col: u32,
}

impl ReferenceLocation {
    /// Render as `path:line:col`.
    pub fn render(&self) -> String {
        format!("{}:{}:{}", self.file, self.line, self.col)
    }
}

/// Order reference locations by (file, line, col).
///
/// The sort is stable, so equal keys keep their input order.
pub fn sort_locations(locations: &mut [ReferenceLocation]) {
    locations.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then(a.line.cmp(&b.line))
            .then(a.col.cmp(&b.col))
    });
}

/// Use sites of `target` among `references`, in no particular order.
pub fn uses_of<'a, I>(references: I, target: SymbolId) -> impl Iterator<Item = &'a Reference>
where
    I: IntoIterator<Item = &'a Reference>,
{
    references
        .into_iter()
        .filter(move |reference| reference.symbol_id == target)
}

/// Enumerate every use of `target` in the program, sorted.
pub fn enumerate(store: &FactsStore, target: SymbolId) -> Vec<ReferenceLocation> {
    let mut locations: Vec<ReferenceLocation> = uses_of(store.references(), target)
        .filter_map(|reference| {
            let file = store.file(reference.file_id)?;
            Some(ReferenceLocation {
                file: file.rel_path.clone(),
                line: reference.pos.line,
                col: reference.pos.col,
            })
        })
        .collect();
    sort_locations(&mut locations);
    tracing::debug!(symbol = %target, count = locations.len(), "enumerated references");
    locations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{File, FileId, Package, PackageId, Position, Symbol, SymbolKind};

    struct Fixture {
        store: FactsStore,
        files: Vec<FileId>,
        target: SymbolId,
        other: SymbolId,
    }

    /// Store with files `b.go`, `a.go`, `pkg/c.go` and two same-named symbols.
    fn fixture() -> Fixture {
        let mut store = FactsStore::new("/work");
        let pkg = store.next_package_id();
        store.insert_package(Package::new(pkg, "main", ""));
        let mut files = Vec::new();
        for rel in ["b.go", "a.go", "pkg/c.go"] {
            let id = store.next_file_id();
            store.insert_file(File::new(id, format!("/work/{rel}"), rel, pkg));
            files.push(id);
        }
        let target = store.next_symbol_id();
        store.insert_symbol(Symbol::new(
            target,
            SymbolKind::Variable,
            "x",
            files[1],
            Position::new(1, 5, 4),
            pkg,
        ));
        let other = store.next_symbol_id();
        store.insert_symbol(Symbol::new(
            other,
            SymbolKind::Variable,
            "x",
            files[0],
            Position::new(1, 5, 4),
            pkg,
        ));
        Fixture {
            store,
            files,
            target,
            other,
        }
    }

    fn add_ref(store: &mut FactsStore, symbol: SymbolId, file: FileId, line: u32, col: u32) {
        let id = store.next_reference_id();
        store.insert_reference(Reference::new(
            id,
            symbol,
            file,
            Position::new(line, col, (line * 100 + col) as usize),
        ));
    }

    fn rendered(locations: &[ReferenceLocation]) -> Vec<String> {
        locations.iter().map(ReferenceLocation::render).collect()
    }

    #[test]
    fn sorted_by_file_then_line_then_col() {
        let mut fx = fixture();
        let (a, b, c) = (fx.files[1], fx.files[0], fx.files[2]);
        add_ref(&mut fx.store, fx.target, c, 1, 1);
        add_ref(&mut fx.store, fx.target, b, 9, 2);
        add_ref(&mut fx.store, fx.target, a, 3, 10);
        add_ref(&mut fx.store, fx.target, a, 3, 2);
        add_ref(&mut fx.store, fx.target, b, 2, 7);

        let locations = enumerate(&fx.store, fx.target);
        assert_eq!(
            rendered(&locations),
            vec!["a.go:3:2", "a.go:3:10", "b.go:2:7", "b.go:9:2", "pkg/c.go:1:1"]
        );
    }

    #[test]
    fn identity_not_name() {
        let mut fx = fixture();
        let (a, b) = (fx.files[1], fx.files[0]);
        add_ref(&mut fx.store, fx.target, a, 4, 1);
        add_ref(&mut fx.store, fx.other, b, 5, 1);
        add_ref(&mut fx.store, fx.other, a, 6, 1);

        let locations = enumerate(&fx.store, fx.target);
        assert_eq!(rendered(&locations), vec!["a.go:4:1"]);
        let locations = enumerate(&fx.store, fx.other);
        assert_eq!(rendered(&locations), vec!["a.go:6:1", "b.go:5:1"]);
    }

    #[test]
    fn every_use_reported_exactly_once() {
        let mut fx = fixture();
        let mut expected = 0;
        for (i, file) in fx.files.clone().into_iter().enumerate() {
            for line in 1..=4u32 {
                add_ref(&mut fx.store, fx.target, file, line, i as u32 + 1);
                expected += 1;
            }
        }
        let locations = enumerate(&fx.store, fx.target);
        assert_eq!(locations.len(), expected);
        let mut deduped = locations.clone();
        deduped.dedup();
        assert_eq!(deduped.len(), expected);
    }

    #[test]
    fn shuffled_input_gives_same_order() {
        let base = vec![
            ReferenceLocation {
                file: "b.go".to_string(),
                line: 1,
                col: 1,
            },
            ReferenceLocation {
                file: "a.go".to_string(),
                line: 2,
                col: 9,
            },
            ReferenceLocation {
                file: "a.go".to_string(),
                line: 2,
                col: 3,
            },
            ReferenceLocation {
                file: "a.go".to_string(),
                line: 10,
                col: 1,
            },
        ];
        let mut expected = base.clone();
        sort_locations(&mut expected);

        for shift in 0..base.len() {
            let mut shuffled = base.clone();
            shuffled.rotate_left(shift);
            sort_locations(&mut shuffled);
            assert_eq!(shuffled, expected);

            let mut reversed = base.clone();
            reversed.rotate_left(shift);
            reversed.reverse();
            sort_locations(&mut reversed);
            assert_eq!(reversed, expected);
        }
        assert_eq!(expected[0].render(), "a.go:2:3");
        assert_eq!(expected[2].render(), "a.go:10:1");
    }

    #[test]
    fn no_uses_is_empty() {
        let fx = fixture();
        assert!(enumerate(&fx.store, fx.target).is_empty());
    }
}
