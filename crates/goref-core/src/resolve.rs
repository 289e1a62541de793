//! Symbol Resolver.
//!
//! Disambiguates a [`SymbolSpec`] against the declarations of one target
//! file. The candidate set is restricted to that file, which is what lets the
//! same bare method name on different types be told apart by the file the
//! caller names.
//!
//! Matching rule:
//! - `T.M`: a method named `M` whose receiver is `T` or `*T`.
//! - `N`: any declaration named `N`, whatever its kind.
//!
//! Zero matches is [`ResolveError::NotFound`], more than one is
//! [`ResolveError::Ambiguous`] with the match count.

use thiserror::Error;

use crate::facts::{Symbol, SymbolKind};
use crate::symbol::SymbolSpec;

/// Errors from symbol resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("symbol {symbol} not found")]
    NotFound { symbol: String },

    #[error("symbol {symbol} is ambiguous ({count} matches)")]
    Ambiguous { symbol: String, count: usize },
}

/// Does `symbol` satisfy the matching rule for `spec`?
pub fn matches(symbol: &Symbol, spec: &SymbolSpec) -> bool {
    if symbol.name != spec.name {
        return false;
    }
    if !spec.is_qualified() {
        return true;
    }
    symbol.kind == SymbolKind::Method && symbol.owner_type_name() == Some(spec.owner.as_str())
}

/// Resolve `spec` to exactly one declaration among `candidates`.
///
/// The result does not depend on the iteration order of `candidates`.
pub fn resolve<'a, I>(candidates: I, spec: &SymbolSpec) -> Result<&'a Symbol, ResolveError>
where
    I: IntoIterator<Item = &'a Symbol>,
{
    let mut found: Vec<&Symbol> = candidates
        .into_iter()
        .filter(|symbol| matches(symbol, spec))
        .collect();
    found.sort_by_key(|symbol| symbol.symbol_id);
    found.dedup_by_key(|symbol| symbol.symbol_id);

    match found.as_slice() {
        [] => Err(ResolveError::NotFound {
            symbol: spec.to_string(),
        }),
        [only] => {
            tracing::debug!(
                symbol = %spec,
                id = %only.symbol_id,
                kind = %only.kind,
                "resolved symbol"
            );
            Ok(*only)
        }
        many => Err(ResolveError::Ambiguous {
            symbol: spec.to_string(),
            count: many.len(),
        }),
    }
}
