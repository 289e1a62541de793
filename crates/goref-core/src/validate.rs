//! Rename Safety Validator.
//!
//! Two checks run before any file is touched:
//!
//! - [`check_new_name`]: the requested name is well-formed for the language
//!   and actually differs from the old one.
//! - [`check_collision`]: no distinct declaration already owns the new name
//!   in the scope that would own the renamed declaration.
//!
//! The collision check is scope-local. It looks at the declaring package's
//! scope and, for methods, the method set of the owning type. Shadowing the
//! new name may introduce inside nested local scopes is not detected.

use thiserror::Error;

use crate::facts::{FactsStore, Symbol, SymbolKind};

/// Errors from rename validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A distinct declaration already owns the new name.
    #[error("new symbol name {name} conflicts with existing symbol")]
    Conflict { name: String },

    /// The new name is not a legal identifier.
    #[error("invalid identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    /// The new name equals the old one.
    #[error("new name '{name}' is the same as the old name")]
    SameName { name: String },

    /// A qualified new name whose owner does not match the renamed method.
    #[error("qualified new name '{name}' does not match the owning type of the symbol")]
    QualifiedMismatch { name: String },
}

/// Normalize and check the requested new name.
///
/// A qualified `T.N` is accepted only when `T` is the owning type of
/// `target`; the bare `N` is returned. `check_identifier` is the language's
/// identifier rule, returning a reason on rejection.
pub fn check_new_name<F>(
    target: &Symbol,
    requested: &str,
    check_identifier: F,
) -> Result<String, ValidationError>
where
    F: Fn(&str) -> Result<(), String>,
{
    let name = match requested.split_once('.') {
        Some((owner, bare)) => {
            if target.kind != SymbolKind::Method || target.owner_type_name() != Some(owner) {
                return Err(ValidationError::QualifiedMismatch {
                    name: requested.to_string(),
                });
            }
            bare
        }
        None => requested,
    };

    check_identifier(name).map_err(|reason| ValidationError::InvalidIdentifier {
        name: name.to_string(),
        reason,
    })?;

    if name == target.name {
        return Err(ValidationError::SameName {
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}

/// Fail with [`ValidationError::Conflict`] if `new_name` is taken in scope.
pub fn check_collision(
    store: &FactsStore,
    target: &Symbol,
    new_name: &str,
) -> Result<(), ValidationError> {
    let conflict = || ValidationError::Conflict {
        name: new_name.to_string(),
    };

    if let Some(existing) = store.lookup_package_scope(target.package_id, new_name) {
        if existing != target.symbol_id {
            tracing::debug!(name = new_name, existing = %existing, "package scope collision");
            return Err(conflict());
        }
    }

    if target.kind == SymbolKind::Method {
        let owner = target.owner_type_name();
        let sibling = store.symbols().find(|symbol| {
            symbol.symbol_id != target.symbol_id
                && symbol.kind == SymbolKind::Method
                && symbol.package_id == target.package_id
                && symbol.name == new_name
                && owner.is_some()
                && symbol.owner_type_name() == owner
        });
        if let Some(sibling) = sibling {
            tracing::debug!(name = new_name, existing = %sibling.symbol_id, "method set collision");
            return Err(conflict());
        }
    }

    Ok(())
}
