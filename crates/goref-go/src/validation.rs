//! Go identifier validation.

/// Go reserved keywords.
pub const GO_KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Is `name` a Go keyword?
pub fn is_keyword(name: &str) -> bool {
    GO_KEYWORDS.contains(&name)
}

/// Check that `name` is a usable Go identifier.
///
/// Go identifiers are a letter or `_` followed by letters, digits, or `_`,
/// where letters include Unicode letters. The blank identifier `_` is
/// rejected because nothing can be renamed to it.
pub fn validate_go_identifier(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err("identifier cannot be empty".to_string());
    };
    if !(first.is_alphabetic() || first == '_') {
        return Err(format!("identifier cannot start with '{}'", first));
    }
    if let Some(bad) = chars.find(|c| !(c.is_alphanumeric() || *c == '_')) {
        return Err(format!("invalid character '{}' in identifier", bad));
    }
    if name == "_" {
        return Err("cannot rename to the blank identifier".to_string());
    }
    if is_keyword(name) {
        return Err(format!("'{}' is a Go keyword", name));
    }
    if !name.is_ascii() {
        // rewriting validates boundaries bytewise, so keep names ASCII
        return Err("non-ASCII identifiers are not supported".to_string());
    }
    Ok(())
}
