//! Parsing Go sources with tree-sitter.

use thiserror::Error;
use tree_sitter::{Node, Parser, Tree};

use crate::files::SourceFile;

/// Errors from parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The grammar could not be loaded into the parser.
    #[error("failed to load Go grammar: {0}")]
    Language(String),

    /// The parser returned no tree.
    #[error("{file}: parse failed")]
    NoTree { file: String },

    /// The file contains a syntax error.
    #[error("{file}:{line}:{col}: syntax error near '{snippet}'")]
    Syntax {
        file: String,
        line: u32,
        col: u32,
        snippet: String,
    },

    /// The file has no package clause.
    #[error("{file}: missing package clause")]
    NoPackageClause { file: String },
}

/// A parsed Go source file.
pub struct ParsedFile {
    pub source: SourceFile,
    pub tree: Tree,
    /// Name from the package clause.
    pub package_name: String,
}

impl ParsedFile {
    /// Source bytes.
    pub fn bytes(&self) -> &[u8] {
        self.source.content.as_bytes()
    }

    /// Text of a node of this file's tree.
    pub fn text<'s>(&'s self, node: Node<'_>) -> &'s str {
        self.source
            .content
            .get(node.byte_range())
            .unwrap_or_default()
    }
}

/// Create a parser loaded with the Go grammar.
pub fn go_parser() -> Result<Parser, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| ParseError::Language(e.to_string()))?;
    Ok(parser)
}

/// Parse one file, failing on any syntax error.
pub fn parse_file(parser: &mut Parser, source: SourceFile) -> Result<ParsedFile, ParseError> {
    let tree = parser
        .parse(&source.content, None)
        .ok_or_else(|| ParseError::NoTree {
            file: source.rel_path.clone(),
        })?;

    let root = tree.root_node();
    if root.has_error() {
        let bad = first_error(root).unwrap_or(root);
        let pos = bad.start_position();
        let snippet: String = source
            .content
            .get(bad.byte_range())
            .unwrap_or_default()
            .chars()
            .take(24)
            .collect();
        return Err(ParseError::Syntax {
            file: source.rel_path.clone(),
            line: pos.row as u32 + 1,
            col: pos.column as u32 + 1,
            snippet,
        });
    }

    let package_name = package_clause_name(root, &source.content).ok_or_else(|| {
        ParseError::NoPackageClause {
            file: source.rel_path.clone(),
        }
    })?;

    Ok(ParsedFile {
        source,
        tree,
        package_name,
    })
}

/// The first ERROR or MISSING node in document order.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn package_clause_name(root: Node<'_>, content: &str) -> Option<String> {
    let mut cursor = root.walk();
    let clause = root
        .named_children(&mut cursor)
        .find(|n| n.kind() == "package_clause")?;
    let mut cursor = clause.walk();
    let name = clause
        .named_children(&mut cursor)
        .find(|n| n.kind() == "package_identifier" || n.kind() == "identifier")?;
    content.get(name.byte_range()).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn source(content: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from("/m/a.go"),
            rel_path: "a.go".to_string(),
            rel_dir: String::new(),
            content: content.to_string(),
        }
    }

    #[test]
    fn parses_package_name() {
        let mut parser = go_parser().unwrap();
        let parsed = parse_file(&mut parser, source("package demo\n\nfunc F() {}\n")).unwrap();
        assert_eq!(parsed.package_name, "demo");
        assert_eq!(parsed.tree.root_node().kind(), "source_file");
    }

    #[test]
    fn syntax_error_reports_position() {
        let mut parser = go_parser().unwrap();
        let err = parse_file(&mut parser, source("package demo\n\nfunc F( {\n")).err().unwrap();
        match err {
            ParseError::Syntax { file, line, .. } => {
                assert_eq!(file, "a.go");
                assert!(line >= 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn node_text() {
        let mut parser = go_parser().unwrap();
        let parsed = parse_file(&mut parser, source("package demo\n")).unwrap();
        let root = parsed.tree.root_node();
        assert_eq!(parsed.text(root).trim_end(), "package demo");
    }
}
