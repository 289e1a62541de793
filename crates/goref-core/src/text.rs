//! Text position utilities for byte offsets and identifier boundaries.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed**, columns count bytes
//! - Byte offsets are **0-indexed**

/// Convert a byte offset to 1-indexed line and column.
///
/// If `offset` exceeds content length, returns the position at end of content.
pub fn byte_offset_to_position(content: &[u8], offset: usize) -> (u32, u32) {
    let offset = offset.min(content.len());
    let mut line = 1u32;
    let mut col = 1u32;

    for &byte in &content[..offset] {
        if byte == b'\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// Is `b` an ASCII identifier byte (letter, digit, or underscore)?
pub fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Does `content[offset..offset + name.len()]` hold `name` as a whole identifier?
///
/// The span must match exactly and be bounded on both sides by a
/// non-identifier byte or a file boundary.
pub fn is_identifier_at(content: &[u8], offset: usize, name: &[u8]) -> bool {
    let Some(end) = offset.checked_add(name.len()) else {
        return false;
    };
    if name.is_empty() || end > content.len() || &content[offset..end] != name {
        return false;
    }
    if offset > 0 && is_ident_byte(content[offset - 1]) {
        return false;
    }
    if end < content.len() && is_ident_byte(content[end]) {
        return false;
    }
    true
}

/// Offsets of every whole-identifier occurrence of `name` in `content`.
pub fn identifier_occurrences(content: &[u8], name: &str) -> Vec<usize> {
    let needle = name.as_bytes();
    if needle.is_empty() || needle.len() > content.len() {
        return Vec::new();
    }
    (0..=content.len() - needle.len())
        .filter(|&offset| is_identifier_at(content, offset, needle))
        .collect()
}
