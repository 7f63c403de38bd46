//! vCard serialization primitives: value escaping and line folding.

mod fold;

pub use fold::fold_line;

/// Escapes a text value for emission.
///
/// Exact inverse of decode-time unescaping: backslash, semicolon, comma,
/// newline, and carriage return are escaped. Colons and quotes are legal
/// in values and left alone.
#[must_use]
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for c in s.chars() {
        match c {
            '\\' => result.push_str(r"\\"),
            ';' => result.push_str(r"\;"),
            ',' => result.push_str(r"\,"),
            '\n' => result.push_str(r"\n"),
            '\r' => result.push_str(r"\r"),
            _ => result.push(c),
        }
    }

    result
}
