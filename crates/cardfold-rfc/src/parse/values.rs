//! vCard value decoding primitives.

/// Unescapes a vCard text value.
///
/// Decoded escapes: `\n`/`\N` (newline), `\r`/`\R` (carriage return),
/// `\:`, `\;`, `\,`, `\"`, and `\\`. Anything else after a backslash is
/// left intact.
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some('n' | 'N') => {
                    chars.next();
                    result.push('\n');
                }
                Some('r' | 'R') => {
                    chars.next();
                    result.push('\r');
                }
                Some(&next @ (':' | ';' | ',' | '"' | '\\')) => {
                    chars.next();
                    result.push(next);
                }
                _ => result.push(c),
            }
        } else {
            result.push(c);
        }
    }

    result
}

/// Splits a structured value on unescaped semicolons.
///
/// Components keep their escapes; run [`unescape_text`] on each afterward.
#[must_use]
pub fn split_structured(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut prev_backslash = false;

    for (i, c) in s.char_indices() {
        if c == '\\' {
            prev_backslash = !prev_backslash;
            continue;
        }

        if c == ';' && !prev_backslash {
            parts.push(&s[start..i]);
            start = i + 1;
        }

        prev_backslash = false;
    }

    parts.push(&s[start..]);
    parts
}
