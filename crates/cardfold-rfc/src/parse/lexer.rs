//! vCard lexer for line unfolding and content line parsing.

use super::error::{ParseError, ParseErrorKind, ParseResult};

/// Splits raw input into unfolded logical lines.
///
/// Line endings are normalized first (CR, LF, and CRLF all end a physical
/// line), then continuation lines starting with a space or tab are merged
/// into the previous logical line with exactly one leading whitespace
/// character stripped. Blank lines are dropped.
#[must_use]
pub fn split_lines(input: &str) -> Vec<String> {
    let normalized = input.replace("\r\n", "\n").replace('\r', "\n");

    let mut lines: Vec<String> = Vec::new();
    for line in normalized.split('\n') {
        if line.is_empty() {
            continue;
        }

        if let Some(continuation) = line.strip_prefix([' ', '\t']) {
            if let Some(prev) = lines.last_mut() {
                prev.push_str(continuation);
            } else {
                lines.push(continuation.to_string());
            }
        } else {
            lines.push(line.to_string());
        }
    }

    lines
}

/// A property parameter in `KEY` or `KEY=VALUE` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name (uppercase).
    pub name: String,
    /// Parameter value; empty when the parameter carried none.
    pub value: String,
}

/// A parsed content line before value interpretation.
#[derive(Debug, Clone)]
pub struct ContentLine {
    /// Property name (uppercase, group prefix discarded).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<Param>,
    /// Raw value string, escapes intact.
    pub value: String,
}

impl ContentLine {
    /// Returns the value of the named parameter, if present.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        let name_upper = name.to_ascii_uppercase();
        self.params
            .iter()
            .find(|p| p.name == name_upper)
            .map(|p| p.value.as_str())
    }
}

/// Parses a single content line into its components.
///
/// Format: `[group.]name[;param[=value]]*:value`. An `item1.`-style group
/// prefix is discarded; only the bare property name matters downstream.
///
/// ## Errors
/// Returns an error if the line is missing the colon separator or the
/// property name is invalid.
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    let colon_pos = find_value_separator(line).ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::MissingSeparator,
            line_num,
            "missing colon separator",
        )
    })?;

    let (name_params, value) = line.split_at(colon_pos);
    let value = &value[1..];

    let name_params = strip_group(name_params);

    let mut segments = name_params.split(';');
    let name = segments.next().unwrap_or_default();

    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ParseError::new(
            ParseErrorKind::InvalidPropertyName,
            line_num,
            format!("invalid property name: {name}"),
        ));
    }

    let params = segments
        .map(|segment| match segment.split_once('=') {
            Some((key, raw)) => Param {
                name: key.to_ascii_uppercase(),
                value: raw.trim_matches('"').to_string(),
            },
            None => Param {
                name: segment.to_ascii_uppercase(),
                value: String::new(),
            },
        })
        .collect();

    Ok(ContentLine {
        name: name.to_ascii_uppercase(),
        params,
        value: value.to_string(),
    })
}

/// Finds the colon that separates name/params from value.
///
/// Must handle quoted parameter values that may contain colons.
fn find_value_separator(line: &str) -> Option<usize> {
    let mut in_quotes = false;

    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ':' if !in_quotes => return Some(i),
            _ => {}
        }
    }

    None
}

/// Discards an optional group prefix (e.g., "item1" in "item1.TEL").
fn strip_group(s: &str) -> &str {
    if let Some(dot_pos) = s.find('.') {
        let potential_group = &s[..dot_pos];
        if !potential_group.is_empty()
            && potential_group
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return &s[dot_pos + 1..];
        }
    }
    s
}
