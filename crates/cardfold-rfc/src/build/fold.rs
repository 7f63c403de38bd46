//! vCard line folding.

/// Maximum characters on the first physical line.
const MAX_LINE_CHARS: usize = 75;

/// Folds a logical line to the maximum length.
///
/// The first physical line holds the first 75 characters; each subsequent
/// physical line holds one leading space plus up to 74 more, joined by
/// CRLF.
#[must_use]
pub fn fold_line(line: &str) -> String {
    if line.chars().count() <= MAX_LINE_CHARS {
        return line.to_string();
    }

    let mut result = String::with_capacity(line.len() + line.len() / MAX_LINE_CHARS * 3);
    let mut current_len = 0;
    let mut first_segment = true;

    for c in line.chars() {
        let effective_max = if first_segment {
            MAX_LINE_CHARS
        } else {
            MAX_LINE_CHARS - 1
        };

        if current_len == effective_max {
            result.push_str("\r\n ");
            current_len = 0;
            first_segment = false;
        }

        result.push(c);
        current_len += 1;
    }

    result
}
