//! vCard parsing: unfolding, content-line lexing, value unescaping.
//!
//! vCard uses the folding rules of RFC 5545 §3.1; parsing here is lenient
//! about line endings (CR, LF, and CRLF are all accepted) because the two
//! exporters this tool consumes do not agree on them.

mod error;
mod lexer;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{ContentLine, Param, parse_content_line, split_lines};
pub use values::{split_structured, unescape_text};
