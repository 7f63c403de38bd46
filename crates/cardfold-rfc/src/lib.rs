//! vCard wire layer (RFC 6350 subset).
//!
//! This crate handles the textual card format only: line unfolding and
//! content-line lexing on the way in, value escaping and line folding on
//! the way out. It knows nothing about contacts; field interpretation
//! lives in `cardfold-pipeline`.
//!
//! ## Usage
//!
//! ```rust
//! use cardfold_rfc::parse::{split_lines, parse_content_line};
//!
//! let lines = split_lines("FN:John\r\n Doe\r\nEMAIL:john@example.com\r\n");
//! let line = parse_content_line(&lines[0], 1).unwrap();
//! assert_eq!(line.name, "FN");
//! assert_eq!(line.value, "JohnDoe");
//! ```

pub mod build;
pub mod parse;

pub use build::{escape_text, fold_line};
pub use parse::{ContentLine, ParseError, ParseResult, parse_content_line, split_lines};
