//! Store format parser implementation.
//!
//! Store is a small data format halfway between JSON and INI files: bare
//! words and quoted strings, 64-bit integers and floats, lists in round or
//! square brackets, and maps in braces whose entries are separated by `:` or
//! `=`. A document is either a single value or a sequence of top-level
//! entries.
//!
//! ```text
//! name = demo; version = 1.5
//! tags = [fast "very small" 3]
//! limits = { depth: 128, strict = yes }
//! ```
//!
//! # Parsing
//!
//! The parser is a backtracking recursive descent over the input text. Besides
//! the value tree, every parse produces a [`Report`]: a tree with one node per
//! rule invocation, abandoned alternatives included, which explains exactly
//! how the input was (or was not) understood.

mod encode;
mod encoding;
mod error;
mod grammar;
mod parser;
mod position;
mod report;
mod value;

pub use encode::encode_json;
pub use encoding::{encode_utf8, Utf8Sequence};
pub use error::{EncodingError, ParseContext, ParseError, Result};
pub use parser::{Parser, ParserConfig, Rule, DEFAULT_MAX_NESTING, MAX_NESTING_LIMIT};
pub use position::Position;
pub use report::{Nodes, Report};
pub use value::Value;

/// Parse a Store document from a string.
///
/// # Example
///
/// ```
/// use libstore::{parse, Value};
///
/// let value = parse("answer = 42").unwrap();
/// assert_eq!(value.get("answer"), Some(&Value::Int(42)));
/// ```
pub fn parse(input: &str) -> Result<Value> {
    parse_with_filename(input, None)
}

/// Parse a Store document from a string with a filename for error messages.
///
/// Nesting is bounded by [`ParserConfig::from_env`].
pub fn parse_with_filename(input: &str, filename: Option<&str>) -> Result<Value> {
    let ctx = ParseContext::new(filename);
    let mut parser = Parser::with_config(ParserConfig::from_env());

    match parser.parse(input) {
        Some(value) => Ok(value),
        None => Err(parser
            .error_in(&ctx)
            .unwrap_or_else(|| ParseError::Generic(format!("parse failed{}", ctx.origin_suffix())))),
    }
}
