//! Error types for Store parsing.

use thiserror::Error;

use crate::report::Report;

/// Result type for Store parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Format an origin suffix for error messages.
    pub fn origin_suffix(&self) -> String {
        match &self.filename {
            Some(name) => format!(" of <{}>", name),
            None => String::new(),
        }
    }
}

/// Error type for Store parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input was rejected; carries the furthest failed rule.
    #[error("failed to parse {rule} at line {line}, column {column}{origin}: {message}")]
    Syntax {
        rule: String,
        message: String,
        line: usize,
        column: usize,
        origin: String,
    },

    /// Generic parse error.
    #[error("{0}")]
    Generic(String),
}

impl ParseError {
    /// Build an error from the most specific failure recorded in a report.
    pub fn from_report(report: &Report, ctx: &ParseContext) -> Self {
        match report.furthest_failure() {
            Some(failure) => ParseError::Syntax {
                rule: failure.rule.to_string(),
                message: failure.message.clone(),
                line: failure.position.line,
                column: failure.position.column,
                origin: ctx.origin_suffix(),
            },
            None => ParseError::Generic(format!(
                "input rejected without a recorded failure{}",
                ctx.origin_suffix()
            )),
        }
    }

    /// Line of the failure, if known.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Syntax { line, .. } => Some(*line),
            ParseError::Generic(_) => None,
        }
    }

    /// Column of the failure, if known.
    pub fn column(&self) -> Option<usize> {
        match self {
            ParseError::Syntax { column, .. } => Some(*column),
            ParseError::Generic(_) => None,
        }
    }
}

/// Error raised when a code point has no UTF-8 encoding.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingError {
    /// Code points in U+D800..U+DFFF are reserved for UTF-16 surrogates.
    #[error("illegal surrogate code point U+{0:04X}")]
    Surrogate(u32),

    /// Code points above U+10FFFF do not exist.
    #[error("code point U+{0:04X} out of range")]
    OutOfRange(u32),
}
