//! Parser state and configuration.
//!
//! A [`Parser`] owns the position reached by its last successful call and the
//! report tree of its last call. Both are reset at the start of every parse,
//! so one instance can be reused for any number of inputs.

use std::env;
use std::io;
use std::panic;
use std::thread;

use crate::error::{ParseContext, ParseError};
use crate::grammar::{Grammar, Step};
use crate::position::Position;
use crate::report::Report;
use crate::value::Value;

/// Default bound on container nesting.
pub const DEFAULT_MAX_NESTING: usize = 128;

/// Largest accepted nesting bound. Larger requests are clamped to it.
pub const MAX_NESTING_LIMIT: usize = 512;

/// Native stack reserved per nesting level, plus a fixed base, for the
/// thread the grammar runs on.
const STACK_PER_LEVEL: usize = 16 * 1024;
const STACK_BASE: usize = 1024 * 1024;

/// Tunables for a [`Parser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Lists and maps nested deeper than this fail instead of recursing.
    pub max_nesting: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

impl ParserConfig {
    /// A configuration with `max_nesting` clamped to [`MAX_NESTING_LIMIT`].
    pub fn new(max_nesting: usize) -> Self {
        Self {
            max_nesting: max_nesting.min(MAX_NESTING_LIMIT),
        }
    }

    /// Read the configuration from `STORE_MAX_NESTING`, falling back to the
    /// default when unset or unparsable.
    pub fn from_env() -> Self {
        let max_nesting = env::var("STORE_MAX_NESTING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_NESTING);
        Self::new(max_nesting)
    }

    fn stack_size(&self) -> usize {
        STACK_BASE + STACK_PER_LEVEL * (self.max_nesting + 1)
    }
}

/// Grammar rules that can be run on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Store,
    Value,
    Int,
    Float,
    String,
    List,
    Elements,
    Map,
    Entries,
}

impl Rule {
    /// Name of the rule as it appears in reports.
    pub fn name(self) -> &'static str {
        match self {
            Rule::Store => "store",
            Rule::Value => "value",
            Rule::Int => "int",
            Rule::Float => "float",
            Rule::String => "string",
            Rule::List => "list",
            Rule::Elements => "elements",
            Rule::Map => "map",
            Rule::Entries => "entries",
        }
    }
}

/// A reusable Store parser.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
    position: Position,
    report: Option<Report>,
}

impl Parser {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// A parser with `config`, its nesting bound clamped to
    /// [`MAX_NESTING_LIMIT`].
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config: ParserConfig::new(config.max_nesting),
            position: Position::start(),
            report: None,
        }
    }

    pub fn config(&self) -> ParserConfig {
        self.config
    }

    /// Return to the start position and drop the last report.
    pub fn reset(&mut self) {
        self.position = Position::start();
        self.report = None;
    }

    /// Parse a whole Store document.
    pub fn parse(&mut self, input: &str) -> Option<Value> {
        self.parse_rule(Rule::Store, input)
    }

    /// Run a single rule from the start of `input`.
    ///
    /// Unlike [`Rule::Store`], the other rules do not need to consume the
    /// whole input; [`Parser::position`] tells how far they got.
    pub fn parse_rule(&mut self, rule: Rule, input: &str) -> Option<Value> {
        self.reset();
        let start = self.position;
        let (matched, report) = match self.run(rule, input) {
            Ok(step) => step,
            Err(e) => (
                None,
                Report::failure(
                    rule.name(),
                    start,
                    format!("could not start parser thread: {}", e),
                    Vec::new(),
                ),
            ),
        };
        self.report = Some(report);

        let (value, end) = matched?;
        self.position = end;
        Some(value)
    }

    /// Run the grammar on a thread whose stack fits the nesting bound, so
    /// deep input fails with a report instead of overflowing the caller's
    /// stack.
    fn run(&self, rule: Rule, input: &str) -> io::Result<Step<Value>> {
        let grammar = Grammar::new(input, self.config.max_nesting);
        let start = self.position;
        thread::scope(|scope| {
            let handle = thread::Builder::new()
                .name("store-parser".into())
                .stack_size(self.config.stack_size())
                .spawn_scoped(scope, || grammar.run(rule, start))?;
            Ok(handle.join().unwrap_or_else(|e| panic::resume_unwind(e)))
        })
    }

    /// Position after the last successful call; the start after a failure.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Report tree of the last call.
    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// Take ownership of the last report, leaving none behind.
    pub fn take_report(&mut self) -> Option<Report> {
        self.report.take()
    }

    /// The furthest failure of the last call, if it failed.
    pub fn error(&self) -> Option<ParseError> {
        self.error_in(&ParseContext::default())
    }

    /// Like [`Parser::error`], naming the input in the message.
    pub fn error_in(&self, ctx: &ParseContext) -> Option<ParseError> {
        match &self.report {
            Some(report) if !report.success => Some(ParseError::from_report(report, ctx)),
            _ => None,
        }
    }
}
