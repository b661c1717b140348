//! Backtracking recursive-descent grammar.
//!
//! ```text
//! store       := value EOF | entries EOF
//! value       := terminal ( int | float | string | list | map )
//! int         := '-'? digits
//! float       := '-'? digits fraction? exponent?
//! fraction    := '.' digits?
//! exponent    := ('e'|'E') ('+'|'-')? digits
//! string      := shortstring | '"' longstring '"'
//! list        := '(' elements terminal ')' | '[' elements terminal ']'
//! elements    := value*
//! map         := '{' entries terminal '}'
//! entries     := entry*
//! entry       := terminal string terminal (':'|'=') value
//! terminal    := (whitespace | ',' | ';')*
//! ```
//!
//! Every rule takes the position to start from by value and returns a
//! [`Step`]: the matched item together with the position after it, plus the
//! rule's [`Report`]. A caller only moves its own position when a sub-rule
//! matched, so a failed alternative can never leak partial consumption.

use std::collections::HashMap;

use crate::encoding::encode_utf8;
use crate::parser::Rule;
use crate::position::Position;
use crate::report::Report;
use crate::value::Value;

/// Outcome of one rule invocation.
pub(crate) type Step<T> = (Option<(T, Position)>, Report);

/// Working state of a single rule invocation.
struct Scope {
    rule: &'static str,
    cursor: Position,
    children: Vec<Report>,
}

impl Scope {
    fn open(rule: &'static str, at: Position) -> Self {
        Self {
            rule,
            cursor: at,
            children: Vec::new(),
        }
    }

    /// Record a sub-rule's report and hand back its match without moving.
    fn trial<T>(&mut self, step: Step<T>) -> Option<(T, Position)> {
        let (matched, report) = step;
        self.children.push(report);
        matched
    }

    /// Record a sub-rule's report and move past its match.
    fn attempt<T>(&mut self, step: Step<T>) -> Option<T> {
        let (item, end) = self.trial(step)?;
        self.cursor = end;
        Some(item)
    }

    /// Record that a sub-rule matched but its match was not acceptable here.
    fn reject(&mut self, rule: &'static str, at: Position, message: String) {
        self.children
            .push(Report::failure(rule, at, message, Vec::new()));
    }

    fn advance(&mut self, c: char) {
        self.cursor.advance(c);
    }

    fn succeed<T>(self, item: T, message: String) -> Step<T> {
        let report = Report::success(self.rule, self.cursor, message, self.children);
        (Some((item, self.cursor)), report)
    }

    fn fail<T>(self, message: String) -> Step<T> {
        let report = Report::failure(self.rule, self.cursor, message, self.children);
        (None, report)
    }
}

fn map_step<T, U>(step: Step<T>, f: impl FnOnce(T) -> U) -> Step<U> {
    let (matched, report) = step;
    (matched.map(|(item, end)| (f(item), end)), report)
}

/// The grammar over one input buffer.
pub(crate) struct Grammar<'a> {
    input: &'a str,
    max_nesting: usize,
}

impl<'a> Grammar<'a> {
    pub(crate) fn new(input: &'a str, max_nesting: usize) -> Self {
        Self { input, max_nesting }
    }

    /// Run a top-level rule.
    pub(crate) fn run(&self, rule: Rule, at: Position) -> Step<Value> {
        match rule {
            Rule::Store => self.store(at),
            Rule::Value => self.value(at, 0),
            Rule::Int => self.int(at),
            Rule::Float => self.float(at),
            Rule::String => map_step(self.string(at), Value::String),
            Rule::List => self.list(at, 0),
            Rule::Elements => map_step(self.elements(at, 0), Value::List),
            Rule::Map => self.map(at, 0),
            Rule::Entries => map_step(self.entries(at, 0), Value::Map),
        }
    }

    fn peek(&self, at: Position) -> Option<char> {
        self.input.get(at.index..).and_then(|rest| rest.chars().next())
    }

    /// Consume `expected` if it is the next character.
    fn eat(&self, scope: &mut Scope, expected: char) -> bool {
        if self.peek(scope.cursor) == Some(expected) {
            scope.advance(expected);
            true
        } else {
            false
        }
    }

    /// Skip delimiters within `scope`, returning the lookahead character.
    fn skip(&self, scope: &mut Scope) -> Option<char> {
        scope.attempt(self.terminal(scope.cursor)).flatten()
    }

    fn store(&self, at: Position) -> Step<Value> {
        let mut scope = Scope::open("store", at);

        if let Some(value) = scope.attempt(self.value(at, 0)) {
            match self.skip(&mut scope) {
                None => {
                    let message = format!("parsed value store of type {}", value.type_name());
                    return scope.succeed(value, message);
                }
                next => scope.reject(
                    "value",
                    scope.cursor,
                    format!("expected end of input, but got {}", describe(next)),
                ),
            }
        }

        scope.cursor = at;
        if let Some(entries) = scope.attempt(self.entries(at, 0)) {
            match self.skip(&mut scope) {
                None => {
                    let message = match entries.len() {
                        1 => "parsed entries store with 1 entry".to_string(),
                        n => format!("parsed entries store with {} entries", n),
                    };
                    return scope.succeed(Value::Map(entries), message);
                }
                next => scope.reject(
                    "entries",
                    scope.cursor,
                    format!("expected end of input, but got {}", describe(next)),
                ),
            }
        }

        scope.cursor = at;
        scope.fail("expected value or entries".into())
    }

    fn value(&self, at: Position, depth: usize) -> Step<Value> {
        let mut scope = Scope::open("value", at);

        if self.skip(&mut scope).is_none() {
            return scope.fail("expected value, but reached end of input".into());
        }
        let start = scope.cursor;

        let alternatives: [&dyn Fn(Position) -> Step<Value>; 5] = [
            &|at: Position| self.int(at),
            &|at: Position| self.float(at),
            &|at: Position| map_step(self.string(at), Value::String),
            &|at: Position| self.list(at, depth),
            &|at: Position| self.map(at, depth),
        ];

        for alternative in alternatives {
            if let Some((value, end)) = scope.trial(alternative(start)) {
                let next = self.peek(end);
                if is_separator(next) {
                    scope.cursor = end;
                    let message = format!("parsed {}", value.type_name());
                    return scope.succeed(value, message);
                }
                scope.reject(
                    value.type_name(),
                    end,
                    format!("expected termination by separator, but got {}", describe(next)),
                );
            }
        }

        scope.fail("expected int, float, string, list, or map".into())
    }

    /// A literal outside the `i64` range fails here, leaving it to `float`.
    fn int(&self, at: Position) -> Step<Value> {
        let mut scope = Scope::open("int", at);
        let mut text = String::new();

        let negative = self.eat(&mut scope, '-');
        if negative {
            text.push('-');
        }

        let Some(digits) = scope.attempt(self.digits(scope.cursor)) else {
            return scope.fail("expected digits".into());
        };
        text.push_str(&digits);

        match text.parse::<i64>() {
            Ok(n) => scope.succeed(Value::Int(n), format!("parsed {} int", sign(negative))),
            Err(_) => scope.fail(format!("integer {} out of range", text)),
        }
    }

    /// Out-of-range magnitudes saturate to infinity or round to zero.
    fn float(&self, at: Position) -> Step<Value> {
        let mut scope = Scope::open("float", at);
        let mut text = String::new();

        let negative = self.eat(&mut scope, '-');
        if negative {
            text.push('-');
        }

        let Some(digits) = scope.attempt(self.digits(scope.cursor)) else {
            return scope.fail("expected digits".into());
        };
        text.push_str(&digits);

        let fraction = scope.attempt(self.fraction(scope.cursor));
        if let Some(fraction) = &fraction {
            text.push_str(fraction);
        }

        let exponent = scope.attempt(self.exponent(scope.cursor));
        if let Some(exponent) = &exponent {
            text.push_str(exponent);
        }

        match text.parse::<f64>() {
            Ok(f) => {
                let message = format!(
                    "parsed {} float {} fraction and {} exponent",
                    sign(negative),
                    with(fraction.is_some()),
                    with(exponent.is_some())
                );
                scope.succeed(Value::Float(f), message)
            }
            Err(_) => scope.fail(format!("invalid float literal {}", text)),
        }
    }

    fn fraction(&self, at: Position) -> Step<String> {
        let mut scope = Scope::open("fraction", at);

        if !self.eat(&mut scope, '.') {
            let next = self.peek(scope.cursor);
            return scope.fail(format!("expected '.', but got {}", describe(next)));
        }

        let mut text = String::from(".");
        let digits = scope.attempt(self.digits(scope.cursor));
        if let Some(digits) = &digits {
            text.push_str(digits);
        }

        let message = format!("parsed fraction {} digits", with(digits.is_some()));
        scope.succeed(text, message)
    }

    fn exponent(&self, at: Position) -> Step<String> {
        let mut scope = Scope::open("exponent", at);

        let marker = match self.peek(scope.cursor) {
            Some(c @ ('e' | 'E')) => c,
            next => return scope.fail(format!("expected 'e' or 'E', but got {}", describe(next))),
        };
        scope.advance(marker);
        let mut text = String::from(marker);

        let mut negative = false;
        if let Some(c @ ('+' | '-')) = self.peek(scope.cursor) {
            scope.advance(c);
            text.push(c);
            negative = c == '-';
        }

        let Some(digits) = scope.attempt(self.digits(scope.cursor)) else {
            return scope.fail("expected digits".into());
        };
        text.push_str(&digits);

        scope.succeed(text, format!("parsed {} exponent", sign(negative)))
    }

    fn digits(&self, at: Position) -> Step<String> {
        let mut scope = Scope::open("digits", at);
        let mut text = String::new();

        while let Some(c) = self.peek(scope.cursor).filter(char::is_ascii_digit) {
            text.push(c);
            scope.advance(c);
        }

        if text.is_empty() {
            return scope.fail("no digits parsed".into());
        }
        let message = format!("parsed {} digits", text.len());
        scope.succeed(text, message)
    }

    fn string(&self, at: Position) -> Step<String> {
        let mut scope = Scope::open("string", at);

        if self.eat(&mut scope, '"') {
            let Some(text) = scope.attempt(self.long_string(scope.cursor)) else {
                return scope.fail("expected long string".into());
            };
            if !self.eat(&mut scope, '"') {
                let next = self.peek(scope.cursor);
                return scope.fail(format!(
                    "expected '\"' after long string, but got {}",
                    describe(next)
                ));
            }
            return scope.succeed(text, "parsed long string".into());
        }

        let Some(text) = scope.attempt(self.short_string(scope.cursor)) else {
            return scope.fail("expected short string".into());
        };
        scope.succeed(text, "parsed short string".into())
    }

    fn short_string(&self, at: Position) -> Step<String> {
        let mut scope = Scope::open("short string", at);
        let mut text = String::new();
        let mut count = 0;

        while let Some(c) = self.peek(scope.cursor).filter(|&c| !is_separator(Some(c))) {
            text.push(c);
            scope.advance(c);
            count += 1;
        }

        if count == 0 {
            return scope.fail("no short string characters parsed".into());
        }
        scope.succeed(
            text,
            format!("parsed short string with {} characters", count),
        )
    }

    fn long_string(&self, at: Position) -> Step<String> {
        let mut scope = Scope::open("long string", at);
        let mut bytes: Vec<u8> = Vec::new();
        let mut count = 0;

        loop {
            match self.peek(scope.cursor) {
                None | Some('"') => break,
                Some('\\') => {
                    scope.advance('\\');
                    let Some(escaped) = self.peek(scope.cursor) else {
                        return scope.fail("expected escaped character, but got end of input".into());
                    };
                    scope.advance(escaped);

                    match escaped {
                        '"' => bytes.push(b'"'),
                        '\\' => bytes.push(b'\\'),
                        '/' => bytes.push(b'/'),
                        'b' => bytes.push(0x08),
                        'f' => bytes.push(0x0c),
                        'n' => bytes.push(b'\n'),
                        'r' => bytes.push(b'\r'),
                        't' => bytes.push(b'\t'),
                        'u' => {
                            let mut codepoint = 0u32;
                            for ordinal in ["first", "second", "third", "fourth"] {
                                let next = self.peek(scope.cursor);
                                let Some((c, digit)) =
                                    next.and_then(|c| c.to_digit(16).map(|d| (c, d)))
                                else {
                                    return scope.fail(format!(
                                        "expected {} hex digit of unicode escape, but got {}",
                                        ordinal,
                                        describe(next)
                                    ));
                                };
                                scope.advance(c);
                                codepoint = codepoint * 16 + digit;
                            }
                            match encode_utf8(codepoint) {
                                Ok(sequence) => bytes.extend_from_slice(&sequence),
                                Err(err) => {
                                    return scope.fail(format!("invalid unicode escape: {}", err))
                                }
                            }
                        }
                        other => {
                            return scope.fail(format!(
                                "expected escaped character, but got {}",
                                describe(Some(other))
                            ))
                        }
                    }
                }
                Some(c) => {
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                    scope.advance(c);
                }
            }
            count += 1;
        }

        match String::from_utf8(bytes) {
            Ok(text) => scope.succeed(
                text,
                format!("parsed long string with {} characters", count),
            ),
            Err(_) => scope.fail("decoded long string is not valid UTF-8".into()),
        }
    }

    fn list(&self, at: Position, depth: usize) -> Step<Value> {
        let mut scope = Scope::open("list", at);

        let (open, close, shape) = match self.peek(scope.cursor) {
            Some('(') => ('(', ')', "round"),
            Some('[') => ('[', ']', "square"),
            next => {
                return scope.fail(format!(
                    "opening character must be '(' or '[', but got {}",
                    describe(next)
                ))
            }
        };
        scope.advance(open);
        if depth >= self.max_nesting {
            return scope.fail(format!("nesting deeper than {} levels", self.max_nesting));
        }

        let Some(items) = scope.attempt(self.elements(scope.cursor, depth + 1)) else {
            return scope.fail("expected elements".into());
        };

        match self.skip(&mut scope) {
            Some(c) if c == close => {
                scope.advance(c);
                let message = format!(
                    "parsed list of {} elements with {} brackets",
                    items.len(),
                    shape
                );
                scope.succeed(Value::List(items), message)
            }
            next => scope.fail(format!(
                "ending character must be '{}', but got {}",
                close,
                describe(next)
            )),
        }
    }

    fn elements(&self, at: Position, depth: usize) -> Step<Vec<Value>> {
        let mut scope = Scope::open("elements", at);
        let mut items = Vec::new();

        while let Some(item) = scope.attempt(self.value(scope.cursor, depth)) {
            items.push(item);
        }

        let message = format!("parsed {} elements", items.len());
        scope.succeed(items, message)
    }

    fn map(&self, at: Position, depth: usize) -> Step<Value> {
        let mut scope = Scope::open("map", at);

        if self.peek(scope.cursor) != Some('{') {
            let next = self.peek(scope.cursor);
            return scope.fail(format!(
                "opening character must be '{{', but got {}",
                describe(next)
            ));
        }
        scope.advance('{');
        if depth >= self.max_nesting {
            return scope.fail(format!("nesting deeper than {} levels", self.max_nesting));
        }

        let Some(entries) = scope.attempt(self.entries(scope.cursor, depth + 1)) else {
            return scope.fail("expected entries".into());
        };

        match self.skip(&mut scope) {
            Some('}') => {
                scope.advance('}');
                let message = format!("parsed map with {} entries", entries.len());
                scope.succeed(Value::Map(entries), message)
            }
            next => scope.fail(format!(
                "ending character must be '}}', but got {}",
                describe(next)
            )),
        }
    }

    fn entries(&self, at: Position, depth: usize) -> Step<HashMap<String, Value>> {
        let mut scope = Scope::open("entries", at);
        let mut entries = HashMap::new();
        let mut parsed = 0;
        let mut overwritten = 0;

        while let Some((key, value)) = scope.attempt(self.entry(scope.cursor, depth)) {
            parsed += 1;
            // Last write wins; the replaced value is dropped here.
            if entries.insert(key, value).is_some() {
                overwritten += 1;
            }
        }

        let message = match overwritten {
            0 => format!("parsed {} entries", parsed),
            1 => format!("parsed {} entries, 1 duplicate key overwritten", parsed),
            n => format!("parsed {} entries, {} duplicate keys overwritten", parsed, n),
        };
        scope.succeed(entries, message)
    }

    fn entry(&self, at: Position, depth: usize) -> Step<(String, Value)> {
        let mut scope = Scope::open("entry", at);

        if self.skip(&mut scope).is_none() {
            return scope.fail("expected key, but reached end of input".into());
        }

        let Some(key) = scope.attempt(self.string(scope.cursor)) else {
            return scope.fail("expected key string".into());
        };

        match self.skip(&mut scope) {
            Some(c @ (':' | '=')) => scope.advance(c),
            next => {
                return scope.fail(format!(
                    "entry separating character must be ':' or '=', but got {}",
                    describe(next)
                ))
            }
        }

        let Some(value) = scope.attempt(self.value(scope.cursor, depth)) else {
            return scope.fail("expected value".into());
        };

        let message = format!("parsed entry with {} value", value.type_name());
        scope.succeed((key, value), message)
    }

    fn terminal(&self, at: Position) -> Step<Option<char>> {
        let mut scope = Scope::open("terminal", at);
        let mut count = 0;

        while let Some(c) = self.peek(scope.cursor).filter(|&c| is_delimiter(c)) {
            scope.advance(c);
            count += 1;
        }

        let next = self.peek(scope.cursor);
        scope.succeed(next, format!("parsed terminal after {} delimiters", count))
    }
}

/// The C `isspace` set.
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Characters skipped by `terminal`.
fn is_delimiter(c: char) -> bool {
    is_space(c) || c == ',' || c == ';'
}

/// Characters allowed right after a value. End of input counts as one.
fn is_separator(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => {
            is_space(c)
                || matches!(
                    c,
                    ',' | ';' | '"' | '(' | '[' | '{' | ')' | ']' | '}' | ':' | '='
                )
        }
    }
}

fn describe(c: Option<char>) -> String {
    match c {
        Some(c) => format!("{:?}", c),
        None => "end of input".to_string(),
    }
}

fn sign(negative: bool) -> &'static str {
    if negative {
        "negative"
    } else {
        "positive"
    }
}

fn with(present: bool) -> &'static str {
    if present {
        "with"
    } else {
        "without"
    }
}
