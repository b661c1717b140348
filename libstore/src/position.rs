//! Input position tracking.

use std::fmt;

/// A location in the input buffer.
///
/// `index` is a zero-based byte offset. `line` and `column` are one-based and
/// count consumed characters, so a multi-byte character advances `index` by
/// its UTF-8 length but `column` by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub index: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// The position of the first character of an input.
    pub const fn start() -> Self {
        Self {
            index: 0,
            line: 1,
            column: 1,
        }
    }

    /// Move past one consumed character.
    pub fn advance(&mut self, c: char) {
        self.index += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }

    /// Returns a copy moved past `c`.
    pub fn after(mut self, c: char) -> Self {
        self.advance(c);
        self
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}
