//! Source positions and the single error value shared by every stage.
//!
//! Lexical and syntactic failures, as well as semantic checks raised by
//! grammar callbacks, all surface as a [`ParseError`]: a human-readable
//! message, the [`Position`] it applies to, and the offending source text.
//! There is no recovery; the first error aborts the parse.
//!
//! # Examples
//!
//! ```rust
//! # use parscan::{ErrorKind, ParseError, Position};
//! let err = ParseError::new(
//!     ErrorKind::UnexpectedToken,
//!     "expected \";\"",
//!     Position::new(12, 2, 5),
//!     "END",
//! );
//! assert_eq!(err.to_string(), "expected \";\" at 2:5");
//! assert_eq!(err.offending, "END");
//! ```

use smartstring::alias::String;
use std::fmt;
use thiserror::Error;

/// A location in source text.
///
/// `pos` is a 0-based byte offset. `line` and `col` are 1-based and
/// human-facing; `col` counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    /// 0-based byte offset into the source.
    pub pos: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number (character position in the line).
    pub col: usize,
}

impl Position {
    /// Creates a new `Position`.
    #[inline]
    pub const fn new(pos: usize, line: usize, col: usize) -> Self {
        Self { pos, line, col }
    }

    /// The position of the first character of a source.
    #[inline]
    pub const fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Returns the position just past `text`, assuming `text` starts here.
    ///
    /// Every newline in `text` bumps the line and resets the column.
    pub fn advance(&self, text: &str) -> Self {
        let pos = self.pos + text.len();
        match text.rfind('\n') {
            Some(last_nl) => Self {
                pos,
                line: self.line + text.matches('\n').count(),
                col: text[last_nl + 1..].chars().count() + 1,
            },
            None => Self {
                pos,
                line: self.line,
                col: self.col + text.chars().count(),
            },
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Classifies a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No token rule matches at the current offset.
    Lexical,
    /// A `consume` found a token of the wrong type or text.
    UnexpectedToken,
    /// A `consume` was attempted at end of input.
    UnexpectedEof,
    /// A grammar-level check failed (raised from consumer callbacks).
    Semantic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Lexical => "lexical error",
            ErrorKind::UnexpectedToken => "unexpected token",
            ErrorKind::UnexpectedEof => "unexpected end of input",
            ErrorKind::Semantic => "semantic error",
        })
    }
}

/// The error produced by tokenizing, scanning and parsing.
///
/// All four [`ErrorKind`]s share this shape, so grammar code can propagate
/// any of them with `?` without conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {position}")]
pub struct ParseError {
    /// What went wrong, coarsely.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Where it went wrong.
    pub position: Position,
    /// The source text at fault (a token's text, or a single character for
    /// lexical errors). Empty at end of input.
    pub offending: String,
}

impl ParseError {
    /// Creates a new `ParseError`.
    pub fn new(
        kind: ErrorKind,
        message: impl AsRef<str>,
        position: Position,
        offending: impl AsRef<str>,
    ) -> Self {
        Self {
            kind,
            message: String::from(message.as_ref()),
            position,
            offending: String::from(offending.as_ref()),
        }
    }

    /// Shorthand for an [`ErrorKind::Semantic`] error.
    pub fn semantic(message: impl AsRef<str>, position: Position, offending: impl AsRef<str>) -> Self {
        Self::new(ErrorKind::Semantic, message, position, offending)
    }
}
