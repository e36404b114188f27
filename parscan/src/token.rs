//! # Tokens
//!
//! A [`Token`] is an immutable value describing one lexical unit: its
//! classification, its text, and where it starts. The classification type
//! is chosen by the grammar; the engine only compares it for equality and
//! needs to know which values mark the beginning and end of input, which the
//! grammar declares by implementing [`TokenKind`].

use crate::Position;
use smartstring::alias::String;
use std::fmt::Debug;

/// The token classification of a grammar.
///
/// Implemented by a grammar's closed token-kind enumeration. `BOF` anchors
/// error positions before any token has been read; `EOF` is the type of the
/// synthetic token produced at end of input.
///
/// # Example
/// ```rust
/// # use parscan::TokenKind;
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// enum Kind { Bof, Eof, Number, Op }
///
/// impl TokenKind for Kind {
///     const BOF: Self = Kind::Bof;
///     const EOF: Self = Kind::Eof;
/// }
/// ```
pub trait TokenKind: Copy + Eq + Debug {
    /// Classification of the synthetic beginning-of-input token.
    const BOF: Self;
    /// Classification of the synthetic end-of-input token.
    const EOF: Self;
}

/// One classified lexical unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<T> {
    /// The token's classification.
    pub kind: T,
    /// The matched source text. Empty for BOF/EOF.
    pub text: String,
    /// Where the text starts.
    pub position: Position,
}

impl<T: TokenKind> Token<T> {
    /// Creates a new token.
    pub fn new(kind: T, text: impl AsRef<str>, position: Position) -> Self {
        Self {
            kind,
            text: String::from(text.as_ref()),
            position,
        }
    }

    /// The synthetic token preceding all input.
    pub fn bof() -> Self {
        Self::new(T::BOF, "", Position::start())
    }

    /// A synthetic end-of-input token at `position`.
    pub fn eof(position: Position) -> Self {
        Self::new(T::EOF, "", position)
    }

    /// A synthetic end-of-input token placed just after this token.
    ///
    /// An EOF token maps to itself, so repeated reads past the end keep the
    /// same fixed position.
    pub fn eof_after(&self) -> Self {
        if self.is_eof() {
            self.clone()
        } else {
            Self::eof(self.end())
        }
    }

    /// Returns `true` for the end-of-input token (EOF type, empty text).
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == T::EOF && self.text.is_empty()
    }

    /// 0-based byte offset of the token.
    #[inline]
    pub fn pos(&self) -> usize {
        self.position.pos
    }

    /// 1-based line of the token.
    #[inline]
    pub fn line(&self) -> usize {
        self.position.line
    }

    /// 1-based column of the token.
    #[inline]
    pub fn col(&self) -> usize {
        self.position.col
    }

    /// The position immediately after the token's text.
    pub fn end(&self) -> Position {
        self.position.advance(&self.text)
    }
}
