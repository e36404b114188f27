//! # Scanner
//!
//! A [`Scanner`] wraps any single-pass token source and gives grammar code
//! what recursive descent needs: unbounded lookahead, destructive
//! consumption, optional elements via [`Scanner::try_consume`], and errors
//! that carry source positions.
//!
//! Tokens are pulled from the source only when asked for, into a FIFO
//! buffer. Looking ahead never removes anything from the buffer;
//! consuming removes exactly its front. Once the source is exhausted the
//! scanner keeps producing synthetic EOF tokens at one fixed position, and
//! consuming at EOF fails with [`ErrorKind::UnexpectedEof`].

use crate::{ErrorKind, ParseError, Position, Token, TokenKind};
use smartstring::alias::String;
use std::collections::VecDeque;

/// Counters collected by a [`Scanner`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannerStats {
    /// Tokens pulled from the source (synthetic EOFs excluded).
    pub fetched: usize,
    /// Tokens consumed.
    pub consumed: usize,
    /// Largest lookahead buffer seen.
    pub max_buffered: usize,
}

/// A buffered, position-aware view over a lazy token source.
///
/// A `Scanner` is the private mutable state of one parse. The source may be
/// anything yielding `Result<Token<T>, ParseError>`; a [`Tokenizer`] is
/// the usual choice.
///
/// # Example
/// ```rust
/// # use parscan::{Scanner, TokenKind, TokenRules};
/// # #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// # enum Kind { Bof, Eof, Word, Punct }
/// # impl TokenKind for Kind {
/// #     const BOF: Self = Kind::Bof;
/// #     const EOF: Self = Kind::Eof;
/// # }
/// let rules = TokenRules::builder()
///     .skip(r"\s+")
///     .token(r"\w+", Kind::Word)
///     .token(r"[,;]", Kind::Punct)
///     .build()
///     .unwrap();
///
/// let mut s = Scanner::new(rules.tokenize("a, b; c"));
/// assert_eq!(s.consume_kind(Kind::Word, None).unwrap().as_str(), "a");
/// assert!(s.try_consume(",").unwrap());
/// assert!(!s.try_consume(",").unwrap());
/// assert_eq!(s.look_ahead(1).unwrap().text.as_str(), ";");
/// assert_eq!(s.consume().unwrap().as_str(), "b");
/// ```
///
/// [`Tokenizer`]: crate::Tokenizer
pub struct Scanner<'a, T> {
    source: Box<dyn Iterator<Item = Result<Token<T>, ParseError>> + 'a>,
    buffer: VecDeque<Token<T>>,
    last: Token<T>,
    failed: Option<ParseError>,
    stats: ScannerStats,
}

impl<'a, T: TokenKind> Scanner<'a, T> {
    /// Wraps a token source.
    pub fn new<I>(source: I) -> Self
    where
        I: IntoIterator<Item = Result<Token<T>, ParseError>>,
        I::IntoIter: 'a,
    {
        Self {
            source: Box::new(source.into_iter()),
            buffer: VecDeque::new(),
            last: Token::bof(),
            failed: None,
            stats: ScannerStats::default(),
        }
    }

    /// Counters collected so far.
    pub fn stats(&self) -> ScannerStats {
        self.stats.clone()
    }

    /// The last token materialized from the source (BOF before any fetch).
    pub fn last(&self) -> &Token<T> {
        &self.last
    }

    /// Pulls one more token into the buffer.
    ///
    /// After the source is exhausted, appends EOF tokens placed just after
    /// the last real token. Once the source has failed, every later fetch
    /// reports the same error.
    fn fetch(&mut self) -> Result<(), ParseError> {
        if let Some(err) = &self.failed {
            return Err(err.clone());
        }
        let token = match self.source.next() {
            Some(Err(err)) => {
                self.failed = Some(err.clone());
                return Err(err);
            }
            Some(Ok(token)) => {
                self.stats.fetched += 1;
                log::trace!("fetched {:?} {:?} at {}", token.kind, token.text, token.position);
                self.last = token.clone();
                token
            }
            None => self.last.eof_after(),
        };
        self.buffer.push_back(token);
        self.stats.max_buffered = self.stats.max_buffered.max(self.buffer.len());
        Ok(())
    }

    /// Returns the token `k` places ahead of the current one (`0` is current).
    ///
    /// Fills the buffer up to `k + 1` tokens; never removes any.
    ///
    /// # Errors
    /// Propagates a failure of the underlying source (e.g. a lexical error).
    pub fn look_ahead(&mut self, k: usize) -> Result<&Token<T>, ParseError> {
        while self.buffer.len() <= k {
            self.fetch()?;
        }
        Ok(&self.buffer[k])
    }

    /// The current token, i.e. `look_ahead(0)`.
    pub fn current(&mut self) -> Result<&Token<T>, ParseError> {
        self.look_ahead(0)
    }

    /// Returns `true` if the current token is end of input.
    pub fn eof(&mut self) -> Result<bool, ParseError> {
        Ok(self.current()?.is_eof())
    }

    /// Removes the current token and returns its text.
    ///
    /// # Errors
    /// [`ErrorKind::UnexpectedEof`] if the current token is end of input.
    pub fn consume(&mut self) -> Result<String, ParseError> {
        self.look_ahead(0)?;
        let Some(token) = self.buffer.pop_front() else {
            return Err(self.past_end(self.last.position));
        };
        if token.is_eof() {
            let err = self.past_end(token.position);
            self.buffer.push_front(token);
            return Err(err);
        }
        self.stats.consumed += 1;
        log::trace!("consumed {:?} {:?} at {}", token.kind, token.text, token.position);
        Ok(token.text)
    }

    fn past_end(&self, position: Position) -> ParseError {
        ParseError::new(ErrorKind::UnexpectedEof, "read past end of input", position, "")
    }

    /// Consumes the current token if its kind is `expected`.
    ///
    /// # Errors
    /// [`ErrorKind::UnexpectedToken`] at the current token's position,
    /// with `message` or a default one, if the kind differs.
    pub fn consume_kind(&mut self, expected: T, message: Option<&str>) -> Result<String, ParseError> {
        let current = self.current()?;
        if current.kind != expected {
            let message = match message {
                Some(m) => String::from(m),
                None => String::from(format!(
                    "expected {:?}, found {:?} {:?}",
                    expected, current.kind, current.text
                )),
            };
            return Err(self.unexpected(message));
        }
        self.consume()
    }

    /// Consumes the current token if its text is `expected`.
    ///
    /// # Errors
    /// [`ErrorKind::UnexpectedToken`] at the current token's position,
    /// with `message` or a default one, if the text differs.
    pub fn consume_text(&mut self, expected: &str, message: Option<&str>) -> Result<String, ParseError> {
        let current = self.current()?;
        if current.text.as_str() != expected {
            let message = match message {
                Some(m) => String::from(m),
                None => String::from(format!("expected {:?}, found {:?}", expected, current.text)),
            };
            return Err(self.unexpected(message));
        }
        self.consume()
    }

    /// Consumes the current token and returns `true` if its text is
    /// `expected`; otherwise leaves the scanner untouched and returns `false`.
    pub fn try_consume(&mut self, expected: &str) -> Result<bool, ParseError> {
        if self.current()?.text.as_str() != expected {
            return Ok(false);
        }
        self.consume()?;
        Ok(true)
    }

    /// Builds an [`ErrorKind::Semantic`] error at the last materialized token.
    ///
    /// Uses the last token actually read from the source rather than
    /// fetching the current one, so it cannot fail itself.
    pub fn error(&self, message: impl AsRef<str>) -> ParseError {
        ParseError::semantic(message, self.last.position, self.last.text.as_str())
    }

    /// Builds an [`ErrorKind::UnexpectedToken`] error at the current token,
    /// or at the last materialized one if nothing is buffered.
    pub fn unexpected(&self, message: impl AsRef<str>) -> ParseError {
        let at = self.buffer.front().unwrap_or(&self.last);
        ParseError::new(ErrorKind::UnexpectedToken, message, at.position, at.text.as_str())
    }
}

impl<T: TokenKind> std::fmt::Debug for Scanner<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("buffer", &self.buffer)
            .field("last", &self.last)
            .field("failed", &self.failed)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
