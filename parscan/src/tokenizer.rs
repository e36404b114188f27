//! # Tokenizer
//!
//! Turns source text into a lazy, forward-only stream of [`Token`]s using an
//! ordered table of regex rules.
//!
//! At each offset the rules are tried in declaration order and the first
//! one whose pattern matches *anchored at that offset* wins. There is no
//! longest-match arbitration between rules: a grammar that wants keywords
//! to beat identifiers lists the keyword rule first. Skip rules consume
//! input (whitespace, comments) without emitting a token.
//!
//! A [`TokenRules`] table is compiled once and is immutable; every call to
//! [`TokenRules::tokenize`] returns a [`Tokenizer`] with its own cursor, so
//! independent scans never share state.
//!
//! # Example
//! ```rust
//! # use parscan::{TokenKind, TokenRules};
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Kind { Bof, Eof, Number, Op }
//! impl TokenKind for Kind {
//!     const BOF: Self = Kind::Bof;
//!     const EOF: Self = Kind::Eof;
//! }
//!
//! let rules = TokenRules::builder()
//!     .skip(r"\s+")
//!     .token(r"[0-9]+", Kind::Number)
//!     .token(r"[-+*/]", Kind::Op)
//!     .build()
//!     .unwrap();
//!
//! let kinds: Vec<Kind> = rules
//!     .tokenize("1 + 22")
//!     .map(|t| t.unwrap().kind)
//!     .collect();
//! assert_eq!(kinds, [Kind::Number, Kind::Op, Kind::Number, Kind::Eof]);
//! ```

use crate::{ErrorKind, ParseError, Position, Token, TokenKind};
use regex_automata::{Anchored, Input, meta::Regex};
use smartstring::alias::String;
use std::iter::FusedIterator;
use thiserror::Error;

/// Errors raised while compiling a [`TokenRules`] table.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A rule's pattern failed to compile.
    #[error("invalid pattern {pattern:?} for rule {index}: {source}")]
    InvalidPattern {
        /// Declaration index of the rule.
        index: usize,
        /// The pattern as written.
        pattern: String,
        /// The regex engine's complaint.
        #[source]
        source: Box<regex_automata::meta::BuildError>,
    },

    /// The table has no rules at all.
    #[error("token rule table is empty")]
    Empty,
}

/// What a rule does with its match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classify<T> {
    /// Emit a token of this kind.
    Token(T),
    /// Consume the match without emitting anything.
    Skip,
}

/// A compiled `(pattern, classification)` pair.
#[derive(Debug, Clone)]
pub struct TokenRule<T> {
    pattern: String,
    regex: Regex,
    class: Classify<T>,
}

impl<T> TokenRule<T> {
    /// The pattern as written by the grammar.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// What this rule does with its match.
    pub fn class(&self) -> &Classify<T> {
        &self.class
    }
}

/// Accumulates rules for a [`TokenRules`] table in declaration order.
#[derive(Debug, Clone)]
pub struct TokenRulesBuilder<T> {
    rules: Vec<(String, Classify<T>)>,
}

impl<T: TokenKind> TokenRulesBuilder<T> {
    /// Appends a rule that emits tokens of `kind`.
    pub fn token(mut self, pattern: &str, kind: T) -> Self {
        self.rules.push((String::from(pattern), Classify::Token(kind)));
        self
    }

    /// Appends a rule whose matches are skipped.
    pub fn skip(mut self, pattern: &str) -> Self {
        self.rules.push((String::from(pattern), Classify::Skip));
        self
    }

    /// Appends a rule with an explicit classification.
    pub fn rule(mut self, pattern: &str, class: Classify<T>) -> Self {
        self.rules.push((String::from(pattern), class));
        self
    }

    /// Compiles every pattern.
    ///
    /// # Errors
    /// [`RuleError::InvalidPattern`] names the first pattern that does not
    /// compile; [`RuleError::Empty`] if no rule was added.
    pub fn build(self) -> Result<TokenRules<T>, RuleError> {
        TokenRules::try_new(self.rules)
    }
}

/// An ordered, compiled table of token rules.
#[derive(Debug, Clone)]
pub struct TokenRules<T> {
    rules: Vec<TokenRule<T>>,
}

impl<T: TokenKind> TokenRules<T> {
    /// Starts an empty builder.
    pub fn builder() -> TokenRulesBuilder<T> {
        TokenRulesBuilder { rules: Vec::new() }
    }

    /// Compiles `(pattern, classification)` pairs, keeping their order.
    pub fn try_new<I, P>(rules: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = (P, Classify<T>)>,
        P: AsRef<str>,
    {
        let rules = rules
            .into_iter()
            .enumerate()
            .map(|(index, (pattern, class))| {
                let pattern = pattern.as_ref();
                let regex = Regex::new(pattern).map_err(|e| RuleError::InvalidPattern {
                    index,
                    pattern: String::from(pattern),
                    source: Box::new(e),
                })?;
                log::debug!("rule {}: {:?} -> {:?}", index, pattern, class);
                Ok(TokenRule {
                    pattern: String::from(pattern),
                    regex,
                    class,
                })
            })
            .collect::<Result<Vec<_>, RuleError>>()?;
        if rules.is_empty() {
            return Err(RuleError::Empty);
        }
        Ok(Self { rules })
    }

    /// The rules in declaration order.
    pub fn rules(&self) -> &[TokenRule<T>] {
        &self.rules
    }

    /// Returns a fresh lazy token stream over `src`.
    pub fn tokenize<'a>(&'a self, src: &'a str) -> Tokenizer<'a, T> {
        Tokenizer::new(self, src)
    }

    /// Finds the first rule matching a non-empty prefix at `at`.
    ///
    /// Returns the rule and the end offset of its match.
    fn find(&self, src: &str, at: usize) -> Option<(&TokenRule<T>, usize)> {
        let input = Input::new(src).range(at..).anchored(Anchored::Yes);
        self.rules.iter().find_map(|rule| match rule.regex.search(&input) {
            Some(m) if m.end() > at => Some((rule, m.end())),
            _ => None,
        })
    }
}

/// Counters collected by a [`Tokenizer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizerStats {
    /// Tokens emitted, EOF included.
    pub tokens: usize,
    /// Skip-rule matches consumed.
    pub skipped: usize,
    /// Bytes of source consumed.
    pub bytes: usize,
}

/// A lazy token stream over one source string.
///
/// Yields `Ok(token)` for each token, then one EOF token, then `None`
/// forever. A lexical error is yielded once as `Err`, after which the
/// stream is exhausted.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a, T> {
    rules: &'a TokenRules<T>,
    src: &'a str,
    cursor: Position,
    done: bool,
    stats: TokenizerStats,
}

impl<'a, T: TokenKind> Tokenizer<'a, T> {
    /// Creates a tokenizer positioned at the start of `src`.
    pub fn new(rules: &'a TokenRules<T>, src: &'a str) -> Self {
        Self {
            rules,
            src,
            cursor: Position::start(),
            done: false,
            stats: TokenizerStats::default(),
        }
    }

    /// The position of the next unread character.
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Counters collected so far.
    pub fn stats(&self) -> TokenizerStats {
        self.stats.clone()
    }

    fn try_next(&mut self) -> Result<Option<Token<T>>, ParseError> {
        if self.done {
            return Ok(None);
        }
        loop {
            let at = self.cursor.pos;
            if at >= self.src.len() {
                self.done = true;
                self.stats.tokens += 1;
                log::trace!("EOF at {}", self.cursor);
                return Ok(Some(Token::eof(self.cursor)));
            }

            let Some((rule, end)) = self.rules.find(self.src, at) else {
                self.done = true;
                let bad = self.src[at..].chars().next().unwrap_or_default();
                return Err(ParseError::new(
                    ErrorKind::Lexical,
                    format!("unexpected character {:?}", bad),
                    self.cursor,
                    bad.to_string(),
                ));
            };

            let text = &self.src[at..end];
            let start = self.cursor;
            self.cursor = start.advance(text);
            self.stats.bytes += text.len();
            log::trace!(
                "MATCHED: rule {:?}, class {:?}, text {:?} at {}",
                rule.pattern(),
                rule.class(),
                text,
                start
            );

            match rule.class {
                Classify::Skip => self.stats.skipped += 1,
                Classify::Token(kind) => {
                    self.stats.tokens += 1;
                    return Ok(Some(Token::new(kind, text, start)));
                }
            }
        }
    }
}

impl<T: TokenKind> Iterator for Tokenizer<'_, T> {
    type Item = Result<Token<T>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.try_next().transpose()
    }
}

impl<T: TokenKind> FusedIterator for Tokenizer<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        Bof,
        Eof,
        Keyword,
        Ident,
        Number,
        Symbol,
    }

    impl TokenKind for Kind {
        const BOF: Self = Kind::Bof;
        const EOF: Self = Kind::Eof;
    }

    fn rules() -> TokenRules<Kind> {
        TokenRules::builder()
            .skip(r"\s+")
            .token(r"(?:CONST|VAR|BEGIN|END)\b", Kind::Keyword)
            .token(r"[0-9]+", Kind::Number)
            .token(r"[A-Za-z_][A-Za-z0-9_]*", Kind::Ident)
            .token(r":=|[-+*/=;.,()]", Kind::Symbol)
            .build()
            .unwrap()
    }

    fn tok(kind: Kind, text: &str) -> (Kind, String) {
        (kind, String::from(text))
    }

    fn lex(rules: &TokenRules<Kind>, src: &str) -> Vec<(Kind, String)> {
        rules
            .tokenize(src)
            .map(|t| {
                let t = t.unwrap();
                (t.kind, t.text)
            })
            .collect()
    }

    #[test]
    fn classifies_a_small_program() {
        init_logger();
        let rules = rules();
        let toks = lex(&rules, "CONST x = 5; VAR y; BEGIN y := x * 2 END.");
        let kinds: Vec<Kind> = toks.iter().map(|(k, _)| *k).collect();
        use Kind::*;
        assert_eq!(
            kinds,
            [
                Keyword, Ident, Symbol, Number, Symbol, Keyword, Ident, Symbol, Keyword, Ident,
                Symbol, Ident, Symbol, Number, Keyword, Symbol, Eof
            ]
        );
        assert_eq!(toks[2].1.as_str(), "=");
        assert_eq!(toks[10].1.as_str(), ":=");
        assert!(toks.last().unwrap().1.is_empty());
    }

    #[test]
    fn declaration_order_decides_between_rules() {
        init_logger();
        let rules = rules();
        // Keyword rule is listed first, but `\b` keeps it from eating a prefix.
        let toks = lex(&rules, "BEGIN BEGINNER");
        assert_eq!(toks[0], tok(Kind::Keyword, "BEGIN"));
        assert_eq!(toks[1], tok(Kind::Ident, "BEGINNER"));

        // An identifier rule listed first shadows the keyword rule entirely.
        let shadowed = TokenRules::builder()
            .skip(r"\s+")
            .token(r"[A-Z]+", Kind::Ident)
            .token(r"BEGIN", Kind::Keyword)
            .build()
            .unwrap();
        assert_eq!(lex(&shadowed, "BEGIN")[0], tok(Kind::Ident, "BEGIN"));
    }

    #[test]
    fn first_match_is_not_longest_match() {
        let rules = TokenRules::builder()
            .token(r"=", Kind::Symbol)
            .token(r"==", Kind::Keyword)
            .build()
            .unwrap();
        let toks = lex(&rules, "==");
        assert_eq!(
            toks,
            [
                tok(Kind::Symbol, "="),
                tok(Kind::Symbol, "="),
                tok(Kind::Eof, "")
            ]
        );
    }

    #[test]
    fn tracks_lines_and_columns() {
        let rules = rules();
        let toks: Vec<Token<Kind>> = rules
            .tokenize("x\n  yy  z\n\n7")
            .collect::<Result<_, _>>()
            .unwrap();
        let at: Vec<(usize, usize, usize)> = toks.iter().map(|t| (t.pos(), t.line(), t.col())).collect();
        assert_eq!(at, [(0, 1, 1), (4, 2, 3), (8, 2, 7), (11, 4, 1), (12, 4, 2)]);
    }

    #[test]
    fn positions_never_go_backwards() {
        let rules = rules();
        let toks: Vec<Token<Kind>> = rules
            .tokenize("CONST a = 1, b = 22;\nVAR c;\n  BEGIN c := a + b END .")
            .collect::<Result<_, _>>()
            .unwrap();
        for w in toks.windows(2) {
            assert!(w[0].pos() <= w[1].pos());
            if w[0].line() == w[1].line() {
                assert!(w[0].col() <= w[1].col());
            } else {
                assert!(w[0].line() < w[1].line());
            }
        }
    }

    #[test]
    fn tokenizing_twice_is_identical() {
        let rules = rules();
        let src = "VAR q;\nBEGIN q := (q + 1) * 3 END.";
        let a: Vec<_> = rules.tokenize(src).collect();
        let b: Vec<_> = rules.tokenize(src).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_and_blank_input_yield_only_eof() {
        let rules = rules();
        assert_eq!(lex(&rules, ""), [tok(Kind::Eof, "")]);

        let toks: Vec<Token<Kind>> = rules.tokenize("  \n ").collect::<Result<_, _>>().unwrap();
        assert_eq!(toks.len(), 1);
        assert!(toks[0].is_eof());
        assert_eq!(toks[0].position, Position::new(4, 2, 2));
    }

    #[test]
    fn stream_is_fused_after_eof() {
        let rules = rules();
        let mut t = rules.tokenize("1");
        assert!(matches!(t.next(), Some(Ok(Token { kind: Kind::Number, .. }))));
        assert!(matches!(t.next(), Some(Ok(Token { kind: Kind::Eof, .. }))));
        assert!(t.next().is_none());
        assert!(t.next().is_none());
    }

    #[test]
    fn unmatched_character_is_a_lexical_error() {
        let rules = rules();
        let mut t = rules.tokenize("x =\n  $y");
        assert!(t.next().unwrap().is_ok());
        assert!(t.next().unwrap().is_ok());
        let err = t.next().unwrap().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lexical);
        assert_eq!(err.offending.as_str(), "$");
        assert_eq!(err.position, Position::new(6, 2, 3));
        assert!(err.message.contains("'$'"));
        assert!(t.next().is_none());
    }

    #[test]
    fn zero_length_matches_never_win() {
        let rules = TokenRules::builder()
            .skip(r"\s*")
            .token(r"[a-z]*", Kind::Ident)
            .token(r"[0-9]+", Kind::Number)
            .build()
            .unwrap();
        assert_eq!(
            lex(&rules, "ab 12"),
            [
                tok(Kind::Ident, "ab"),
                tok(Kind::Number, "12"),
                tok(Kind::Eof, "")
            ]
        );
    }

    #[test]
    fn stats_count_tokens_and_skips() {
        let rules = rules();
        let mut t = rules.tokenize("a  b");
        while let Some(r) = t.next() {
            r.unwrap();
        }
        assert_eq!(
            t.stats(),
            TokenizerStats {
                tokens: 3,
                skipped: 1,
                bytes: 4
            }
        );
    }

    #[test]
    fn stats_count_bytes_not_chars() {
        let rules = TokenRules::builder()
            .skip(r"\s+")
            .token(r"\w+", Kind::Ident)
            .build()
            .unwrap();
        let mut t = rules.tokenize("héllo wörld");
        t.next().unwrap().unwrap();
        let second = t.next().unwrap().unwrap();
        assert_eq!(second.position, Position::new(7, 1, 7));
        assert_eq!(t.stats().bytes, 13);
    }

    #[test]
    fn bad_pattern_is_reported_with_its_index() {
        let err = TokenRules::<Kind>::builder()
            .skip(r"\s+")
            .token(r"(unclosed", Kind::Ident)
            .build()
            .unwrap_err();
        assert!(matches!(err, RuleError::InvalidPattern { index: 1, .. }));
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn empty_table_is_rejected() {
        let err = TokenRules::<Kind>::try_new(Vec::<(&str, Classify<Kind>)>::new()).unwrap_err();
        assert!(matches!(err, RuleError::Empty));
    }
}
