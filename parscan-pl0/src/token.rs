//! PL/0 token classification and rule table.

use once_cell::sync::Lazy;
use parscan::{TokenKind, TokenRules, Tokenizer};

/// PL/0 token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bof,
    Eof,
    /// One of [`KEYWORDS`].
    Keyword,
    Ident,
    Number,
    /// Punctuation and operators.
    Symbol,
}

impl TokenKind for Kind {
    const BOF: Self = Kind::Bof;
    const EOF: Self = Kind::Eof;
}

/// Reserved words. Matched case-sensitively.
pub const KEYWORDS: &[&str] = &[
    "CONST",
    "VAR",
    "PROCEDURE",
    "CALL",
    "BEGIN",
    "END",
    "IF",
    "THEN",
    "WHILE",
    "DO",
    "ODD",
];

/// The PL/0 rule table, compiled on first use.
///
/// Keywords are listed before identifiers, and two-character symbols before
/// single characters, because the first matching rule wins.
pub static RULES: Lazy<TokenRules<Kind>> = Lazy::new(|| {
    let keywords = format!(r"(?:{})\b", KEYWORDS.join("|"));
    TokenRules::builder()
        .skip(r"\s+")
        .skip(r"\{[^}]*\}")
        .token(&keywords, Kind::Keyword)
        .token(r"[0-9]+", Kind::Number)
        .token(r"[A-Za-z_][A-Za-z0-9_]*", Kind::Ident)
        .token(r":=|<=|>=|[-+*/=#<>(),;.?!]", Kind::Symbol)
        .build()
        .expect("PL/0 token rules compile")
});

/// Tokenizes `src` with [`RULES`].
pub fn tokenize(src: &str) -> Tokenizer<'_, Kind> {
    RULES.tokenize(src)
}
