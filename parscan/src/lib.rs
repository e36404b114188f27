//! # parscan
//!
//! Building blocks for hand-written recursive-descent parsers:
//!
//! - [`TokenRules`] / [`Tokenizer`]: an ordered table of anchored regular
//!   expressions turned into a lazy stream of [`Token`]s. The first rule
//!   that matches at the cursor wins; rules may discard what they match.
//! - [`Scanner`]: a buffered view over any token stream with arbitrary
//!   lookahead, consumption checked by kind or text, optional elements,
//!   and a stable end-of-input token.
//! - [`ExpressionParser`]: precedence climbing over a [`Scanner`] for
//!   prefix and infix operators, configured once and shared freely.
//!
//! Every failure is a [`ParseError`] carrying a [`Position`]. The first
//! error ends the parse.
//!
//! The grammar supplies its own token classification by implementing
//! [`TokenKind`] for a small `Copy` enum.

mod error;
mod expr;
mod scanner;
mod token;
mod tokenizer;

pub use crate::error::{ErrorKind, ParseError, Position};
pub use crate::expr::{
    Assoc, ExpressionParser, ExpressionParserBuilder, Fixity, InfixFn, OperatorError, Precedence,
    PrefixFn, PrimaryFn,
};
pub use crate::scanner::{Scanner, ScannerStats};
pub use crate::token::{Token, TokenKind};
pub use crate::tokenizer::{
    Classify, RuleError, TokenRule, TokenRules, TokenRulesBuilder, Tokenizer, TokenizerStats,
};
