//! # Operator-precedence expressions
//!
//! [`ExpressionParser`] resolves prefix and infix operators over a
//! [`Scanner`] by precedence climbing, so a grammar does not need one
//! recursive-descent function per precedence tier.
//!
//! A parser is built from:
//! - prefix definitions: a precedence, one trigger symbol, and a combine
//!   callback `(scanner, ctx, symbol, operand) -> node`;
//! - infix definitions: a precedence, one or more trigger symbols sharing a
//!   combine callback `(scanner, ctx, symbol, left, right) -> node`, and an
//!   [`Assoc`];
//! - exactly one primary callback `(scanner, ctx) -> node` for everything
//!   that is not an operator (literals, names, parenthesized groups).
//!
//! Operators are recognised by the *text* of the current token. **Smaller
//! precedence numbers bind tighter.** An infix symbol the parser does not
//! own simply ends the expression and is left for the enclosing grammar
//! rule.
//!
//! The operator tables are immutable after [`ExpressionParserBuilder::build`];
//! a parser holds no per-parse state and can be shared between threads and
//! reused by any number of independent scanners.
//!
//! # Example
//! ```rust
//! # use parscan::{ExpressionParser, Scanner, TokenKind, TokenRules};
//! # #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! # enum Kind { Bof, Eof, Num, Op }
//! # impl TokenKind for Kind {
//! #     const BOF: Self = Kind::Bof;
//! #     const EOF: Self = Kind::Eof;
//! # }
//! let rules = TokenRules::builder()
//!     .skip(r"\s+")
//!     .token(r"[0-9]+", Kind::Num)
//!     .token(r"[-+*/]", Kind::Op)
//!     .build()
//!     .unwrap();
//!
//! let calc = ExpressionParser::<Kind, (), i64>::builder()
//!     .prefix(0, "-", |_, _, _, x| Ok(-x))
//!     .infix(1, &["*", "/"], |_, _, op, l, r| Ok(if op == "*" { l * r } else { l / r }))
//!     .infix(2, &["+", "-"], |_, _, op, l, r| Ok(if op == "+" { l + r } else { l - r }))
//!     .build(|s, _| {
//!         let n = s.consume_kind(Kind::Num, Some("expected a number"))?;
//!         Ok(n.parse().unwrap())
//!     })
//!     .unwrap();
//!
//! let mut s = Scanner::new(rules.tokenize("1 + 2 * 3 - -4"));
//! assert_eq!(calc.parse(&mut s, &mut ()).unwrap(), 11);
//! ```

use crate::{ParseError, Scanner, TokenKind};
use indexmap::IndexMap;
use smartstring::alias::String;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Operator binding strength. Smaller values bind tighter.
pub type Precedence = u16;

/// Callback producing a primary (non-operator) expression.
pub type PrimaryFn<T, C, R> =
    dyn for<'s> Fn(&mut Scanner<'s, T>, &mut C) -> Result<R, ParseError> + Send + Sync;

/// Callback combining a prefix operator with its operand.
pub type PrefixFn<T, C, R> =
    dyn for<'s> Fn(&mut Scanner<'s, T>, &mut C, &str, R) -> Result<R, ParseError> + Send + Sync;

/// Callback combining an infix operator with its two operands.
pub type InfixFn<T, C, R> =
    dyn for<'s> Fn(&mut Scanner<'s, T>, &mut C, &str, R, R) -> Result<R, ParseError> + Send + Sync;

/// The position of an operator relative to its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    /// Before its operand, e.g. `-x`.
    Prefix,
    /// Between its operands, e.g. `x + y`.
    Infix,
}

impl fmt::Display for Fixity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Fixity::Prefix => "prefix",
            Fixity::Infix => "infix",
        })
    }
}

/// How infix operators of equal precedence group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Assoc {
    /// `a - b - c` is `(a - b) - c`.
    #[default]
    Left,
    /// `a ^ b ^ c` is `a ^ (b ^ c)`.
    Right,
}

/// Errors raised while building an [`ExpressionParser`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperatorError {
    /// Two definitions of the same fixity claim one trigger symbol.
    #[error("{fixity} operator {symbol:?} is defined more than once")]
    Duplicate {
        /// Prefix or infix.
        fixity: Fixity,
        /// The contested trigger.
        symbol: String,
    },

    /// A trigger symbol is the empty string.
    #[error("{fixity} operator has an empty trigger symbol")]
    EmptySymbol {
        /// Prefix or infix.
        fixity: Fixity,
    },

    /// An infix definition lists no trigger symbols.
    #[error("infix definition at precedence {precedence} has no symbols")]
    NoSymbols {
        /// Precedence of the offending definition.
        precedence: Precedence,
    },
}

struct PrefixDef<T, C, R> {
    precedence: Precedence,
    combine: Arc<PrefixFn<T, C, R>>,
}

struct InfixDef<T, C, R> {
    precedence: Precedence,
    assoc: Assoc,
    combine: Arc<InfixFn<T, C, R>>,
}

/// Collects operator definitions for an [`ExpressionParser`].
///
/// Conflicts are reported by [`build`](Self::build), not when a definition
/// is added.
pub struct ExpressionParserBuilder<T, C, R> {
    prefix: Vec<(String, PrefixDef<T, C, R>)>,
    infix: Vec<(Vec<String>, InfixDef<T, C, R>)>,
}

impl<T: TokenKind, C, R> ExpressionParserBuilder<T, C, R> {
    /// Registers a prefix operator.
    pub fn prefix<F>(mut self, precedence: Precedence, symbol: &str, combine: F) -> Self
    where
        F: for<'s> Fn(&mut Scanner<'s, T>, &mut C, &str, R) -> Result<R, ParseError>
            + Send
            + Sync
            + 'static,
    {
        self.prefix.push((
            String::from(symbol),
            PrefixDef {
                precedence,
                combine: Arc::new(combine),
            },
        ));
        self
    }

    /// Registers left-associative infix operators sharing one combine callback.
    pub fn infix<F>(self, precedence: Precedence, symbols: &[&str], combine: F) -> Self
    where
        F: for<'s> Fn(&mut Scanner<'s, T>, &mut C, &str, R, R) -> Result<R, ParseError>
            + Send
            + Sync
            + 'static,
    {
        self.infix_with(precedence, Assoc::Left, symbols, combine)
    }

    /// Registers right-associative infix operators sharing one combine callback.
    pub fn infix_right<F>(self, precedence: Precedence, symbols: &[&str], combine: F) -> Self
    where
        F: for<'s> Fn(&mut Scanner<'s, T>, &mut C, &str, R, R) -> Result<R, ParseError>
            + Send
            + Sync
            + 'static,
    {
        self.infix_with(precedence, Assoc::Right, symbols, combine)
    }

    /// Registers infix operators with an explicit associativity.
    pub fn infix_with<F>(mut self, precedence: Precedence, assoc: Assoc, symbols: &[&str], combine: F) -> Self
    where
        F: for<'s> Fn(&mut Scanner<'s, T>, &mut C, &str, R, R) -> Result<R, ParseError>
            + Send
            + Sync
            + 'static,
    {
        self.infix.push((
            symbols.iter().map(|s| String::from(*s)).collect(),
            InfixDef {
                precedence,
                assoc,
                combine: Arc::new(combine),
            },
        ));
        self
    }

    /// Validates the tables and attaches the primary callback.
    ///
    /// # Errors
    /// - [`OperatorError::Duplicate`] if two prefix definitions, or two infix
    ///   definitions, claim the same symbol. A symbol may be both prefix and
    ///   infix (e.g. `-`).
    /// - [`OperatorError::EmptySymbol`] for an empty trigger.
    /// - [`OperatorError::NoSymbols`] for an infix definition without triggers.
    pub fn build<F>(self, primary: F) -> Result<ExpressionParser<T, C, R>, OperatorError>
    where
        F: for<'s> Fn(&mut Scanner<'s, T>, &mut C) -> Result<R, ParseError> + Send + Sync + 'static,
    {
        let mut prefix = IndexMap::new();
        for (symbol, def) in self.prefix {
            if symbol.is_empty() {
                return Err(OperatorError::EmptySymbol {
                    fixity: Fixity::Prefix,
                });
            }
            if prefix.contains_key(&symbol) {
                return Err(OperatorError::Duplicate {
                    fixity: Fixity::Prefix,
                    symbol,
                });
            }
            log::debug!("prefix {:?} at {}", symbol, def.precedence);
            prefix.insert(symbol, def);
        }

        let mut infix = IndexMap::new();
        for (symbols, def) in self.infix {
            if symbols.is_empty() {
                return Err(OperatorError::NoSymbols {
                    precedence: def.precedence,
                });
            }
            for symbol in symbols {
                if symbol.is_empty() {
                    return Err(OperatorError::EmptySymbol {
                        fixity: Fixity::Infix,
                    });
                }
                if infix.contains_key(&symbol) {
                    return Err(OperatorError::Duplicate {
                        fixity: Fixity::Infix,
                        symbol,
                    });
                }
                log::debug!("infix {:?} at {} ({:?})", symbol, def.precedence, def.assoc);
                infix.insert(
                    symbol,
                    InfixDef {
                        precedence: def.precedence,
                        assoc: def.assoc,
                        combine: Arc::clone(&def.combine),
                    },
                );
            }
        }

        Ok(ExpressionParser {
            prefix,
            infix,
            primary: Box::new(primary),
        })
    }
}

/// A generic precedence-climbing expression parser.
///
/// `T` is the grammar's token kind, `C` the caller's context threaded
/// through every callback, and `R` the node type the callbacks build.
pub struct ExpressionParser<T, C, R> {
    prefix: IndexMap<String, PrefixDef<T, C, R>>,
    infix: IndexMap<String, InfixDef<T, C, R>>,
    primary: Box<PrimaryFn<T, C, R>>,
}

impl<T: TokenKind, C, R> ExpressionParser<T, C, R> {
    /// Starts an empty builder.
    pub fn builder() -> ExpressionParserBuilder<T, C, R> {
        ExpressionParserBuilder {
            prefix: Vec::new(),
            infix: Vec::new(),
        }
    }

    /// Parses one expression, admitting every registered operator.
    ///
    /// # Errors
    /// Whatever the scanner or the callbacks report, unchanged.
    pub fn parse(&self, scanner: &mut Scanner<'_, T>, ctx: &mut C) -> Result<R, ParseError> {
        self.parse_bounded(scanner, ctx, Precedence::MAX)
    }

    /// Parses one expression, stopping at infix operators whose precedence
    /// exceeds `bound` (i.e. that bind looser than `bound`).
    pub fn parse_bounded(
        &self,
        scanner: &mut Scanner<'_, T>,
        ctx: &mut C,
        bound: Precedence,
    ) -> Result<R, ParseError> {
        self.climb(scanner, ctx, i32::from(bound))
    }

    // `bound` is signed so that a left-associative operator of precedence 0
    // can demand a strictly tighter right operand.
    fn climb(&self, scanner: &mut Scanner<'_, T>, ctx: &mut C, bound: i32) -> Result<R, ParseError> {
        let prefix = self.prefix.get(scanner.current()?.text.as_str());
        let mut left = match prefix {
            Some(def) => {
                let symbol = scanner.consume()?;
                let operand = self.climb(scanner, ctx, i32::from(def.precedence))?;
                log::trace!("prefix {:?}", symbol);
                (def.combine)(scanner, ctx, symbol.as_str(), operand)?
            }
            None => (self.primary)(scanner, ctx)?,
        };

        loop {
            let def = match self.infix.get(scanner.current()?.text.as_str()) {
                Some(def) if i32::from(def.precedence) <= bound => def,
                _ => break,
            };
            let symbol = scanner.consume()?;
            let right_bound = match def.assoc {
                Assoc::Left => i32::from(def.precedence) - 1,
                Assoc::Right => i32::from(def.precedence),
            };
            let right = self.climb(scanner, ctx, right_bound)?;
            log::trace!("infix {:?}", symbol);
            left = (def.combine)(scanner, ctx, symbol.as_str(), left, right)?;
        }

        Ok(left)
    }
}

impl<T, C, R> fmt::Debug for ExpressionParser<T, C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionParser")
            .field(
                "prefix",
                &self.prefix.iter().map(|(s, d)| (s, d.precedence)).collect::<Vec<_>>(),
            )
            .field(
                "infix",
                &self
                    .infix
                    .iter()
                    .map(|(s, d)| (s, d.precedence, d.assoc))
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}
