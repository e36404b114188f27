//! # parscan-pl0
//!
//! A PL/0 front end built on **parscan**: a complete, small consumer of the
//! tokenizer, scanner and expression parser.
//!
//! - [`token`]: the PL/0 [`Kind`] enumeration and its rule table.
//! - [`symtab`]: block-scoped declarations ([`SymTab`]).
//! - [`ast`]: the syntax tree.
//! - [`parser`]: recursive descent over the scanner, with arithmetic
//!   delegated to a shared [`ExpressionParser`](parscan::ExpressionParser).
//!
//! ## Example
//!
//! ```rust
//! use parscan_pl0::{Statement, parse};
//!
//! let program = parse("CONST x = 5; VAR y; BEGIN y := x * 2 END.").unwrap();
//! let Statement::Begin(body) = &program.block.body else { panic!("expected BEGIN") };
//! let Statement::Assign { value, .. } = &body[0] else { panic!("expected :=") };
//! assert_eq!(value.to_string(), "(x * 2)");
//! ```
pub mod ast;
pub mod parser;
pub mod symtab;
pub mod token;

pub use ast::{BinOp, Block, Condition, Expr, Procedure, Program, RelOp, Statement, UnOp};
pub use parser::{Pl0Parser, parse};
pub use symtab::{SymTab, SymTabError, Symbol};
pub use token::{Kind, tokenize};
