//! PL/0 syntax tree.
//!
//! Names are kept as written; the parser has already checked that each one
//! refers to a declaration of the right sort.

use smartstring::alias::String;
use std::fmt;

/// A whole program: the outermost block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// The outermost block.
    pub block: Block,
}

/// Declarations followed by one statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    /// `CONST` declarations with their values.
    pub consts: Vec<(String, i64)>,
    /// `VAR` declarations.
    pub vars: Vec<String>,
    /// Nested procedures, in declaration order.
    pub procedures: Vec<Procedure>,
    /// The block's statement.
    pub body: Statement,
}

/// `PROCEDURE name; block;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Procedure {
    /// Name the procedure is called by.
    pub name: String,
    /// Its body, with its own declarations.
    pub block: Block,
}

/// A PL/0 statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Statement {
    /// `name := value`
    Assign { name: String, value: Expr },
    /// `CALL name`
    Call(String),
    /// `? name`
    Read(String),
    /// `! value`
    Write(Expr),
    /// `BEGIN s1; s2; ... END`
    Begin(Vec<Statement>),
    /// `IF cond THEN then`
    If { cond: Condition, then: Box<Statement> },
    /// `WHILE cond DO body`
    While { cond: Condition, body: Box<Statement> },
    /// Nothing at all, e.g. between `;` and `END`.
    #[default]
    Empty,
}

/// The test of an `IF` or `WHILE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `ODD e`
    Odd(Expr),
    /// `left op right`
    Compare { op: RelOp, left: Expr, right: Expr },
}

/// Relational operator of a [`Condition::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    /// `=`
    Eq,
    /// `#`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl RelOp {
    /// Maps source text to an operator.
    pub fn from_symbol(s: &str) -> Option<Self> {
        Some(match s {
            "=" => RelOp::Eq,
            "#" => RelOp::Ne,
            "<" => RelOp::Lt,
            "<=" => RelOp::Le,
            ">" => RelOp::Gt,
            ">=" => RelOp::Ge,
            _ => return None,
        })
    }

    /// The operator as written.
    pub fn symbol(&self) -> &'static str {
        match self {
            RelOp::Eq => "=",
            RelOp::Ne => "#",
            RelOp::Lt => "<",
            RelOp::Le => "<=",
            RelOp::Gt => ">",
            RelOp::Ge => ">=",
        }
    }
}

/// Sign prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    /// `-`
    Neg,
    /// `+`
    Pos,
}

impl UnOp {
    /// The operator as written.
    pub fn symbol(&self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Pos => "+",
        }
    }
}

/// Arithmetic infix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl BinOp {
    /// Maps source text to an operator.
    pub fn from_symbol(s: &str) -> Option<Self> {
        Some(match s {
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            _ => return None,
        })
    }

    /// The operator as written.
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        }
    }
}

/// An arithmetic expression.
///
/// `Display` writes every compound node in parentheses, which makes the
/// grouping chosen by the parser visible: `1 + 2 * 3` prints as
/// `(1 + (2 * 3))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// An integer literal.
    Number(i64),
    /// A constant or variable reference.
    Name(String),
    /// A signed operand.
    Unary { op: UnOp, operand: Box<Expr> },
    /// Two operands joined by an arithmetic operator.
    Binary { op: BinOp, left: Box<Expr>, right: Box<Expr> },
}

impl Expr {
    /// Boxes `operand` under `op`.
    pub fn unary(op: UnOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Boxes both operands under `op`.
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{n}"),
            Expr::Name(name) => write!(f, "{name}"),
            Expr::Unary { op, operand } => write!(f, "({}{})", op.symbol(), operand),
            Expr::Binary { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Odd(e) => write!(f, "ODD {e}"),
            Condition::Compare { op, left, right } => write!(f, "{} {} {}", left, op.symbol(), right),
        }
    }
}
