//! # PL/0 parser
//!
//! Recursive descent for blocks, statements and conditions, with arithmetic
//! handed to a shared [`ExpressionParser`]. Declarations are checked while
//! parsing: every name must be declared in an enclosing block and used as
//! the sort it was declared as.
//!
//! ```text
//! program   = block "." .
//! block     = [ "CONST" ident "=" number { "," ident "=" number } ";" ]
//!             [ "VAR" ident { "," ident } ";" ]
//!             { "PROCEDURE" ident ";" block ";" } statement .
//! statement = [ ident ":=" expr | "CALL" ident | "?" ident | "!" expr
//!             | "BEGIN" statement { ";" statement } "END"
//!             | "IF" condition "THEN" statement
//!             | "WHILE" condition "DO" statement ] .
//! condition = "ODD" expr | expr ( "=" | "#" | "<" | "<=" | ">" | ">=" ) expr .
//! ```
//!
//! ## Example
//! ```rust
//! let program = parscan_pl0::parse("VAR x; BEGIN x := 1 + 2 * 3; ! x END.").unwrap();
//! assert_eq!(program.block.vars.len(), 1);
//! ```

use crate::ast::{BinOp, Block, Condition, Expr, Procedure, Program, RelOp, Statement, UnOp};
use crate::symtab::{SymTab, SymTabError, Symbol};
use crate::token::{Kind, tokenize};
use once_cell::sync::Lazy;
use parscan::{ExpressionParser, ParseError, Scanner};
use smartstring::alias::String;

/// PL/0 arithmetic: unary sign binds tightest, then `*` `/`, then `+` `-`.
pub static EXPR: Lazy<ExpressionParser<Kind, SymTab, Expr>> = Lazy::new(|| {
    ExpressionParser::builder()
        .prefix(0, "-", |_, _, _, x| Ok(Expr::unary(UnOp::Neg, x)))
        .prefix(0, "+", |_, _, _, x| Ok(Expr::unary(UnOp::Pos, x)))
        .infix(1, &["*", "/"], binary)
        .infix(2, &["+", "-"], binary)
        .build(primary)
        .expect("PL/0 operator table is consistent")
});

fn binary(
    s: &mut Scanner<'_, Kind>,
    _: &mut SymTab,
    op: &str,
    left: Expr,
    right: Expr,
) -> Result<Expr, ParseError> {
    let op = BinOp::from_symbol(op).ok_or_else(|| s.error(format!("unknown operator {op:?}")))?;
    Ok(Expr::binary(op, left, right))
}

fn primary(s: &mut Scanner<'_, Kind>, symtab: &mut SymTab) -> Result<Expr, ParseError> {
    if s.try_consume("(")? {
        let inner = EXPR.parse(s, symtab)?;
        s.consume_text(")", Some("expected \")\""))?;
        return Ok(inner);
    }
    let kind = s.current()?.kind;
    match kind {
        Kind::Number => number(s).map(Expr::Number),
        Kind::Ident => {
            let name = s.consume()?;
            match symtab.lookup(&name) {
                Ok(Symbol::Const(_) | Symbol::Var) => Ok(Expr::Name(name)),
                Ok(Symbol::Procedure) => Err(s.error(format!("procedure {name} used as a value"))),
                Err(e) => Err(s.error(e.to_string())),
            }
        }
        _ => Err(s.unexpected("expected a number, a name or \"(\"")),
    }
}

fn number(s: &mut Scanner<'_, Kind>) -> Result<i64, ParseError> {
    let text = s.consume_kind(Kind::Number, Some("expected a number"))?;
    text.parse()
        .map_err(|_| s.error(format!("number {text} is out of range")))
}

/// Parses a complete PL/0 program.
///
/// # Errors
/// The first lexical, syntax or declaration error, with its position.
pub fn parse(src: &str) -> Result<Program, ParseError> {
    Pl0Parser::new(src).program()
}

/// Parser state for one source text.
pub struct Pl0Parser<'a> {
    scanner: Scanner<'a, Kind>,
    symtab: SymTab,
}

impl<'a> Pl0Parser<'a> {
    /// Prepares to parse `src` with an empty symbol table.
    pub fn new(src: &'a str) -> Self {
        Self {
            scanner: Scanner::new(tokenize(src)),
            symtab: SymTab::new(),
        }
    }

    /// `program = block "."`, followed by end of input.
    pub fn program(mut self) -> Result<Program, ParseError> {
        let block = self.block()?;
        self.scanner.consume_text(".", Some("expected \".\" at end of program"))?;
        if !self.scanner.eof()? {
            return Err(self.scanner.unexpected("expected end of input"));
        }
        log::debug!("parsed program, scanner stats {:?}", self.scanner.stats());
        Ok(Program { block })
    }

    fn block(&mut self) -> Result<Block, ParseError> {
        let mut block = Block::default();

        if self.scanner.try_consume("CONST")? {
            loop {
                let name = self.fresh_ident()?;
                self.scanner.consume_text("=", Some("expected \"=\" after constant name"))?;
                let value = number(&mut self.scanner)?;
                self.declare(&name, Symbol::Const(value))?;
                block.consts.push((name, value));
                if !self.scanner.try_consume(",")? {
                    break;
                }
            }
            self.scanner.consume_text(";", Some("expected \";\" after constants"))?;
        }

        if self.scanner.try_consume("VAR")? {
            loop {
                let name = self.fresh_ident()?;
                self.declare(&name, Symbol::Var)?;
                block.vars.push(name);
                if !self.scanner.try_consume(",")? {
                    break;
                }
            }
            self.scanner.consume_text(";", Some("expected \";\" after variables"))?;
        }

        while self.scanner.try_consume("PROCEDURE")? {
            let name = self.fresh_ident()?;
            self.declare(&name, Symbol::Procedure)?;
            self.scanner.consume_text(";", Some("expected \";\" after procedure name"))?;
            self.symtab.enter();
            let inner = self.block();
            self.symtab.leave();
            let inner = inner?;
            self.scanner.consume_text(";", Some("expected \";\" after procedure body"))?;
            block.procedures.push(Procedure { name, block: inner });
        }

        block.body = self.statement()?;
        Ok(block)
    }

    fn statement(&mut self) -> Result<Statement, ParseError> {
        let current = self.scanner.current()?;
        let (kind, text) = (current.kind, current.text.clone());
        if kind == Kind::Ident {
            let name = self.scanner.consume()?;
            self.expect_symbol(&name, Symbol::Var, "cannot assign to")?;
            self.scanner.consume_text(":=", Some("expected \":=\""))?;
            let value = self.expression()?;
            return Ok(Statement::Assign { name, value });
        }

        match text.as_str() {
            "CALL" => {
                self.scanner.consume()?;
                let name = self.ident("expected a procedure name")?;
                self.expect_symbol(&name, Symbol::Procedure, "cannot call")?;
                Ok(Statement::Call(name))
            }
            "?" => {
                self.scanner.consume()?;
                let name = self.ident("expected a variable name")?;
                self.expect_symbol(&name, Symbol::Var, "cannot read into")?;
                Ok(Statement::Read(name))
            }
            "!" => {
                self.scanner.consume()?;
                Ok(Statement::Write(self.expression()?))
            }
            "BEGIN" => {
                self.scanner.consume()?;
                let mut body = vec![self.statement()?];
                while self.scanner.try_consume(";")? {
                    body.push(self.statement()?);
                }
                self.scanner.consume_text("END", Some("expected \";\" or \"END\""))?;
                Ok(Statement::Begin(body))
            }
            "IF" => {
                self.scanner.consume()?;
                let cond = self.condition()?;
                self.scanner.consume_text("THEN", Some("expected \"THEN\""))?;
                let then = Box::new(self.statement()?);
                Ok(Statement::If { cond, then })
            }
            "WHILE" => {
                self.scanner.consume()?;
                let cond = self.condition()?;
                self.scanner.consume_text("DO", Some("expected \"DO\""))?;
                let body = Box::new(self.statement()?);
                Ok(Statement::While { cond, body })
            }
            _ => Ok(Statement::Empty),
        }
    }

    fn condition(&mut self) -> Result<Condition, ParseError> {
        if self.scanner.try_consume("ODD")? {
            return Ok(Condition::Odd(self.expression()?));
        }
        let left = self.expression()?;
        let op = RelOp::from_symbol(self.scanner.current()?.text.as_str());
        let Some(op) = op else {
            return Err(self.scanner.unexpected("expected a relational operator"));
        };
        self.scanner.consume()?;
        let right = self.expression()?;
        Ok(Condition::Compare { op, left, right })
    }

    fn expression(&mut self) -> Result<Expr, ParseError> {
        EXPR.parse(&mut self.scanner, &mut self.symtab)
    }

    fn ident(&mut self, message: &str) -> Result<String, ParseError> {
        self.scanner.consume_kind(Kind::Ident, Some(message))
    }

    /// An identifier about to be declared in the current block.
    fn fresh_ident(&mut self) -> Result<String, ParseError> {
        let name = self.ident("expected an identifier")?;
        if self.symtab.is_local(&name) {
            let e = SymTabError::Duplicate { name };
            return Err(self.scanner.error(e.to_string()));
        }
        Ok(name)
    }

    fn declare(&mut self, name: &str, symbol: Symbol) -> Result<(), ParseError> {
        self.symtab
            .declare(name, symbol)
            .map_err(|e| self.scanner.error(e.to_string()))
    }

    /// Checks that `name` resolves to a symbol of the same sort as `want`.
    fn expect_symbol(&self, name: &str, want: Symbol, verb: &str) -> Result<(), ParseError> {
        let found = self
            .symtab
            .lookup(name)
            .map_err(|e| self.scanner.error(e.to_string()))?;
        if std::mem::discriminant(&found) != std::mem::discriminant(&want) {
            return Err(self.scanner.error(format!("{verb} {} {name}", found.describe())));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parscan::{ErrorKind, Position};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn expr(src: &str) -> std::string::String {
        let program = parse(&format!("VAR a, b, c; ! {src}.")).unwrap();
        match program.block.body {
            Statement::Write(e) => e.to_string(),
            other => panic!("expected a write statement, got {other:?}"),
        }
    }

    fn semantic_error(src: &str) -> ParseError {
        let err = parse(src).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Semantic, "{err}");
        err
    }

    #[test]
    fn arithmetic_grouping() {
        init_logger();
        assert_eq!(expr("1 + 2 * 3"), "(1 + (2 * 3))");
        assert_eq!(expr("-2 * 3"), "((-2) * 3)");
        assert_eq!(expr("8 - 3 - 2"), "((8 - 3) - 2)");
        assert_eq!(expr("(a + b) / -c"), "((a + b) / (-c))");
        assert_eq!(expr("+a - -b"), "((+a) - (-b))");
    }

    #[test]
    fn declarations_and_body() {
        let program = parse("CONST x = 5; VAR y; BEGIN y := x * 2 END.").unwrap();
        let block = &program.block;
        assert_eq!(block.consts, [(String::from("x"), 5)]);
        assert_eq!(block.vars, [String::from("y")]);
        assert_eq!(
            block.body,
            Statement::Begin(vec![Statement::Assign {
                name: "y".into(),
                value: Expr::binary(BinOp::Mul, Expr::Name("x".into()), Expr::Number(2)),
            }])
        );
    }

    #[test]
    fn full_program_with_nested_procedures() {
        let src = r#"
            { iterative squares }
            CONST max = 10;
            VAR i, sq;
            PROCEDURE square;
                VAR t;
                BEGIN t := i; sq := t * t END;
            PROCEDURE loop;
                BEGIN
                    i := 1;
                    WHILE i <= max DO
                    BEGIN
                        CALL square;
                        IF ODD i THEN ! sq;
                        i := i + 1
                    END
                END;
            BEGIN
                ? i;
                CALL loop
            END.
        "#;
        let program = parse(src).unwrap();
        let block = &program.block;
        assert_eq!(block.procedures.len(), 2);
        assert_eq!(block.procedures[0].name.as_str(), "square");
        assert_eq!(block.procedures[0].block.vars, [String::from("t")]);
        let Statement::Begin(body) = &block.procedures[1].block.body else {
            panic!("expected BEGIN");
        };
        let Statement::While { cond, .. } = &body[1] else {
            panic!("expected WHILE");
        };
        assert_eq!(cond.to_string(), "i <= max");
    }

    #[test]
    fn empty_statements_are_allowed() {
        let program = parse("BEGIN ; END.").unwrap();
        assert_eq!(
            program.block.body,
            Statement::Begin(vec![Statement::Empty, Statement::Empty])
        );
        assert_eq!(parse(".").unwrap().block.body, Statement::Empty);
    }

    #[test]
    fn procedure_may_call_itself_and_see_outer_names() {
        parse("VAR n; PROCEDURE down; IF n > 0 THEN BEGIN n := n - 1; CALL down END; CALL down.")
            .unwrap();
    }

    #[test]
    fn inner_names_are_not_visible_outside() {
        let err = semantic_error("PROCEDURE p; VAR t; t := 1; t := 2.");
        assert_eq!(err.message.as_str(), "undefined symbol t");
        assert_eq!(err.position, Position::new(28, 1, 29));
    }

    #[test]
    fn sibling_procedures_get_fresh_scopes() {
        let program = parse(
            "PROCEDURE p; VAR t; t := 1; PROCEDURE q; VAR t; t := 2; BEGIN CALL p; CALL q END.",
        )
        .unwrap();
        assert_eq!(program.block.procedures.len(), 2);
        assert_eq!(program.block.procedures[1].block.vars, [String::from("t")]);
    }

    #[test]
    fn inner_block_may_shadow() {
        parse("CONST k = 1; PROCEDURE p; VAR k; k := 2; CALL p.").unwrap();
    }

    #[test]
    fn duplicate_declaration() {
        let err = semantic_error("VAR a, b, a; a := 1.");
        assert_eq!(err.message.as_str(), "duplicate declaration of a");
        assert_eq!(err.position, Position::new(10, 1, 11));
        assert_eq!(err.offending.as_str(), "a");

        let err = semantic_error("CONST n = 1; PROCEDURE n; ; .");
        assert_eq!(err.message.as_str(), "duplicate declaration of n");
    }

    #[test]
    fn undefined_identifier_in_expression() {
        let err = semantic_error("VAR x; x := y + 1.");
        assert_eq!(err.message.as_str(), "undefined symbol y");
        assert_eq!(err.position, Position::new(12, 1, 13));
    }

    #[test]
    fn misuse_of_symbols() {
        let err = semantic_error("CONST c = 3; c := 4.");
        assert_eq!(err.message.as_str(), "cannot assign to constant c");

        let err = semantic_error("VAR v; CALL v.");
        assert_eq!(err.message.as_str(), "cannot call variable v");

        let err = semantic_error("PROCEDURE p; ; ? p.");
        assert_eq!(err.message.as_str(), "cannot read into procedure p");

        let err = semantic_error("VAR v; PROCEDURE p; ; v := p * 2.");
        assert_eq!(err.message.as_str(), "procedure p used as a value");
    }

    #[test]
    fn syntax_errors_point_at_current_token() {
        let err = parse("VAR x; x = 1.").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken);
        assert_eq!(err.message.as_str(), "expected \":=\"");
        assert_eq!(err.position, Position::new(9, 1, 10));

        let err = parse("VAR x;\nBEGIN x := 1\nx := 2 END.").unwrap_err();
        assert_eq!(err.message.as_str(), "expected \";\" or \"END\"");
        assert_eq!(err.position, Position::new(20, 3, 1));

        let err = parse("VAR x; IF x THEN x := 1.").unwrap_err();
        assert_eq!(err.message.as_str(), "expected a relational operator");
        assert_eq!(err.offending.as_str(), "THEN");
    }

    #[test]
    fn missing_period_and_trailing_input() {
        let err = parse("VAR x; x := 1").unwrap_err();
        assert_eq!(err.message.as_str(), "expected \".\" at end of program");
        assert_eq!(err.position, Position::new(13, 1, 14));

        let err = parse("VAR x; x := 1. x").unwrap_err();
        assert_eq!(err.message.as_str(), "expected end of input");
        assert_eq!(err.offending.as_str(), "x");
    }

    #[test]
    fn oversized_number_is_rejected() {
        let err = semantic_error("! 99999999999999999999.");
        assert_eq!(err.message.as_str(), "number 99999999999999999999 is out of range");
    }

    #[test]
    fn lexical_error_aborts_parse() {
        let err = parse("VAR x; x := 3 % 2.").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Lexical);
        assert_eq!(err.position, Position::new(14, 1, 15));
    }

    #[test]
    fn programs_parse_concurrently() {
        let sources = [
            "VAR a; a := 1 + 2 * 3.",
            "CONST k = 2; ! -k * 3.",
            "VAR a; BEGIN ? a; ! a - 3 - 2 END.",
        ];
        std::thread::scope(|scope| {
            for src in sources {
                scope.spawn(move || parse(src).unwrap());
            }
        });
    }
}
