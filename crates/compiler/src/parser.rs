//! Recursive-descent parser. One token of lookahead is enough: the
//! grammar has no infix operators, so every expression is either an atom
//! or a left-associative run of atoms (application).
//!
//! ```text
//! Program    := Decl*
//! Decl       := "include" Text | Def
//! Def        := Ident Pattern* "=" Expr
//! Pattern    := Int | "_" | Ident | QualIdent | "(" QualIdent Ident* ")"
//! Expr       := Lambda | App
//! Lambda     := "\" Ident+ "->" Expr
//! App        := Atom+
//! Atom       := Int | Float | Char | Text | QualIdent | Ident
//!             | "(" Expr ")" | "[" (Expr ("," Expr)*)? "]"
//! ```

use crate::ast::{Decl, Def, Expr, Literal, Pattern, Position, Program};
use crate::error::CompileError;
use crate::lexer::{tokenize, Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Parser, CompileError> {
        Ok(Parser { tokens: tokenize(source)?, pos: 0 })
    }

    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn peek_pos(&self) -> Position {
        self.tokens[self.pos].pos
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: &TokenKind, expected: &str) -> Result<Token, CompileError> {
        if self.peek() == kind {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &str) -> CompileError {
        if *self.peek() == TokenKind::Eof {
            CompileError::UnexpectedEof { expected: expected.to_string() }
        } else {
            CompileError::UnexpectedToken {
                found: format!("{:?}", self.peek()),
                expected: expected.to_string(),
                pos: self.peek_pos(),
            }
        }
    }

    pub fn parse_program(&mut self) -> Result<Program, CompileError> {
        let mut decls = Vec::new();
        while *self.peek() != TokenKind::Eof {
            decls.push(self.parse_decl()?);
        }
        Ok(Program { decls })
    }

    fn parse_decl(&mut self) -> Result<Decl, CompileError> {
        if let TokenKind::Ident(name) = self.peek() {
            if name == "include" {
                let pos = self.peek_pos();
                self.advance();
                let text = self.expect_text("a module name string")?;
                return Ok(Decl::Include(text, pos));
            }
        }
        self.parse_def().map(Decl::Def)
    }

    fn expect_text(&mut self, expected: &str) -> Result<String, CompileError> {
        match self.peek().clone() {
            TokenKind::Text(s) => {
                self.advance();
                Ok(s)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn parse_def(&mut self) -> Result<Def, CompileError> {
        let pos = self.peek_pos();
        let name = self.expect_ident("a definition name")?;
        let mut params = Vec::new();
        while *self.peek() != TokenKind::Equals {
            params.push(self.parse_pattern()?);
        }
        self.expect(&TokenKind::Equals, "`=`")?;
        let body = self.parse_expr()?;
        Ok(Def { name, params, body, pos })
    }

    fn expect_ident(&mut self, expected: &str) -> Result<String, CompileError> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    /// An `Ident` optionally followed by `. Ident`, consumed as a unit.
    fn parse_qualifiable_ident(&mut self) -> Result<(String, Option<String>), CompileError> {
        let first = self.expect_ident("an identifier")?;
        if *self.peek() == TokenKind::Dot {
            self.advance();
            let local = self.expect_ident("a qualified name's local part")?;
            Ok((first, Some(local)))
        } else {
            Ok((first, None))
        }
    }

    fn parse_pattern(&mut self) -> Result<Pattern, CompileError> {
        match self.peek().clone() {
            TokenKind::Int(n) => {
                self.advance();
                Ok(Pattern::Int(n))
            }
            TokenKind::Underscore => {
                self.advance();
                Ok(Pattern::Wildcard)
            }
            TokenKind::LParen => {
                self.advance();
                let (ns, local) = self.parse_qualifiable_ident()?;
                let local = local.ok_or_else(|| CompileError::UnexpectedToken {
                    found: ns.clone(),
                    expected: "a qualified constructor name (`Ns.tag`)".to_string(),
                    pos: self.peek_pos(),
                })?;
                let mut fields = Vec::new();
                while *self.peek() != TokenKind::RParen {
                    fields.push(self.expect_ident("a field-binding name")?);
                }
                self.expect(&TokenKind::RParen, "`)`")?;
                Ok(Pattern::Constructor(ns, local, fields))
            }
            TokenKind::Ident(_) => {
                let (first, local) = self.parse_qualifiable_ident()?;
                match local {
                    Some(local) => Ok(Pattern::Data(first, local)),
                    None => Ok(Pattern::Var(first)),
                }
            }
            _ => Err(self.unexpected("a pattern")),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, CompileError> {
        if *self.peek() == TokenKind::Backslash {
            return self.parse_lambda();
        }
        self.parse_app()
    }

    fn parse_lambda(&mut self) -> Result<Expr, CompileError> {
        self.expect(&TokenKind::Backslash, "`\\`")?;
        let mut params = Vec::new();
        params.push(self.expect_ident("a lambda parameter")?);
        while matches!(self.peek(), TokenKind::Ident(_)) {
            params.push(self.expect_ident("a lambda parameter")?);
        }
        self.expect(&TokenKind::Arrow, "`->`")?;
        let body = self.parse_expr()?;
        Ok(Expr::Lambda(params, Box::new(body)))
    }

    fn parse_app(&mut self) -> Result<Expr, CompileError> {
        let head = self.parse_atom()?;
        let mut args = Vec::new();
        while self.starts_atom() {
            args.push(self.parse_atom()?);
        }
        if args.is_empty() {
            Ok(head)
        } else {
            Ok(Expr::App(Box::new(head), args))
        }
    }

    fn starts_atom(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Int(_)
                | TokenKind::Float(_)
                | TokenKind::Char(_)
                | TokenKind::Text(_)
                | TokenKind::Ident(_)
                | TokenKind::LParen
                | TokenKind::LBracket
        )
    }

    fn parse_atom(&mut self) -> Result<Expr, CompileError> {
        match self.peek().clone() {
            TokenKind::Int(n) => {
                self.advance();
                Ok(Expr::Lit(Literal::Int(n)))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(Expr::Lit(Literal::Float(f)))
            }
            TokenKind::Char(c) => {
                self.advance();
                Ok(Expr::Lit(Literal::Char(c)))
            }
            TokenKind::Text(s) => {
                self.advance();
                Ok(Expr::Lit(Literal::Text(s)))
            }
            TokenKind::Ident(_) => {
                let (first, local) = self.parse_qualifiable_ident()?;
                match local {
                    Some(local) => Ok(Expr::Global(first, local)),
                    None => Ok(Expr::Var(first)),
                }
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "`)`")?;
                Ok(inner)
            }
            TokenKind::LBracket => {
                self.advance();
                let mut items = Vec::new();
                if *self.peek() != TokenKind::RBracket {
                    items.push(self.parse_expr()?);
                    while *self.peek() == TokenKind::Comma {
                        self.advance();
                        items.push(self.parse_expr()?);
                    }
                }
                self.expect(&TokenKind::RBracket, "`]`")?;
                Ok(Expr::Array(items))
            }
            _ => Err(self.unexpected("an expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        Parser::new(source).unwrap().parse_program().unwrap()
    }

    #[test]
    fn parses_a_one_clause_definition() {
        let program = parse("f x = System.+ x 1");
        assert_eq!(program.decls.len(), 1);
        match &program.decls[0] {
            Decl::Def(def) => {
                assert_eq!(def.name, "f");
                assert_eq!(def.params, vec![Pattern::Var("x".into())]);
                assert_eq!(
                    def.body,
                    Expr::App(
                        Box::new(Expr::Global("System".into(), "+".into())),
                        vec![Expr::Var("x".into()), Expr::Lit(Literal::Int(1))]
                    )
                );
            }
            _ => panic!("expected a Def"),
        }
    }

    #[test]
    fn parses_an_include() {
        let program = parse(r#"include "math""#);
        assert_eq!(program.decls, vec![Decl::Include("math".into(), Position::new(1, 1))]);
    }

    #[test]
    fn parses_a_constructor_pattern_with_field_bindings() {
        let program = parse("len (System.cons h t) = System.+ 1 (len t)");
        match &program.decls[0] {
            Decl::Def(def) => {
                assert_eq!(
                    def.params,
                    vec![Pattern::Constructor("System".into(), "cons".into(), vec!["h".into(), "t".into()])]
                );
            }
            _ => panic!("expected a Def"),
        }
    }

    #[test]
    fn parses_an_array_literal() {
        let program = parse(r#"pair = [1, 2]"#);
        match &program.decls[0] {
            Decl::Def(def) => {
                assert_eq!(
                    def.body,
                    Expr::Array(vec![Expr::Lit(Literal::Int(1)), Expr::Lit(Literal::Int(2))])
                );
            }
            _ => panic!("expected a Def"),
        }
    }

    #[test]
    fn parses_a_lambda() {
        let program = parse(r#"apply f x = f x"#);
        let program2 = parse(r#"twice f = \x -> f (f x)"#);
        assert_eq!(program.decls.len(), 1);
        match &program2.decls[0] {
            Decl::Def(def) => assert!(matches!(def.body, Expr::Lambda(_, _))),
            _ => panic!("expected a Def"),
        }
    }

    #[test]
    fn multiple_equations_for_the_same_name_parse_as_separate_decls() {
        let program = parse("len System.nil = 0\nlen (System.cons h t) = System.+ 1 (len t)");
        assert_eq!(program.decls.len(), 2);
    }

    #[test]
    fn missing_equals_is_a_parse_error() {
        let err = Parser::new("f x System.+ x 1").unwrap().parse_program().unwrap_err();
        assert!(matches!(err, CompileError::UnexpectedToken { .. } | CompileError::UnexpectedEof { .. }));
    }
}
