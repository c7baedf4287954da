//! Pratt/precedence-climbing parser: tokens -> `Stmt` list.
//!
//! Precedence, low to high: `||`, `&&`, `== !=`, `> < >= <=`, `+ -`, `* / %`,
//! `^`, unary `- !`, primary.

use super::ast::{BinOp, Expr, RowSel, Stmt, UnOp};
use super::lexer::Token;
use crate::error::Error;
use smol_str::SmolStr;

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

/// Parses a single bare expression (no `lhs =` / `NEW(...)` wrapper) — used
/// for the single-expression `AddColUsingCCL`/`EditCol*UsingCCL` entry
/// points, as opposed to `parse`'s full statement scripts.
pub fn parse_expr(tokens: &[Token]) -> Result<Expr, Error> {
    let filtered: Vec<Token> = tokens.iter().filter(|t| **t != Token::Newline).cloned().collect();
    let mut p = Parser { tokens: &filtered, pos: 0 };
    let expr = p.expr_or()?;
    if !p.at_end() {
        return Err(Error::invalid_argument(format!("unexpected trailing tokens starting at {:?}", p.peek())));
    }
    Ok(expr)
}

pub fn parse(tokens: &[Token]) -> Result<Vec<Stmt>, Error> {
    let filtered: Vec<Token> = tokens.iter().filter(|t| **t != Token::Newline).cloned().collect();
    let mut p = Parser { tokens: &filtered, pos: 0 };
    let mut stmts = Vec::new();
    p.skip_semicolons();
    while !p.at_end() {
        stmts.push(p.statement()?);
        p.skip_semicolons();
    }
    Ok(stmts)
}

impl<'a> Parser<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&Token> {
        let t = self.tokens.get(self.pos);
        self.pos += 1;
        t
    }

    fn skip_semicolons(&mut self) {
        while matches!(self.peek(), Some(Token::Semicolon)) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, tok: &Token) -> Result<(), Error> {
        if self.peek() == Some(tok) {
            self.pos += 1;
            Ok(())
        } else {
            Err(Error::invalid_argument(format!("expected {tok:?}, found {:?}", self.peek())))
        }
    }

    fn ident(&mut self) -> Result<SmolStr, Error> {
        match self.advance() {
            Some(Token::Ident(s)) => Ok(s.clone()),
            other => Err(Error::invalid_argument(format!("expected identifier, found {other:?}"))),
        }
    }

    fn statement(&mut self) -> Result<Stmt, Error> {
        if matches!(self.peek(), Some(Token::Ident(s)) if s.eq_ignore_ascii_case("NEW"))
            && self.tokens.get(self.pos + 1) == Some(&Token::LParen)
        {
            self.pos += 2;
            let name = match self.advance() {
                Some(Token::String(s)) => s.clone(),
                other => return Err(Error::invalid_argument(format!("NEW(...) expects a string literal name, found {other:?}"))),
            };
            // Two accepted forms: `NEW('name', expr)` and `NEW('name') = expr`.
            if matches!(self.peek(), Some(Token::Comma)) {
                self.pos += 1;
                let expr = self.expr_or()?;
                self.expect(&Token::RParen)?;
                return Ok(Stmt::New(name, expr));
            }
            self.expect(&Token::RParen)?;
            self.expect(&Token::Assign)?;
            let expr = self.expr_or()?;
            return Ok(Stmt::New(name, expr));
        }

        let name = self.ident()?;
        self.expect(&Token::Assign)?;
        let expr = self.expr_or()?;
        Ok(Stmt::Assign(name, expr))
    }

    fn expr_or(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.expr_and()?;
        while matches!(self.peek(), Some(Token::OrOr)) {
            self.pos += 1;
            let rhs = self.expr_and()?;
            lhs = Expr::Binary(BinOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn expr_and(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.expr_eq()?;
        while matches!(self.peek(), Some(Token::AndAnd)) {
            self.pos += 1;
            let rhs = self.expr_eq()?;
            lhs = Expr::Binary(BinOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn expr_eq(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.expr_cmp()?;
        loop {
            let op = match self.peek() {
                Some(Token::Eq) => BinOp::Eq,
                Some(Token::NotEq) => BinOp::NotEq,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.expr_cmp()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn expr_cmp(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.expr_add()?;
        loop {
            let op = match self.peek() {
                Some(Token::Gt) => BinOp::Gt,
                Some(Token::Lt) => BinOp::Lt,
                Some(Token::GtEq) => BinOp::GtEq,
                Some(Token::LtEq) => BinOp::LtEq,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.expr_add()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn expr_add(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.expr_mul()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.expr_mul()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn expr_mul(&mut self) -> Result<Expr, Error> {
        let mut lhs = self.expr_pow()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.expr_pow()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn expr_pow(&mut self) -> Result<Expr, Error> {
        let lhs = self.expr_unary()?;
        if matches!(self.peek(), Some(Token::Caret)) {
            self.pos += 1;
            // Right-associative.
            let rhs = self.expr_pow()?;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(lhs), Box::new(rhs)));
        }
        Ok(lhs)
    }

    fn expr_unary(&mut self) -> Result<Expr, Error> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(Expr::Unary(UnOp::Neg, Box::new(self.expr_unary()?)))
            }
            Some(Token::Not) => {
                self.pos += 1;
                Ok(Expr::Unary(UnOp::Not, Box::new(self.expr_unary()?)))
            }
            _ => self.primary(),
        }
    }

    fn row_sel(&mut self) -> Result<RowSel, Error> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(RowSel::Index(*n as i64)),
            Some(Token::String(s)) => Ok(RowSel::Name(s.clone())),
            Some(Token::Ident(s)) => Ok(RowSel::Name(s.clone())),
            other => Err(Error::invalid_argument(format!("expected a row reference, found {other:?}"))),
        }
    }

    fn primary(&mut self) -> Result<Expr, Error> {
        match self.advance().cloned() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::String(s)) => Ok(Expr::String(s)),
            Some(Token::LParen) => {
                let e = self.expr_or()?;
                self.expect(&Token::RParen)?;
                Ok(e)
            }
            Some(Token::LBracket) => {
                let name = self.ident()?;
                self.expect(&Token::RBracket)?;
                Ok(Expr::Column(name))
            }
            Some(Token::At) => {
                self.expect(&Token::Dot)?;
                let row = self.row_sel()?;
                Ok(Expr::FullRow(row))
            }
            Some(Token::Ident(name)) => {
                if matches!(self.peek(), Some(Token::LParen)) {
                    self.pos += 1;
                    let mut args = Vec::new();
                    if !matches!(self.peek(), Some(Token::RParen)) {
                        args.push(self.expr_or()?);
                        while matches!(self.peek(), Some(Token::Comma)) {
                            self.pos += 1;
                            args.push(self.expr_or()?);
                        }
                    }
                    self.expect(&Token::RParen)?;
                    return Ok(Expr::Call(name, args));
                }
                if matches!(self.peek(), Some(Token::Dot)) {
                    self.pos += 1;
                    let row = self.row_sel()?;
                    return Ok(Expr::Dotted(name, row));
                }
                Ok(Expr::Column(name))
            }
            other => Err(Error::invalid_argument(format!("unexpected token {other:?} in expression"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ccl::lexer::tokenize;

    fn parse_str(src: &str) -> Vec<Stmt> {
        parse(&tokenize(src).unwrap()).unwrap()
    }

    #[test]
    fn parses_simple_assignment() {
        let stmts = parse_str("C = A + B");
        assert_eq!(stmts, vec![Stmt::Assign("C".into(), Expr::Binary(BinOp::Add, Box::new(Expr::Column("A".into())), Box::new(Expr::Column("B".into()))))]);
    }

    #[test]
    fn precedence_mul_binds_tighter_than_add() {
        let stmts = parse_str("C = A + B * 2");
        match &stmts[0] {
            Stmt::Assign(_, Expr::Binary(BinOp::Add, _, rhs)) => {
                assert!(matches!(**rhs, Expr::Binary(BinOp::Mul, _, _)));
            }
            _ => panic!("unexpected shape"),
        }
    }

    #[test]
    fn parses_new_statement() {
        let stmts = parse_str("NEW('total', A + B)");
        assert_eq!(stmts, vec![Stmt::New("total".into(), Expr::Binary(BinOp::Add, Box::new(Expr::Column("A".into())), Box::new(Expr::Column("B".into()))))]);
    }

    #[test]
    fn parses_new_statement_assignment_form() {
        let stmts = parse_str("NEW('total') = A + B");
        assert_eq!(stmts, vec![Stmt::New("total".into(), Expr::Binary(BinOp::Add, Box::new(Expr::Column("A".into())), Box::new(Expr::Column("B".into()))))]);
    }

    #[test]
    fn parses_dotted_and_full_row_refs() {
        let stmts = parse_str("C = SUM(A.0, @.1)");
        match &stmts[0] {
            Stmt::Assign(_, Expr::Call(name, args)) => {
                assert_eq!(name.as_str(), "SUM");
                assert!(matches!(args[0], Expr::Dotted(_, RowSel::Index(0))));
                assert!(matches!(args[1], Expr::FullRow(RowSel::Index(1))));
            }
            _ => panic!("unexpected shape"),
        }
    }

    #[test]
    fn parses_multi_statement_script_separated_by_semicolons() {
        let stmts = parse_str("A = 1; B = 2");
        assert_eq!(stmts.len(), 2);
    }
}
