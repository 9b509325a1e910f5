//! Recursive-descent parser.
//!
//! ```text
//! expr    := term (("+" | "-") term)*
//! term    := unary (("*" | "/") unary | power)*   -- bare power only before 'x' or '('
//! unary   := ("-" | "+") unary | power
//! power   := primary ("^" unary)?
//! primary := NUMBER | "x" | "(" expr ")"
//! ```

use super::lexer::{Spanned, Token};
use super::{BinOp, Expr};
use crate::error::ExprError;

/// Deepest nesting of parentheses, signs and exponents accepted.
pub const MAX_DEPTH: usize = 64;

pub(crate) struct Parser<'a> {
    tokens: &'a [Spanned],
    index: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: &'a [Spanned]) -> Self {
        Parser {
            tokens,
            index: 0,
            depth: 0,
        }
    }

    /// Parses a full expression and requires every token to be consumed.
    pub(crate) fn parse(mut self) -> Result<Expr, ExprError> {
        let expr = self.parse_expr()?;
        let tokens = self.tokens;
        match tokens.get(self.index) {
            None => Ok(expr),
            Some((token, offset)) => Err(unexpected(token, *offset)),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.index += 1;
            let rhs = self.parse_term()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let rhs = match self.peek() {
                Some(Token::Star) => {
                    self.index += 1;
                    Expr::binary(BinOp::Mul, lhs, self.parse_unary()?)
                }
                Some(Token::Slash) => {
                    self.index += 1;
                    Expr::binary(BinOp::Div, lhs, self.parse_unary()?)
                }
                // Implicit coefficient: `2x`, `3(x+1)`, `(x+1)(x-1)`.
                Some(Token::Var) | Some(Token::LParen) => {
                    Expr::binary(BinOp::Mul, lhs, self.parse_power()?)
                }
                _ => break,
            };
            lhs = rhs;
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        let tokens = self.tokens;
        match tokens.get(self.index) {
            Some((Token::Minus, offset)) => {
                self.index += 1;
                let inner = self.nested(*offset, Self::parse_unary)?;
                Ok(Expr::Neg(Box::new(inner)))
            }
            Some((Token::Plus, offset)) => {
                self.index += 1;
                self.nested(*offset, Self::parse_unary)
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Expr, ExprError> {
        let base = self.parse_primary()?;
        let tokens = self.tokens;
        if let Some((Token::Caret, offset)) = tokens.get(self.index) {
            self.index += 1;
            let exponent = self.nested(*offset, Self::parse_unary)?;
            return Ok(Expr::binary(BinOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let tokens = self.tokens;
        let Some((token, offset)) = tokens.get(self.index) else {
            return Err(ExprError::UnexpectedEnd);
        };
        self.index += 1;
        match token {
            Token::Number(v) => Ok(Expr::Number(*v)),
            Token::Var => Ok(Expr::Var),
            Token::LParen => {
                let inner = self.nested(*offset, Self::parse_expr)?;
                match tokens.get(self.index) {
                    Some((Token::RParen, _)) => {
                        self.index += 1;
                        Ok(inner)
                    }
                    Some((other, offset)) => Err(unexpected(other, *offset)),
                    None => Err(ExprError::UnexpectedEnd),
                }
            }
            other => Err(unexpected(other, *offset)),
        }
    }

    /// Runs `parse` one nesting level deeper. Fails with `TooDeep`, naming
    /// the token at `offset`, once the level passes [`MAX_DEPTH`].
    fn nested(
        &mut self,
        offset: usize,
        parse: fn(&mut Self) -> Result<Expr, ExprError>,
    ) -> Result<Expr, ExprError> {
        if self.depth == MAX_DEPTH {
            return Err(ExprError::TooDeep {
                offset,
                limit: MAX_DEPTH,
            });
        }
        self.depth += 1;
        let expr = parse(self)?;
        self.depth -= 1;
        Ok(expr)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index).map(|(t, _)| t)
    }
}

fn unexpected(token: &Token, offset: usize) -> ExprError {
    ExprError::UnexpectedToken {
        found: token.describe(),
        offset,
    }
}
