//! Restricted arithmetic expressions over a single variable.
//!
//! Only the equation grammar is understood: numbers, `x`, `+ - * / ^`,
//! parentheses, and implicit multiplication of a coefficient by `x` or a
//! parenthesised group. There is no other way to execute text.

mod lexer;
mod parser;

pub use parser::MAX_DEPTH;

use serde::{Deserialize, Serialize};

use crate::error::ExprError;

/// Longest equation accepted, in tokens.
pub const MAX_TOKENS: usize = 1024;

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Number(f64),
    /// The stage input.
    Var,
    Neg(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn parse(text: &str) -> Result<Expr, ExprError> {
        let tokens = lexer::tokenize(text)?;
        if tokens.is_empty() {
            return Err(ExprError::UnexpectedEnd);
        }
        // Operator chains build left-deep trees, which `eval` and drop walk
        // recursively. Bounding the token count bounds that depth.
        if tokens.len() > MAX_TOKENS {
            return Err(ExprError::TooLong {
                tokens: tokens.len(),
                limit: MAX_TOKENS,
            });
        }
        parser::Parser::new(&tokens).parse()
    }

    /// Evaluates with `x` bound to `x`. Division by zero and non-finite
    /// intermediate results are faults.
    pub fn eval(&self, x: f64) -> Result<f64, ExprError> {
        let value = match self {
            Expr::Number(v) => *v,
            Expr::Var => x,
            Expr::Neg(inner) => -inner.eval(x)?,
            Expr::Binary { op, lhs, rhs } => {
                let l = lhs.eval(x)?;
                let r = rhs.eval(x)?;
                match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => {
                        if r == 0.0 {
                            return Err(ExprError::DivisionByZero);
                        }
                        l / r
                    }
                    BinOp::Pow => l.powf(r),
                }
            }
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ExprError::NonFinite)
        }
    }

    fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}
