//! Expression faults.
//!
//! Offsets are byte offsets into the equation text. None of these ever escape
//! the chain walk: a faulting stage outputs `0` and the fault is recorded.

use serde::{Deserialize, Serialize};

/// Errors produced while parsing or evaluating one equation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExprError {
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("unexpected {found} at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("expression nests deeper than {limit} levels at offset {offset}")]
    TooDeep { offset: usize, limit: usize },

    #[error("expression has {tokens} tokens, more than the limit of {limit}")]
    TooLong { tokens: usize, limit: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NonFinite,
}
