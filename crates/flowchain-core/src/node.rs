//! Function nodes: one pipeline stage holding one scalar expression.
//!
//! A [`FunctionNode`] owns its equation text and both ends of its links. The
//! link fields are only written by [`WorkflowGraph`](crate::graph::WorkflowGraph),
//! which keeps every successor/predecessor pair mutually consistent.

use serde::{Deserialize, Serialize};

use crate::id::{NodeId, Predecessor, Successor};

/// The variable symbol bound to a stage's input value.
pub const VARIABLE: char = 'x';

/// A single pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionNode {
    id: NodeId,
    equation: String,
    successor: Option<Successor>,
    predecessor: Option<Predecessor>,
}

impl FunctionNode {
    /// Creates an unconnected node.
    pub(crate) fn new(id: NodeId, equation: String) -> Self {
        FunctionNode {
            id,
            equation,
            successor: None,
            predecessor: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn equation(&self) -> &str {
        &self.equation
    }

    /// Outgoing link, if any.
    pub fn successor(&self) -> Option<Successor> {
        self.successor
    }

    /// Incoming link, if any.
    pub fn predecessor(&self) -> Option<Predecessor> {
        self.predecessor
    }

    /// Returns `true` if the node has neither an input nor an output link.
    pub fn is_isolated(&self) -> bool {
        self.successor.is_none() && self.predecessor.is_none()
    }

    pub(crate) fn set_equation(&mut self, equation: String) {
        self.equation = equation;
    }

    pub(crate) fn set_successor(&mut self, successor: Option<Successor>) {
        self.successor = successor;
    }

    pub(crate) fn set_predecessor(&mut self, predecessor: Option<Predecessor>) {
        self.predecessor = predecessor;
    }
}

/// Checks equation text against the restricted character grammar: digits,
/// the variable symbol, `+ - * / ^ ( ) .` and whitespace. Empty text is
/// rejected.
///
/// This is a lexical gate for live typing; text such as `x+` passes here and
/// faults later at evaluation.
pub fn is_valid_equation(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_equation_char)
}

fn is_equation_char(c: char) -> bool {
    c.is_ascii_digit()
        || c == VARIABLE
        || c.is_whitespace()
        || matches!(c, '+' | '-' | '*' | '/' | '^' | '(' | ')' | '.')
}
