//! Core error types for flowchain-core.
//!
//! [`CoreError`] covers lookups and structural faults. [`LinkRejection`] is the
//! outcome of a link proposal that would break the chain rules; the graph is
//! left untouched whenever one is returned.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::id::{LinkTarget, NodeId, Predecessor, Successor};

/// Core errors produced by the flowchain-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A node id was not found in the graph.
    #[error("node not found: NodeId({id})", id = id.0)]
    NodeNotFound { id: NodeId },

    /// An equation does not match the restricted grammar.
    #[error("invalid equation: '{text}'")]
    InvalidEquation { text: String },

    /// A raw link reference could not be interpreted.
    #[error("invalid link reference: {reason}")]
    InvalidReference { reason: String },

    /// A link policy name was not recognised.
    #[error("unknown link policy '{value}', expected free or fixed")]
    InvalidPolicy { value: String },

    /// A fixed execution order could not be built.
    #[error("invalid fixed order: {reason}")]
    InvalidOrder { reason: String },

    /// A chain invariant was violated.
    #[error("graph inconsistency: {reason}")]
    GraphInconsistency { reason: String },
}

/// Why a proposed link was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkRejection {
    /// The link names a node that does not exist.
    #[error("node not found: {node}")]
    UnknownNode { node: NodeId },

    /// A node may not feed itself.
    #[error("node {node} cannot link to itself")]
    SelfLoop { node: NodeId },

    /// The target already receives input from somewhere else.
    #[error("node {target} already has an input from {existing}")]
    FanIn { target: NodeId, existing: Predecessor },

    /// Another node already feeds the final output.
    #[error("final output is already fed by node {holder}")]
    FinalTaken { holder: NodeId },

    /// Following successors from the target leads back to the source.
    #[error("link would close a cycle: {}", format_path(.path))]
    Cycle { path: Vec<NodeId> },

    /// Strict mode: the target is not the stage dictated by the fixed order.
    #[error("fixed order allows {from} -> {}, not {requested}", describe_expected(.expected))]
    OrderViolation {
        from: NodeId,
        expected: Option<Successor>,
        requested: LinkTarget,
    },

    /// Strict mode: only the first stage may be fed by the initial value.
    #[error("fixed order feeds the initial value into {expected}, not {requested}")]
    SourceOrderViolation { expected: NodeId, requested: NodeId },
}

fn format_path(path: &[NodeId]) -> String {
    path.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn describe_expected(expected: &Option<Successor>) -> String {
    match expected {
        Some(s) => s.to_string(),
        None => "nothing".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_path() {
        let err = LinkRejection::Cycle {
            path: vec![NodeId(3), NodeId(1), NodeId(2), NodeId(3)],
        };
        assert_eq!(err.to_string(), "link would close a cycle: 3 -> 1 -> 2 -> 3");
    }

    #[test]
    fn order_violation_message() {
        let err = LinkRejection::OrderViolation {
            from: NodeId(2),
            expected: Some(Successor::Node(NodeId(4))),
            requested: LinkTarget::Node(NodeId(3)),
        };
        assert_eq!(err.to_string(), "fixed order allows 2 -> 4, not 3");
    }

    #[test]
    fn rejection_serializes_with_kind_tag() {
        let err = LinkRejection::FanIn {
            target: NodeId(2),
            existing: Predecessor::Node(NodeId(1)),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "fan_in");
        assert_eq!(json["target"], 2);
        assert_eq!(json["existing"]["node"], 1);
    }
}
