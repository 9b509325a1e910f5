//! Link policies: free rewiring or a fixed stage order.
//!
//! Under [`LinkPolicy::Free`] a proposal only has to respect the structural
//! rules (no self-loop, no fan-in, no cycle, single FINAL). Under
//! [`LinkPolicy::FixedOrder`] each node additionally has exactly one legal
//! successor, dictated by its position in the order.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::id::{NodeId, Successor};

/// Which proposals the mutator accepts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LinkPolicy {
    #[default]
    Free,
    FixedOrder(FixedOrder),
}

impl LinkPolicy {
    pub fn is_strict(&self) -> bool {
        matches!(self, LinkPolicy::FixedOrder(_))
    }

    /// Strict policy over the default stage order.
    pub fn default_fixed() -> Self {
        LinkPolicy::FixedOrder(FixedOrder::default())
    }
}

impl FromStr for LinkPolicy {
    type Err = CoreError;

    /// `free`, or `fixed` (aliases `fixed_order` and `strict`) for the
    /// default stage order. Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(LinkPolicy::Free),
            "fixed" | "fixed_order" | "strict" => Ok(LinkPolicy::default_fixed()),
            _ => Err(CoreError::InvalidPolicy {
                value: s.to_string(),
            }),
        }
    }
}

/// A total order over stages: `stages[0]` is fed by SOURCE, each stage feeds
/// the next, and the last stage feeds FINAL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedOrder {
    stages: Vec<NodeId>,
}

impl FixedOrder {
    /// Builds an order from a non-empty list of distinct stages.
    pub fn new(stages: Vec<NodeId>) -> Result<Self, CoreError> {
        if stages.is_empty() {
            return Err(CoreError::InvalidOrder {
                reason: "order has no stages".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for id in &stages {
            if !seen.insert(*id) {
                return Err(CoreError::InvalidOrder {
                    reason: format!("stage {} appears twice", id),
                });
            }
        }
        Ok(FixedOrder { stages })
    }

    pub fn stages(&self) -> &[NodeId] {
        &self.stages
    }

    /// The stage fed by the initial value.
    pub fn first(&self) -> Option<NodeId> {
        self.stages.first().copied()
    }

    /// The single legal successor of `id`, or `None` if `id` is not a stage.
    pub fn successor_of(&self, id: NodeId) -> Option<Successor> {
        let pos = self.stages.iter().position(|s| *s == id)?;
        Some(
            self.stages
                .get(pos + 1)
                .map_or(Successor::Final, |next| Successor::Node(*next)),
        )
    }
}

impl Default for FixedOrder {
    /// `SOURCE -> 1 -> 2 -> 4 -> 5 -> 3 -> FINAL`.
    fn default() -> Self {
        FixedOrder {
            stages: crate::seed::DEFAULT_STAGE_ORDER
                .iter()
                .map(|id| NodeId(*id))
                .collect(),
        }
    }
}
