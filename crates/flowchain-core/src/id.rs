//! Stable identifiers and typed link references for workflow nodes.
//!
//! [`NodeId`] is a newtype over a positive `u32`. Links are typed so that a
//! successor can only name a node or the FINAL sink, and a predecessor can only
//! name a node or the SOURCE feed. The numeric sentinels used by UI layers
//! (`0` for SOURCE, `-1` for FINAL) only exist at the parsing boundary, see
//! [`LinkTarget::from_raw`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Raw sentinel for "fed directly by the initial value".
pub const SOURCE_SENTINEL: i64 = 0;

/// Raw sentinel for "feeds the final output".
pub const FINAL_SENTINEL: i64 = -1;

/// Stable node identifier. Assigned at creation, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

/// Where a node's output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Successor {
    /// Another function node.
    Node(NodeId),
    /// The final output sink.
    Final,
}

/// Where a node's input comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predecessor {
    /// Another function node.
    Node(NodeId),
    /// The initial value.
    Source,
}

/// Target of a proposed link change.
///
/// `None` means "remove the current outgoing edge" and always succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkTarget {
    Node(NodeId),
    Final,
    None,
}

/// One side of a function node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Port {
    Input,
    Output,
}

impl LinkTarget {
    /// Interprets a raw UI value: absent is `None`, `-1` is FINAL, positive
    /// values are node ids. `0` (SOURCE) is never a valid successor.
    pub fn from_raw(raw: Option<i64>) -> Result<Self, CoreError> {
        match raw {
            None => Ok(LinkTarget::None),
            Some(FINAL_SENTINEL) => Ok(LinkTarget::Final),
            Some(v) if v > 0 && v <= i64::from(u32::MAX) => Ok(LinkTarget::Node(NodeId(v as u32))),
            Some(v) => Err(CoreError::InvalidReference {
                reason: format!("{} is not a valid successor", v),
            }),
        }
    }
}

impl From<Successor> for LinkTarget {
    fn from(s: Successor) -> Self {
        match s {
            Successor::Node(id) => LinkTarget::Node(id),
            Successor::Final => LinkTarget::Final,
        }
    }
}

impl From<Option<Successor>> for LinkTarget {
    fn from(s: Option<Successor>) -> Self {
        s.map_or(LinkTarget::None, LinkTarget::from)
    }
}

impl FromStr for LinkTarget {
    type Err = CoreError;

    /// Accepts the dropdown vocabulary: `""`/`none`, `final`/`-1`, or a node id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "none" => Ok(LinkTarget::None),
            "final" => Ok(LinkTarget::Final),
            other => {
                let raw = other.parse::<i64>().map_err(|_| CoreError::InvalidReference {
                    reason: format!("'{}' is not a node id", trimmed),
                })?;
                LinkTarget::from_raw(Some(raw))
            }
        }
    }
}

// Display implementations -- ids print bare, sentinels print by name.

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Successor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Successor::Node(id) => write!(f, "{}", id),
            Successor::Final => write!(f, "FINAL"),
        }
    }
}

impl fmt::Display for Predecessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predecessor::Node(id) => write!(f, "{}", id),
            Predecessor::Source => write!(f, "SOURCE"),
        }
    }
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkTarget::Node(id) => write!(f, "{}", id),
            LinkTarget::Final => write!(f, "FINAL"),
            LinkTarget::None => write!(f, "none"),
        }
    }
}
