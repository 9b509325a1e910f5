//! Execution trace recording for the chain walk.
//!
//! When tracing is enabled via [`EvalConfig::trace_enabled`](crate::chain::EvalConfig),
//! the walk records a [`TraceEntry`] for every stage it evaluates.

use flowchain_core::NodeId;
use serde::{Deserialize, Serialize};

use crate::error::ExprError;

/// A single entry in the execution trace, recording one stage evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// The stage that was evaluated.
    pub node: NodeId,
    /// Equation text at the time of evaluation.
    pub equation: String,
    /// Value fed into the stage.
    pub input: f64,
    /// Rounded output (0 if the stage faulted).
    pub output: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<ExprError>,
}
