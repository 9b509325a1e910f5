//! Workflow query types.

use flowchain_core::{LinkPolicy, NodeId, Predecessor, Successor};
use serde::{Deserialize, Serialize};

use crate::session::DropdownOption;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeView {
    pub id: NodeId,
    pub equation: String,
    pub successor: Option<Successor>,
    pub predecessor: Option<Predecessor>,
}

/// `GET /workflow`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowResponse {
    pub nodes: Vec<NodeView>,
    pub initial_value: f64,
    pub policy: LinkPolicy,
    pub revision: u64,
    /// Node ids from the SOURCE-fed node along successor links.
    pub chain: Vec<NodeId>,
    pub complete: bool,
}

/// `GET /workflow/nodes/{id}/options`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsResponse {
    pub node: NodeId,
    pub options: Vec<DropdownOption>,
}
