//! WorkflowGraph: the node set and the only place links are written.
//!
//! Edges are not stored on their own. A link `A -> B` is the pair
//! `A.successor = B` and `B.predecessor = A`, and every mutator writes both
//! ends in the same call. After each state-changing mutation the graph is:
//!
//! - a disjoint union of simple paths (no cycles, no self-loops),
//! - free of fan-in and fan-out (one successor, one predecessor per node),
//! - fed from SOURCE by at most one node and draining into FINAL from at most
//!   one node.
//!
//! Proposals run their preconditions in a fixed order and stop at the first
//! failure: source exists, removal short-circuit, self-loop, target exists,
//! fan-in, FINAL exclusivity, cycle walk, then the strict-order rule.
//!
//! The nodes map is private. All mutations go through `WorkflowGraph` methods;
//! read-only accessors are provided for evaluation and rendering.

use indexmap::{IndexMap, IndexSet};
use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, LinkRejection};
use crate::id::{LinkTarget, NodeId, Port, Predecessor, Successor};
use crate::node::{is_valid_equation, FunctionNode};
use crate::policy::LinkPolicy;
use crate::seed::DEFAULT_EQUATIONS;

/// What a successful mutation did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeKind {
    /// `from.successor` now points at `to`. `detached` is the successor it
    /// replaced, if any.
    Linked {
        from: NodeId,
        to: Successor,
        detached: Option<Successor>,
    },
    /// `from` lost its outgoing edge.
    Unlinked {
        from: NodeId,
        previous: Option<Successor>,
    },
    /// `node` is now fed by the initial value. `detached` lost that feed.
    SourceAttached {
        node: NodeId,
        detached: Option<NodeId>,
    },
    /// One side of `node` was cleared, together with the opposite pointer on
    /// every node that referenced it.
    Disconnected { node: NodeId, port: Port },
}

/// Result of an accepted mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedChange {
    pub kind: ChangeKind,
    /// `false` when the mutation was already in effect (idempotent re-link).
    pub changed: bool,
    /// Graph revision after the mutation.
    pub revision: u64,
}

/// The path walked from the SOURCE-fed node along successor links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    pub nodes: Vec<NodeId>,
    /// `true` if the last node feeds FINAL.
    pub complete: bool,
}

/// The workflow container.
///
/// Deserializing runs [`WorkflowGraph::check_consistency`], so a stored graph
/// that breaks the chain rules is refused instead of loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GraphParts")]
pub struct WorkflowGraph {
    /// Nodes in creation order.
    nodes: IndexMap<NodeId, FunctionNode>,
    policy: LinkPolicy,
    next_node_id: u32,
    /// Bumped by every mutation that changes state.
    revision: u64,
}

/// Unchecked serialized form of [`WorkflowGraph`].
#[derive(Deserialize)]
struct GraphParts {
    nodes: IndexMap<NodeId, FunctionNode>,
    policy: LinkPolicy,
    next_node_id: u32,
    revision: u64,
}

impl TryFrom<GraphParts> for WorkflowGraph {
    type Error = CoreError;

    fn try_from(parts: GraphParts) -> Result<Self, Self::Error> {
        if let Some((key, node)) = parts.nodes.iter().find(|(key, node)| **key != node.id()) {
            return Err(CoreError::GraphInconsistency {
                reason: format!("node {} is stored under id {}", node.id(), key),
            });
        }
        let next_free = parts.nodes.keys().map(|id| id.0 + 1).max().unwrap_or(1);
        let graph = WorkflowGraph {
            nodes: parts.nodes,
            policy: parts.policy,
            next_node_id: parts.next_node_id.max(next_free),
            revision: parts.revision,
        };
        graph.check_consistency()?;
        Ok(graph)
    }
}

impl WorkflowGraph {
    /// Creates an empty graph.
    pub fn new(policy: LinkPolicy) -> Self {
        WorkflowGraph {
            nodes: IndexMap::new(),
            policy,
            next_node_id: 1,
            revision: 0,
        }
    }

    /// Creates the five default stages, unconnected.
    pub fn seeded(policy: LinkPolicy) -> Self {
        let mut graph = WorkflowGraph::new(policy);
        for equation in DEFAULT_EQUATIONS {
            let id = NodeId(graph.next_node_id);
            graph.next_node_id += 1;
            graph
                .nodes
                .insert(id, FunctionNode::new(id, equation.to_string()));
        }
        graph
    }

    /// Creates the default stages wired `SOURCE -> 1 -> 2 -> 4 -> 5 -> 3 -> FINAL`.
    pub fn with_default_chain(policy: LinkPolicy) -> Result<Self, LinkRejection> {
        let mut graph = WorkflowGraph::seeded(policy);
        let order = crate::policy::FixedOrder::default();
        let stages = order.stages().to_vec();
        if let Some(first) = order.first() {
            graph.connect_source(first)?;
        }
        for pair in stages.windows(2) {
            graph.propose_link(pair[0], LinkTarget::Node(pair[1]))?;
        }
        if let Some(last) = stages.last() {
            graph.propose_link(*last, LinkTarget::Final)?;
        }
        Ok(graph)
    }

    // -----------------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------------

    pub fn policy(&self) -> &LinkPolicy {
        &self.policy
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Looks up a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&FunctionNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &FunctionNode> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The node fed directly by the initial value.
    pub fn source_node(&self) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|n| n.predecessor() == Some(Predecessor::Source))
            .map(FunctionNode::id)
    }

    /// The node that feeds the final output.
    pub fn final_node(&self) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|n| n.successor() == Some(Successor::Final))
            .map(FunctionNode::id)
    }

    /// Walks from the SOURCE-fed node. The walk is capped at the node count.
    pub fn chain(&self) -> Chain {
        let mut nodes = Vec::new();
        let mut cursor = self.source_node();
        let mut complete = false;
        while let Some(id) = cursor {
            if nodes.len() >= self.nodes.len() {
                break;
            }
            nodes.push(id);
            cursor = match self.nodes.get(&id).and_then(FunctionNode::successor) {
                Some(Successor::Node(next)) => Some(next),
                Some(Successor::Final) => {
                    complete = true;
                    None
                }
                None => None,
            };
        }
        Chain { nodes, complete }
    }

    // -----------------------------------------------------------------------
    // Node methods
    // -----------------------------------------------------------------------

    /// Adds an unconnected node. The id is never reused.
    pub fn add_node(&mut self, equation: &str) -> Result<NodeId, CoreError> {
        if !is_valid_equation(equation) {
            return Err(CoreError::InvalidEquation {
                text: equation.to_string(),
            });
        }
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        self.nodes
            .insert(id, FunctionNode::new(id, equation.to_string()));
        self.commit();
        Ok(id)
    }

    /// Replaces a node's equation if `text` matches the restricted grammar.
    ///
    /// Returns `Ok(false)` and leaves the equation untouched when the text is
    /// rejected, so live-typing callers can surface the refusal.
    pub fn set_equation(&mut self, id: NodeId, text: &str) -> Result<bool, CoreError> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(CoreError::NodeNotFound { id })?;
        if !is_valid_equation(text) {
            tracing::debug!(node = %id, text, "equation rejected by grammar");
            return Ok(false);
        }
        if node.equation() == text {
            return Ok(true);
        }
        node.set_equation(text.to_string());
        self.commit();
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Link methods
    // -----------------------------------------------------------------------

    /// Runs the proposal preconditions without mutating.
    ///
    /// Returns the successor that would be written, or `None` for a removal.
    pub fn check_link(
        &self,
        from: NodeId,
        target: LinkTarget,
    ) -> Result<Option<Successor>, LinkRejection> {
        if !self.nodes.contains_key(&from) {
            return Err(LinkRejection::UnknownNode { node: from });
        }

        let to = match target {
            LinkTarget::None => return Ok(None),
            LinkTarget::Final => Successor::Final,
            LinkTarget::Node(id) => Successor::Node(id),
        };

        match to {
            Successor::Node(target_id) => {
                if target_id == from {
                    return Err(LinkRejection::SelfLoop { node: from });
                }
                let target_node = self
                    .nodes
                    .get(&target_id)
                    .ok_or(LinkRejection::UnknownNode { node: target_id })?;
                if let Some(existing) = target_node.predecessor() {
                    if existing != Predecessor::Node(from) {
                        return Err(LinkRejection::FanIn {
                            target: target_id,
                            existing,
                        });
                    }
                }
            }
            Successor::Final => {
                if let Some(holder) = self.final_node().filter(|h| *h != from) {
                    return Err(LinkRejection::FinalTaken { holder });
                }
            }
        }

        self.check_cycle(from, to)?;

        if let LinkPolicy::FixedOrder(order) = &self.policy {
            let expected = order.successor_of(from);
            if expected != Some(to) {
                return Err(LinkRejection::OrderViolation {
                    from,
                    expected,
                    requested: target,
                });
            }
        }

        Ok(Some(to))
    }

    /// Proposes `from -> target`, or removes `from`'s outgoing edge when
    /// `target` is [`LinkTarget::None`].
    ///
    /// Reassigning an existing successor detaches the old downstream node.
    /// Re-proposing the current link is accepted with `changed: false`.
    pub fn propose_link(
        &mut self,
        from: NodeId,
        target: LinkTarget,
    ) -> Result<AppliedChange, LinkRejection> {
        let to = match self.check_link(from, target)? {
            Some(to) => to,
            None => return Ok(self.unlink(from)),
        };

        let previous = self.nodes.get(&from).and_then(FunctionNode::successor);
        let kind = ChangeKind::Linked {
            from,
            to,
            detached: previous.filter(|p| *p != to),
        };
        if previous == Some(to) {
            return Ok(self.unchanged(kind));
        }

        if let Some(Successor::Node(old)) = previous {
            self.clear_predecessor_if(old, Predecessor::Node(from));
        }
        if let Some(node) = self.nodes.get_mut(&from) {
            node.set_successor(Some(to));
        }
        if let Successor::Node(target_id) = to {
            if let Some(node) = self.nodes.get_mut(&target_id) {
                node.set_predecessor(Some(Predecessor::Node(from)));
            }
        }

        tracing::debug!(%from, %to, "link applied");
        Ok(self.applied(kind))
    }

    /// Runs the SOURCE attachment preconditions without mutating.
    pub fn check_source(&self, node: NodeId) -> Result<(), LinkRejection> {
        let target = self
            .nodes
            .get(&node)
            .ok_or(LinkRejection::UnknownNode { node })?;
        if let Some(existing @ Predecessor::Node(_)) = target.predecessor() {
            return Err(LinkRejection::FanIn {
                target: node,
                existing,
            });
        }
        if let LinkPolicy::FixedOrder(order) = &self.policy {
            match order.first() {
                Some(expected) if expected == node => {}
                Some(expected) => {
                    return Err(LinkRejection::SourceOrderViolation {
                        expected,
                        requested: node,
                    })
                }
                None => return Err(LinkRejection::UnknownNode { node }),
            }
        }
        Ok(())
    }

    /// Feeds the initial value into `node`.
    ///
    /// The SOURCE endpoint feeds a single node; attaching it elsewhere
    /// detaches the previous one.
    pub fn connect_source(&mut self, node: NodeId) -> Result<AppliedChange, LinkRejection> {
        self.check_source(node)?;

        let previous = self.source_node();
        let kind = ChangeKind::SourceAttached {
            node,
            detached: previous.filter(|p| *p != node),
        };
        if previous == Some(node) {
            return Ok(self.unchanged(kind));
        }

        if let Some(old) = previous {
            self.clear_predecessor_if(old, Predecessor::Source);
        }
        if let Some(target) = self.nodes.get_mut(&node) {
            target.set_predecessor(Some(Predecessor::Source));
        }

        tracing::debug!(%node, "initial value attached");
        Ok(self.applied(kind))
    }

    /// Clears one side of `node` and the opposite pointer on whichever node
    /// referenced it.
    pub fn disconnect(&mut self, node: NodeId, port: Port) -> Result<AppliedChange, CoreError> {
        let target = self
            .nodes
            .get_mut(&node)
            .ok_or(CoreError::NodeNotFound { id: node })?;

        let mut changed = match port {
            Port::Input => target.predecessor().is_some(),
            Port::Output => target.successor().is_some(),
        };
        match port {
            Port::Input => target.set_predecessor(None),
            Port::Output => target.set_successor(None),
        }

        for other in self.nodes.values_mut() {
            match port {
                Port::Input if other.successor() == Some(Successor::Node(node)) => {
                    other.set_successor(None);
                    changed = true;
                }
                Port::Output if other.predecessor() == Some(Predecessor::Node(node)) => {
                    other.set_predecessor(None);
                    changed = true;
                }
                _ => {}
            }
        }

        let kind = ChangeKind::Disconnected { node, port };
        if !changed {
            return Ok(self.unchanged(kind));
        }
        tracing::debug!(%node, ?port, "anchor disconnected");
        Ok(self.applied(kind))
    }

    // -----------------------------------------------------------------------
    // Consistency
    // -----------------------------------------------------------------------

    /// Verifies the chain invariants: no self-links, mutually consistent
    /// references, single SOURCE/FINAL holder, and an acyclic successor graph.
    pub fn check_consistency(&self) -> Result<(), CoreError> {
        let mut successors = DiGraphMap::<NodeId, ()>::new();
        let mut source_holders = 0;
        let mut final_holders = 0;

        for node in self.nodes.values() {
            let id = node.id();
            successors.add_node(id);

            match node.successor() {
                Some(Successor::Node(next)) => {
                    if next == id {
                        return inconsistent(format!("node {} is its own successor", id));
                    }
                    let back = self.nodes.get(&next).and_then(FunctionNode::predecessor);
                    if back != Some(Predecessor::Node(id)) {
                        return inconsistent(format!(
                            "node {} points at {} but {} has predecessor {:?}",
                            id, next, next, back
                        ));
                    }
                    successors.add_edge(id, next, ());
                }
                Some(Successor::Final) => final_holders += 1,
                None => {}
            }

            match node.predecessor() {
                Some(Predecessor::Node(prev)) => {
                    if prev == id {
                        return inconsistent(format!("node {} is its own predecessor", id));
                    }
                    let forward = self.nodes.get(&prev).and_then(FunctionNode::successor);
                    if forward != Some(Successor::Node(id)) {
                        return inconsistent(format!(
                            "node {} claims predecessor {} but {} has successor {:?}",
                            id, prev, prev, forward
                        ));
                    }
                }
                Some(Predecessor::Source) => source_holders += 1,
                None => {}
            }
        }

        if source_holders > 1 {
            return inconsistent(format!("{} nodes are fed by SOURCE", source_holders));
        }
        if final_holders > 1 {
            return inconsistent(format!("{} nodes feed FINAL", final_holders));
        }
        if is_cyclic_directed(&successors) {
            return inconsistent("successor links contain a cycle".to_string());
        }
        Ok(())
    }

    /// Overwrites `from.successor` with no checks and no revision bump.
    ///
    /// Only for tests that need a graph the mutators refuse to build, such as
    /// a successor cycle.
    #[cfg(feature = "test-util")]
    #[doc(hidden)]
    pub fn set_successor_unchecked(
        &mut self,
        from: NodeId,
        to: Option<Successor>,
    ) -> Result<(), CoreError> {
        self.nodes
            .get_mut(&from)
            .ok_or(CoreError::NodeNotFound { id: from })?
            .set_successor(to);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Follows successors from `to`, seeded with `{from}`. Revisiting any id
    /// means the link would close a cycle. FINAL is a dead end.
    fn check_cycle(&self, from: NodeId, to: Successor) -> Result<(), LinkRejection> {
        let mut visited: IndexSet<NodeId> = IndexSet::new();
        visited.insert(from);
        let mut cursor = to;
        loop {
            let id = match cursor {
                Successor::Final => return Ok(()),
                Successor::Node(id) => id,
            };
            if !visited.insert(id) {
                let mut path: Vec<NodeId> = visited.into_iter().collect();
                path.push(id);
                return Err(LinkRejection::Cycle { path });
            }
            match self.nodes.get(&id).and_then(FunctionNode::successor) {
                Some(next) => cursor = next,
                None => return Ok(()),
            }
        }
    }

    fn unlink(&mut self, from: NodeId) -> AppliedChange {
        let previous = self.nodes.get(&from).and_then(FunctionNode::successor);
        let kind = ChangeKind::Unlinked { from, previous };
        let Some(old) = previous else {
            return self.unchanged(kind);
        };
        if let Successor::Node(old_target) = old {
            self.clear_predecessor_if(old_target, Predecessor::Node(from));
        }
        if let Some(node) = self.nodes.get_mut(&from) {
            node.set_successor(None);
        }
        tracing::debug!(%from, %old, "link removed");
        self.applied(kind)
    }

    fn clear_predecessor_if(&mut self, id: NodeId, expected: Predecessor) {
        if let Some(node) = self.nodes.get_mut(&id) {
            if node.predecessor() == Some(expected) {
                node.set_predecessor(None);
            }
        }
    }

    fn applied(&mut self, kind: ChangeKind) -> AppliedChange {
        self.commit();
        AppliedChange {
            kind,
            changed: true,
            revision: self.revision,
        }
    }

    fn unchanged(&self, kind: ChangeKind) -> AppliedChange {
        AppliedChange {
            kind,
            changed: false,
            revision: self.revision,
        }
    }

    fn commit(&mut self) {
        self.revision += 1;

        #[cfg(debug_assertions)]
        self.assert_consistency();
    }

    /// Panics if [`check_consistency`](Self::check_consistency) fails.
    ///
    /// Only called in debug builds (via `cfg(debug_assertions)`).
    #[cfg(debug_assertions)]
    fn assert_consistency(&self) {
        if let Err(err) = self.check_consistency() {
            panic!("workflow graph invariant broken: {}", err);
        }
    }
}

impl Default for WorkflowGraph {
    fn default() -> Self {
        WorkflowGraph::seeded(LinkPolicy::Free)
    }
}

fn inconsistent(reason: String) -> Result<(), CoreError> {
    Err(CoreError::GraphInconsistency { reason })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::FixedOrder;

    fn n(id: u32) -> NodeId {
        NodeId(id)
    }

    fn link(graph: &mut WorkflowGraph, from: u32, to: u32) -> Result<AppliedChange, LinkRejection> {
        graph.propose_link(n(from), LinkTarget::Node(n(to)))
    }

    #[test]
    fn seeded_graph_has_five_unconnected_nodes() {
        let graph = WorkflowGraph::seeded(LinkPolicy::Free);
        assert_eq!(graph.node_count(), 5);
        assert!(graph.nodes().all(FunctionNode::is_isolated));
        assert_eq!(graph.node(n(2)).unwrap().equation(), "2x+4");
        assert_eq!(graph.source_node(), None);
        assert_eq!(graph.final_node(), None);
        assert_eq!(graph.revision(), 0);
    }

    #[test]
    fn link_sets_both_ends() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        let change = link(&mut graph, 1, 2).unwrap();
        assert!(change.changed);
        assert_eq!(graph.node(n(1)).unwrap().successor(), Some(Successor::Node(n(2))));
        assert_eq!(graph.node(n(2)).unwrap().predecessor(), Some(Predecessor::Node(n(1))));
        graph.check_consistency().unwrap();
    }

    #[test]
    fn self_loop_rejected() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        assert_eq!(
            link(&mut graph, 1, 1).unwrap_err(),
            LinkRejection::SelfLoop { node: n(1) }
        );
        assert_eq!(graph.revision(), 0);
    }

    #[test]
    fn unknown_nodes_rejected() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        assert_eq!(
            link(&mut graph, 9, 1).unwrap_err(),
            LinkRejection::UnknownNode { node: n(9) }
        );
        assert_eq!(
            link(&mut graph, 1, 9).unwrap_err(),
            LinkRejection::UnknownNode { node: n(9) }
        );
    }

    #[test]
    fn fan_in_rejected_until_cleared() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        link(&mut graph, 1, 2).unwrap();
        assert_eq!(
            link(&mut graph, 3, 2).unwrap_err(),
            LinkRejection::FanIn {
                target: n(2),
                existing: Predecessor::Node(n(1)),
            }
        );
        graph.disconnect(n(2), Port::Input).unwrap();
        link(&mut graph, 3, 2).unwrap();
        assert_eq!(graph.node(n(1)).unwrap().successor(), None);
        assert_eq!(graph.node(n(2)).unwrap().predecessor(), Some(Predecessor::Node(n(3))));
    }

    #[test]
    fn fan_in_rejected_for_source_fed_target() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        graph.connect_source(n(2)).unwrap();
        assert_eq!(
            link(&mut graph, 1, 2).unwrap_err(),
            LinkRejection::FanIn {
                target: n(2),
                existing: Predecessor::Source,
            }
        );
    }

    #[test]
    fn cycle_rejected_on_closing_link() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        link(&mut graph, 1, 2).unwrap();
        link(&mut graph, 2, 3).unwrap();
        let err = link(&mut graph, 3, 1).unwrap_err();
        assert_eq!(
            err,
            LinkRejection::Cycle {
                path: vec![n(3), n(1), n(2), n(3)],
            }
        );
        assert_eq!(graph.node(n(3)).unwrap().successor(), None);
        graph.check_consistency().unwrap();
    }

    #[test]
    fn two_node_cycle_rejected() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        link(&mut graph, 1, 2).unwrap();
        assert!(matches!(
            link(&mut graph, 2, 1).unwrap_err(),
            LinkRejection::FanIn { .. } | LinkRejection::Cycle { .. }
        ));
    }

    #[test]
    fn relinking_detaches_old_target() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        link(&mut graph, 1, 2).unwrap();
        let change = link(&mut graph, 1, 3).unwrap();
        assert_eq!(
            change.kind,
            ChangeKind::Linked {
                from: n(1),
                to: Successor::Node(n(3)),
                detached: Some(Successor::Node(n(2))),
            }
        );
        assert_eq!(graph.node(n(2)).unwrap().predecessor(), None);
        assert_eq!(graph.node(n(3)).unwrap().predecessor(), Some(Predecessor::Node(n(1))));
    }

    #[test]
    fn same_link_twice_is_noop() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        link(&mut graph, 1, 2).unwrap();
        let before = serde_json::to_string(&graph).unwrap();
        let change = link(&mut graph, 1, 2).unwrap();
        assert!(!change.changed);
        assert_eq!(serde_json::to_string(&graph).unwrap(), before);
    }

    #[test]
    fn removal_clears_back_reference() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        link(&mut graph, 1, 2).unwrap();
        let change = graph.propose_link(n(1), LinkTarget::None).unwrap();
        assert!(change.changed);
        assert_eq!(graph.node(n(1)).unwrap().successor(), None);
        assert_eq!(graph.node(n(2)).unwrap().predecessor(), None);

        let again = graph.propose_link(n(1), LinkTarget::None).unwrap();
        assert!(!again.changed);
    }

    #[test]
    fn final_is_exclusive() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        graph.propose_link(n(3), LinkTarget::Final).unwrap();
        assert_eq!(
            graph.propose_link(n(4), LinkTarget::Final).unwrap_err(),
            LinkRejection::FinalTaken { holder: n(3) }
        );
        // Re-proposing from the holder is fine.
        assert!(!graph.propose_link(n(3), LinkTarget::Final).unwrap().changed);
        assert_eq!(graph.final_node(), Some(n(3)));
    }

    #[test]
    fn source_attachment_moves() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        graph.connect_source(n(1)).unwrap();
        let change = graph.connect_source(n(4)).unwrap();
        assert_eq!(
            change.kind,
            ChangeKind::SourceAttached {
                node: n(4),
                detached: Some(n(1)),
            }
        );
        assert_eq!(graph.node(n(1)).unwrap().predecessor(), None);
        assert_eq!(graph.source_node(), Some(n(4)));
    }

    #[test]
    fn source_rejected_on_node_with_input() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        link(&mut graph, 1, 2).unwrap();
        assert!(matches!(
            graph.connect_source(n(2)).unwrap_err(),
            LinkRejection::FanIn { .. }
        ));
    }

    #[test]
    fn disconnect_input_clears_upstream_successor() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        link(&mut graph, 1, 2).unwrap();
        let change = graph.disconnect(n(2), Port::Input).unwrap();
        assert!(change.changed);
        assert_eq!(graph.node(n(1)).unwrap().successor(), None);
        assert_eq!(graph.node(n(2)).unwrap().predecessor(), None);
    }

    #[test]
    fn disconnect_output_clears_downstream_predecessor() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        link(&mut graph, 1, 2).unwrap();
        graph.disconnect(n(1), Port::Output).unwrap();
        assert_eq!(graph.node(n(2)).unwrap().predecessor(), None);
        graph.check_consistency().unwrap();
    }

    #[test]
    fn disconnect_source_and_final_sides() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        graph.connect_source(n(1)).unwrap();
        graph.propose_link(n(1), LinkTarget::Final).unwrap();
        graph.disconnect(n(1), Port::Input).unwrap();
        graph.disconnect(n(1), Port::Output).unwrap();
        assert!(graph.node(n(1)).unwrap().is_isolated());
        assert!(!graph.disconnect(n(1), Port::Output).unwrap().changed);
    }

    #[test]
    fn disconnect_unknown_node_errors() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        assert!(matches!(
            graph.disconnect(n(42), Port::Input),
            Err(CoreError::NodeNotFound { id }) if id == n(42)
        ));
    }

    #[test]
    fn set_equation_validates() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        assert!(graph.set_equation(n(1), "3x + 1").unwrap());
        assert_eq!(graph.node(n(1)).unwrap().equation(), "3x + 1");
        let revision = graph.revision();

        assert!(!graph.set_equation(n(1), "y = 3").unwrap());
        assert_eq!(graph.node(n(1)).unwrap().equation(), "3x + 1");
        assert_eq!(graph.revision(), revision);

        assert!(graph.set_equation(n(99), "x").is_err());
    }

    #[test]
    fn add_node_assigns_fresh_ids() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        assert_eq!(graph.add_node("x+1").unwrap(), n(6));
        assert!(graph.add_node("x;").is_err());
        assert_eq!(graph.add_node("x").unwrap(), n(7));
    }

    #[test]
    fn strict_mode_allows_only_dictated_successor() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::default_fixed());
        assert_eq!(
            link(&mut graph, 2, 3).unwrap_err(),
            LinkRejection::OrderViolation {
                from: n(2),
                expected: Some(Successor::Node(n(4))),
                requested: LinkTarget::Node(n(3)),
            }
        );
        link(&mut graph, 2, 4).unwrap();
        assert!(graph.propose_link(n(5), LinkTarget::Final).is_err());
        graph.propose_link(n(3), LinkTarget::Final).unwrap();
        // Removal always succeeds.
        graph.propose_link(n(2), LinkTarget::None).unwrap();
    }

    #[test]
    fn strict_mode_source_must_feed_first_stage() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::default_fixed());
        assert_eq!(
            graph.connect_source(n(2)).unwrap_err(),
            LinkRejection::SourceOrderViolation {
                expected: n(1),
                requested: n(2),
            }
        );
        graph.connect_source(n(1)).unwrap();
    }

    #[test]
    fn strict_mode_rejects_stage_outside_order() {
        let order = FixedOrder::new(vec![n(1), n(2)]).unwrap();
        let mut graph = WorkflowGraph::seeded(LinkPolicy::FixedOrder(order));
        assert!(matches!(
            link(&mut graph, 3, 4).unwrap_err(),
            LinkRejection::OrderViolation { expected: None, .. }
        ));
    }

    #[test]
    fn default_chain_is_complete() {
        let graph = WorkflowGraph::with_default_chain(LinkPolicy::Free).unwrap();
        let chain = graph.chain();
        assert_eq!(chain.nodes, vec![n(1), n(2), n(4), n(5), n(3)]);
        assert!(chain.complete);
        graph.check_consistency().unwrap();
    }

    #[test]
    fn dangling_chain_is_incomplete() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        graph.connect_source(n(1)).unwrap();
        link(&mut graph, 1, 2).unwrap();
        let chain = graph.chain();
        assert_eq!(chain.nodes, vec![n(1), n(2)]);
        assert!(!chain.complete);
    }

    #[test]
    fn check_link_does_not_mutate() {
        let graph = WorkflowGraph::seeded(LinkPolicy::Free);
        assert_eq!(
            graph.check_link(n(1), LinkTarget::Node(n(2))).unwrap(),
            Some(Successor::Node(n(2)))
        );
        assert!(graph.node(n(1)).unwrap().is_isolated());
    }

    #[test]
    fn consistency_detects_broken_back_reference() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        // Bypass the mutators to simulate a corrupted state.
        if let Some(node) = graph.nodes.get_mut(&n(1)) {
            node.set_successor(Some(Successor::Node(n(2))));
        }
        assert!(matches!(
            graph.check_consistency(),
            Err(CoreError::GraphInconsistency { .. })
        ));
    }

    #[test]
    fn serde_roundtrip_preserves_links() {
        let graph = WorkflowGraph::with_default_chain(LinkPolicy::default_fixed()).unwrap();
        let json = serde_json::to_string(&graph).unwrap();
        let back: WorkflowGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(back.chain(), graph.chain());
        assert_eq!(back.policy(), graph.policy());
        assert_eq!(back.revision(), graph.revision());
    }

    #[test]
    fn deserialize_refuses_broken_links() {
        // 1 -> 2 and 2 -> 1, while 1 is also fed by SOURCE
        let json = r#"{
            "nodes": {
                "1": { "id": 1, "equation": "x", "successor": { "node": 2 }, "predecessor": "source" },
                "2": { "id": 2, "equation": "x", "successor": { "node": 1 }, "predecessor": { "node": 1 } }
            },
            "policy": { "mode": "free" },
            "next_node_id": 3,
            "revision": 0
        }"#;
        let err = serde_json::from_str::<WorkflowGraph>(json).unwrap_err();
        assert!(err.to_string().contains("graph inconsistency"), "{}", err);
    }

    #[test]
    fn deserialize_refuses_mismatched_keys() {
        let json = r#"{
            "nodes": { "1": { "id": 2, "equation": "x", "successor": null, "predecessor": null } },
            "policy": { "mode": "free" },
            "next_node_id": 3,
            "revision": 0
        }"#;
        assert!(serde_json::from_str::<WorkflowGraph>(json).is_err());
    }

    #[test]
    fn deserialize_repairs_stale_id_counter() {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        graph.connect_source(n(1)).unwrap();
        let mut json = serde_json::to_value(&graph).unwrap();
        json["next_node_id"] = serde_json::json!(1);
        let mut back: WorkflowGraph = serde_json::from_value(json).unwrap();
        assert_eq!(back.source_node(), Some(n(1)));
        assert_eq!(back.add_node("x").unwrap(), n(6));
    }
}
