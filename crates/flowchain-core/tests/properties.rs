//! Property tests for the link mutator.
//!
//! Random mutation sequences over a small seeded graph must never leave the
//! successor graph cyclic or the successor/predecessor pairs out of sync,
//! whichever policy is active.

use proptest::prelude::*;

use flowchain_core::{LinkPolicy, LinkTarget, NodeId, Port, Predecessor, Successor, WorkflowGraph};

#[derive(Debug, Clone)]
enum Op {
    Link(u32, LinkTarget),
    Source(u32),
    Disconnect(u32, Port),
}

/// Ids 0 and 6 fall outside the seed so unknown-node paths are exercised too.
fn node_id() -> impl Strategy<Value = u32> {
    0u32..=6
}

fn link_target() -> impl Strategy<Value = LinkTarget> {
    prop_oneof![
        4 => node_id().prop_map(|id| LinkTarget::Node(NodeId(id))),
        1 => Just(LinkTarget::Final),
        1 => Just(LinkTarget::None),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (node_id(), link_target()).prop_map(|(from, to)| Op::Link(from, to)),
        1 => node_id().prop_map(Op::Source),
        2 => (node_id(), prop_oneof![Just(Port::Input), Just(Port::Output)])
            .prop_map(|(id, port)| Op::Disconnect(id, port)),
    ]
}

fn apply(graph: &mut WorkflowGraph, op: &Op) {
    match op {
        Op::Link(from, to) => {
            let _ = graph.propose_link(NodeId(*from), *to);
        }
        Op::Source(id) => {
            let _ = graph.connect_source(NodeId(*id));
        }
        Op::Disconnect(id, port) => {
            let _ = graph.disconnect(NodeId(*id), *port);
        }
    }
}

/// Follows successors from every node; a walk longer than the node count
/// would mean a revisit.
fn assert_no_revisit(graph: &WorkflowGraph) {
    for start in graph.node_ids() {
        let mut seen = vec![start];
        let mut cursor = graph.node(start).and_then(|n| n.successor());
        while let Some(Successor::Node(next)) = cursor {
            assert!(!seen.contains(&next), "revisited {} starting from {}", next, start);
            seen.push(next);
            cursor = graph.node(next).and_then(|n| n.successor());
        }
    }
}

fn policy() -> impl Strategy<Value = LinkPolicy> {
    prop_oneof![Just(LinkPolicy::Free), Just(LinkPolicy::default_fixed())]
}

proptest! {
    #[test]
    fn mutations_preserve_invariants(policy in policy(), ops in prop::collection::vec(op(), 0..64)) {
        let mut graph = WorkflowGraph::seeded(policy);
        for op in &ops {
            apply(&mut graph, op);
            prop_assert!(graph.check_consistency().is_ok());
            assert_no_revisit(&graph);
        }
    }

    #[test]
    fn accepted_link_sets_both_ends(ops in prop::collection::vec(op(), 0..32), from in 1u32..=5, to in 1u32..=5) {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        for op in &ops {
            apply(&mut graph, op);
        }
        if graph.propose_link(NodeId(from), LinkTarget::Node(NodeId(to))).is_ok() {
            prop_assert_eq!(
                graph.node(NodeId(from)).and_then(|n| n.successor()),
                Some(Successor::Node(NodeId(to)))
            );
            prop_assert_eq!(
                graph.node(NodeId(to)).and_then(|n| n.predecessor()),
                Some(Predecessor::Node(NodeId(from)))
            );
        }
    }

    #[test]
    fn reproposing_is_idempotent(ops in prop::collection::vec(op(), 0..32), from in 1u32..=5, to in link_target()) {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        for op in &ops {
            apply(&mut graph, op);
        }
        if graph.propose_link(NodeId(from), to).is_ok() {
            let before = serde_json::to_string(&graph).unwrap();
            let again = graph.propose_link(NodeId(from), to).unwrap();
            prop_assert!(!again.changed);
            prop_assert_eq!(serde_json::to_string(&graph).unwrap(), before);
        }
    }

    #[test]
    fn rejections_leave_graph_untouched(ops in prop::collection::vec(op(), 0..32), from in node_id(), to in link_target()) {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        for op in &ops {
            apply(&mut graph, op);
        }
        let before = serde_json::to_string(&graph).unwrap();
        if graph.propose_link(NodeId(from), to).is_err() {
            prop_assert_eq!(serde_json::to_string(&graph).unwrap(), before);
        }
    }
}
