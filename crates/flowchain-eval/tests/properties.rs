//! Property tests for stage and chain evaluation.

use proptest::prelude::*;

use flowchain_core::{LinkPolicy, LinkTarget, NodeId, WorkflowGraph};
use flowchain_eval::{evaluate, evaluate_stage, ArithmeticEvaluator, EvalStatus};

/// Strings drawn only from the equation alphabet, well-formed or not.
fn equation_text() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[0-9x+*/^(). -]{0,16}").unwrap()
}

fn link_target() -> impl Strategy<Value = LinkTarget> {
    prop_oneof![
        4 => (1u32..=5).prop_map(|id| LinkTarget::Node(NodeId(id))),
        1 => Just(LinkTarget::Final),
    ]
}

proptest! {
    #[test]
    fn stage_output_is_finite_and_rounded(text in equation_text(), x in -1.0e6f64..1.0e6) {
        let stage = evaluate_stage(&ArithmeticEvaluator, &text, x);
        prop_assert!(stage.value.is_finite());
        if stage.fault.is_some() {
            prop_assert_eq!(stage.value, 0.0);
        }
        let cents = stage.value * 100.0;
        prop_assert!((cents - cents.round()).abs() < 1e-6 * cents.abs().max(1.0));
    }

    #[test]
    fn walk_terminates_within_node_count(
        source in 1u32..=5,
        links in proptest::collection::vec((1u32..=5, link_target()), 0..12),
        initial in -100.0f64..100.0,
    ) {
        let mut graph = WorkflowGraph::seeded(LinkPolicy::Free);
        let _ = graph.connect_source(NodeId(source));
        for (from, to) in links {
            let _ = graph.propose_link(NodeId(from), to);
        }

        let evaluation = evaluate(&graph, initial);
        prop_assert!(evaluation.steps <= graph.node_count());
        prop_assert!(!matches!(evaluation.status, EvalStatus::CapExceeded { .. }), "status was CapExceeded");
        prop_assert_eq!(evaluation.is_complete(), graph.chain().complete);
    }
}
