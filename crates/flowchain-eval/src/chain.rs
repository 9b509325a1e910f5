//! Chain walk from the SOURCE-fed node to FINAL.
//!
//! [`ChainEvaluator`] feeds the initial value into the node whose predecessor
//! is SOURCE and threads each stage's output into its successor. The walk ends
//! in one of four states (see [`EvalStatus`]); only
//! [`EvalStatus::Completed`] carries a publishable final output.
//!
//! The walk is capped at the node count. With a consistent graph the cap is
//! never reached; hitting it means the successor links loop.

use flowchain_core::{NodeId, Successor, WorkflowGraph};
use serde::{Deserialize, Serialize};

use crate::error::ExprError;
use crate::stage::{evaluate_stage, ArithmeticEvaluator, ExpressionEvaluator};
use crate::trace::TraceEntry;

/// Configuration for a chain evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Record a [`TraceEntry`] per evaluated stage.
    #[serde(default)]
    pub trace_enabled: bool,
}

/// How a walk ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EvalStatus {
    /// The walk reached FINAL.
    Completed { output: f64 },
    /// No node is fed by SOURCE.
    Unwired,
    /// The walk stopped at a node with no successor. `last_value` is not a
    /// final output.
    Dangling { last_node: NodeId, last_value: f64 },
    /// The iteration cap was hit before reaching FINAL.
    CapExceeded { steps: usize, last_value: f64 },
}

/// A stage that faulted and was degraded to `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageFault {
    pub node: NodeId,
    pub equation: String,
    pub error: ExprError,
}

/// Result of one chain walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub initial_value: f64,
    pub status: EvalStatus,
    /// Number of stages evaluated.
    pub steps: usize,
    pub faults: Vec<StageFault>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<TraceEntry>>,
}

impl Evaluation {
    /// The final output, present only when the walk reached FINAL.
    pub fn output(&self) -> Option<f64> {
        match self.status {
            EvalStatus::Completed { output } => Some(output),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.status, EvalStatus::Completed { .. })
    }
}

/// Walks a [`WorkflowGraph`] with a pluggable expression backend.
pub struct ChainEvaluator<'g, E = ArithmeticEvaluator> {
    graph: &'g WorkflowGraph,
    evaluator: E,
    config: EvalConfig,
}

impl<'g> ChainEvaluator<'g, ArithmeticEvaluator> {
    pub fn new(graph: &'g WorkflowGraph, config: EvalConfig) -> Self {
        ChainEvaluator::with_evaluator(graph, ArithmeticEvaluator, config)
    }
}

impl<'g, E: ExpressionEvaluator> ChainEvaluator<'g, E> {
    pub fn with_evaluator(graph: &'g WorkflowGraph, evaluator: E, config: EvalConfig) -> Self {
        ChainEvaluator {
            graph,
            evaluator,
            config,
        }
    }

    /// Runs the walk from `initial_value`.
    pub fn run(&self, initial_value: f64) -> Evaluation {
        let mut evaluation = Evaluation {
            initial_value,
            status: EvalStatus::Unwired,
            steps: 0,
            faults: Vec::new(),
            trace: self.config.trace_enabled.then(Vec::new),
        };

        let Some(mut current) = self.graph.source_node() else {
            tracing::debug!("no node is fed by the initial value");
            return evaluation;
        };

        let mut value = initial_value;
        tracing::debug!(initial_value, start = %current, "starting chain walk");

        while evaluation.steps < self.graph.node_count() {
            let Some(node) = self.graph.node(current) else {
                break;
            };
            let stage = evaluate_stage(&self.evaluator, node.equation(), value);
            evaluation.steps += 1;

            if let Some(error) = &stage.fault {
                tracing::warn!(
                    node = %current,
                    equation = node.equation(),
                    input = value,
                    %error,
                    "stage evaluation fault, output degraded to 0"
                );
                evaluation.faults.push(StageFault {
                    node: current,
                    equation: node.equation().to_string(),
                    error: error.clone(),
                });
            }
            if let Some(trace) = evaluation.trace.as_mut() {
                trace.push(TraceEntry {
                    node: current,
                    equation: node.equation().to_string(),
                    input: value,
                    output: stage.value,
                    fault: stage.fault.clone(),
                });
            }
            tracing::debug!(node = %current, input = value, output = stage.value, "stage evaluated");
            value = stage.value;

            match node.successor() {
                Some(Successor::Final) => {
                    evaluation.status = EvalStatus::Completed { output: value };
                    return evaluation;
                }
                Some(Successor::Node(next)) => current = next,
                None => {
                    evaluation.status = EvalStatus::Dangling {
                        last_node: current,
                        last_value: value,
                    };
                    return evaluation;
                }
            }
        }

        tracing::warn!(steps = evaluation.steps, "chain walk hit the iteration cap");
        evaluation.status = EvalStatus::CapExceeded {
            steps: evaluation.steps,
            last_value: value,
        };
        evaluation
    }
}

/// Evaluates `graph` from `initial_value` with the built-in evaluator.
pub fn evaluate(graph: &WorkflowGraph, initial_value: f64) -> Evaluation {
    ChainEvaluator::new(graph, EvalConfig::default()).run(initial_value)
}
