//! Chain evaluation for flowchain workflows.
//!
//! - [`expr`] parses and evaluates the restricted arithmetic grammar
//!   (`+ - * / ^ ( )`, decimals, the variable `x`, implicit coefficients).
//! - [`stage`] wraps one expression evaluation with two-decimal rounding and
//!   the degrade-to-zero fault policy.
//! - [`chain`] walks the wired chain from the SOURCE-fed node to FINAL.
//!
//! # Usage
//!
//! ```ignore
//! let graph = WorkflowGraph::with_default_chain(LinkPolicy::Free)?;
//! let evaluation = flowchain_eval::evaluate(&graph, 2.0);
//! assert_eq!(evaluation.output(), Some(45.0));
//! ```

pub mod chain;
pub mod error;
pub mod expr;
pub mod stage;
pub mod trace;

pub use chain::{evaluate, ChainEvaluator, EvalConfig, EvalStatus, Evaluation, StageFault};
pub use error::ExprError;
pub use expr::Expr;
pub use stage::{evaluate_expression, evaluate_stage, ArithmeticEvaluator, ExpressionEvaluator, StageOutput};
pub use trace::TraceEntry;
