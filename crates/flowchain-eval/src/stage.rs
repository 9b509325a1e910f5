//! Single-stage evaluation with rounding and fault degradation.
//!
//! [`ExpressionEvaluator`] is the seam for the arithmetic backend. The chain
//! walk never sees an error from it: [`evaluate_stage`] turns any fault into
//! an output of `0` and hands the fault back alongside.

use serde::{Deserialize, Serialize};

use crate::error::ExprError;
use crate::expr::Expr;

/// Evaluates equation text with the variable bound to `x`.
pub trait ExpressionEvaluator {
    fn evaluate(&self, expression: &str, x: f64) -> Result<f64, ExprError>;
}

/// The built-in evaluator over the restricted grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArithmeticEvaluator;

impl ExpressionEvaluator for ArithmeticEvaluator {
    fn evaluate(&self, expression: &str, x: f64) -> Result<f64, ExprError> {
        Expr::parse(expression)?.eval(x)
    }
}

impl<F> ExpressionEvaluator for F
where
    F: Fn(&str, f64) -> Result<f64, ExprError>,
{
    fn evaluate(&self, expression: &str, x: f64) -> Result<f64, ExprError> {
        self(expression, x)
    }
}

/// Output of one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutput {
    /// Rounded result, or `0` if the stage faulted.
    pub value: f64,
    pub fault: Option<ExprError>,
}

/// Runs one stage: evaluate, round to two decimals, degrade faults to `0`.
pub fn evaluate_stage<E>(evaluator: &E, expression: &str, x: f64) -> StageOutput
where
    E: ExpressionEvaluator + ?Sized,
{
    match evaluator
        .evaluate(expression, x)
        .and_then(round_to_cents)
    {
        Ok(value) => StageOutput { value, fault: None },
        Err(fault) => StageOutput {
            value: 0.0,
            fault: Some(fault),
        },
    }
}

/// Evaluates one expression with the built-in evaluator.
///
/// Faults are logged and degrade to `0`.
pub fn evaluate_expression(expression: &str, x: f64) -> f64 {
    let stage = evaluate_stage(&ArithmeticEvaluator, expression, x);
    if let Some(fault) = &stage.fault {
        tracing::warn!(expression, x, %fault, "expression evaluation fault");
    }
    stage.value
}

/// Rounds half away from zero to two decimals.
fn round_to_cents(value: f64) -> Result<f64, ExprError> {
    let rounded = (value * 100.0).round() / 100.0;
    if !rounded.is_finite() {
        return Err(ExprError::NonFinite);
    }
    // Normalise -0.0 so callers never see a signed zero.
    Ok(if rounded == 0.0 { 0.0 } else { rounded })
}
