//! Side-effect-free evaluation types.

use flowchain_eval::Evaluation;
use serde::{Deserialize, Serialize};

/// `POST /workflow/evaluate`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvaluateRequest {
    /// Defaults to the session's initial value.
    #[serde(default)]
    pub initial_value: Option<f64>,
    #[serde(default)]
    pub trace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub output: Option<f64>,
    pub evaluation: Evaluation,
}
