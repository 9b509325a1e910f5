//! Evaluation handler.

use axum::extract::State;
use axum::Json;

use crate::error::ApiError;
use crate::schema::evaluate::{EvaluateRequest, EvaluateResponse};
use crate::state::AppState;

/// Evaluates the current graph without changing the session.
///
/// `POST /workflow/evaluate`
pub async fn evaluate(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, ApiError> {
    let service = state.service.lock().await;
    let response = service.evaluate(req)?;
    Ok(Json(response))
}
