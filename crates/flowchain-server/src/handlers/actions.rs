//! Action dispatch handler.

use axum::extract::State;
use axum::Json;

use crate::error::ApiError;
use crate::schema::actions::ActionResponse;
use crate::session::Action;
use crate::state::AppState;

/// Applies one action to the session.
///
/// `POST /workflow/actions`
///
/// A rejected link still answers 200; the rejection is in the outcome.
pub async fn dispatch_action(
    State(state): State<AppState>,
    Json(action): Json<Action>,
) -> Result<Json<ActionResponse>, ApiError> {
    let mut service = state.service.lock().await;
    let response = service.dispatch(action)?;
    Ok(Json(response))
}
