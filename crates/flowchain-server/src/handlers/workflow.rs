//! Read-only workflow handlers.

use axum::extract::{Path, State};
use axum::Json;
use flowchain_core::NodeId;

use crate::error::ApiError;
use crate::schema::workflow::{OptionsResponse, WorkflowResponse};
use crate::session::Frame;
use crate::state::AppState;

/// `GET /workflow`
pub async fn get_workflow(State(state): State<AppState>) -> Json<WorkflowResponse> {
    let service = state.service.lock().await;
    Json(service.workflow())
}

/// `GET /workflow/frame`
pub async fn get_frame(State(state): State<AppState>) -> Json<Frame> {
    let service = state.service.lock().await;
    Json(service.frame())
}

/// `GET /workflow/nodes/{id}/options`
pub async fn node_options(
    State(state): State<AppState>,
    Path(node_id): Path<u32>,
) -> Result<Json<OptionsResponse>, ApiError> {
    let service = state.service.lock().await;
    let response = service.options(NodeId(node_id))?;
    Ok(Json(response))
}
