//! Connector routing handler.

use axum::Json;

use crate::error::ApiError;
use crate::schema::route::{RouteRequest, RouteResponse};
use crate::service;

/// `POST /route`
pub async fn route(Json(req): Json<RouteRequest>) -> Result<Json<RouteResponse>, ApiError> {
    Ok(Json(service::route(req)?))
}
