//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all API endpoints. It implements
//! `axum::response::IntoResponse` to produce structured JSON error responses.
//! Rejected link proposals are not errors: they come back as a normal
//! dispatch outcome with `applied: false`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::config::ConfigError;
use crate::session::SessionError;

/// Structured error detail in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Entity not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::InternalError(msg) => {
                tracing::error!(%msg, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        };

        let body = serde_json::json!({
            "success": false,
            "error": ApiErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<flowchain_core::CoreError> for ApiError {
    fn from(err: flowchain_core::CoreError) -> Self {
        match &err {
            flowchain_core::CoreError::NodeNotFound { .. } => ApiError::NotFound(err.to_string()),
            flowchain_core::CoreError::InvalidEquation { .. }
            | flowchain_core::CoreError::InvalidReference { .. }
            | flowchain_core::CoreError::InvalidPolicy { .. }
            | flowchain_core::CoreError::InvalidOrder { .. } => ApiError::BadRequest(err.to_string()),
            flowchain_core::CoreError::GraphInconsistency { .. } => {
                ApiError::InternalError(err.to_string())
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Core(core) => core.into(),
            SessionError::InvalidInitialValue(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<flowchain_route::RouteError> for ApiError {
    fn from(err: flowchain_route::RouteError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}
