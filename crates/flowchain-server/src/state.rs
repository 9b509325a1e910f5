//! Application state with the shared `WorkflowService`.
//!
//! [`AppState`] wraps the service in `Arc<tokio::sync::Mutex<>>`. Every
//! handler takes the lock for the whole request, so dispatches are
//! serialized and a response never shows a half-applied mutation.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::service::WorkflowService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<tokio::sync::Mutex<WorkflowService>>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let service = WorkflowService::new(config)?;
        Ok(AppState {
            service: Arc::new(tokio::sync::Mutex::new(service)),
        })
    }

    /// State with the default configuration: the unwired seed, free policy,
    /// initial value 2.
    pub fn seeded() -> Result<Self, ApiError> {
        Self::new(&ServerConfig::default())
    }
}
