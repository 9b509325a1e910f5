//! HTTP handler modules.
//!
//! Each handler parses the request, takes the service lock, delegates to
//! [`WorkflowService`](crate::service::WorkflowService), and returns JSON.

pub mod actions;
pub mod evaluate;
pub mod route;
pub mod workflow;
