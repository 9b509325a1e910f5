//! API schema types for request/response definitions.

pub mod actions;
pub mod evaluate;
pub mod route;
pub mod workflow;
