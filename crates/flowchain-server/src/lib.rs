//! HTTP/JSON surface and session coordinator for flowchain workflows.
//!
//! The [`session::Session`] owns every piece of mutable UI state (graph,
//! initial value, layout, open dropdown, drag gesture) and is changed only by
//! dispatching [`session::Action`]s. Each dispatch applies the mutation and
//! recomputes the evaluation and the render frame before returning, so no
//! caller ever observes a graph whose output or connectors are stale.
//!
//! The router exposes that session to a rendering client.

pub mod config;
pub mod error;
pub mod handlers;
pub mod layout;
pub mod router;
pub mod schema;
pub mod service;
pub mod session;
pub mod state;
