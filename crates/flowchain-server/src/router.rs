//! Router assembly for the flowchain HTTP API.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router.
///
/// Routes use axum 0.8 `/{param}` path syntax. CORS is permissive so a
/// browser renderer on another origin can call in.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/workflow", get(handlers::workflow::get_workflow))
        .route("/workflow/frame", get(handlers::workflow::get_frame))
        .route(
            "/workflow/nodes/{id}/options",
            get(handlers::workflow::node_options),
        )
        .route("/workflow/actions", post(handlers::actions::dispatch_action))
        .route("/workflow/evaluate", post(handlers::evaluate::evaluate))
        .route("/route", post(handlers::route::route))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
