//! Binary entrypoint for the flowchain HTTP server.
//!
//! Configuration comes from `FLOWCHAIN_*` environment variables (see
//! [`ServerConfig`]). Log filtering follows `RUST_LOG`.

use flowchain_server::config::ServerConfig;
use flowchain_server::router::build_router;
use flowchain_server::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("flowchain_server=info,tower_http=info,warn")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let state = AppState::new(&config)?;
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("flowchain server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
