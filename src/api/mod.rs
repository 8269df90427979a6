//! HTTP API: pulse ingestion, config upsert, maintenance toggling, status reads, and the tick
//! trigger (§6). Thin routing + DTO translation over the core's domain collaborators -- no
//! business logic lives in this module.

pub mod error;
pub mod routes;
pub mod state;
pub mod types;
pub mod utils;


pub use error::{ApiError, ApiResult};
pub use state::ApiState;

use std::net::SocketAddr;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Assemble the router. Separated from [`spawn_api_server`] so tests can drive it in-process
/// with `tower::ServiceExt::oneshot` without binding a socket.
pub fn build_router(state: ApiState, enable_cors: bool) -> Router {
    let mut app = Router::new()
        .route("/api/pulse", post(routes::pulse::pulse))
        .route("/api/config", put(routes::config::put_config))
        .route(
            "/api/config/:project_id",
            put(routes::config::put_config_for_project),
        )
        .route(
            "/api/maintenance/:project_id",
            post(routes::maintenance::post_maintenance),
        )
        .route("/api/status", get(routes::status::get_status))
        .route(
            "/api/status/:project_id",
            get(routes::status::get_project_status),
        )
        .route("/api/tick", post(routes::tick::post_tick))
        .route("/api/health", get(routes::health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Bind and serve the API in a background task, returning the address actually bound (useful
/// when `bind_addr`'s port is 0, as in tests).
pub async fn spawn_api_server(
    bind_addr: SocketAddr,
    state: ApiState,
    enable_cors: bool,
) -> anyhow::Result<SocketAddr> {
    let app = build_router(state, enable_cors);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;
    info!("API server listening on {addr}");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server error: {e}");
        }
    });

    Ok(addr)
}
