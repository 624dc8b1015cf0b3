//! HTTP binding: a single `POST /api/command` endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::Result;
use crate::protocol::{Command, WireResponse};
use crate::router::CommandRouter;

/// Build the HTTP application over a router.
pub fn app(router: Arc<CommandRouter>) -> axum::Router {
    axum::Router::new()
        .route("/api/command", post(handle_command))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(router)
}

/// Serve the HTTP binding on an already-bound listener.
pub async fn serve(router: Arc<CommandRouter>, listener: tokio::net::TcpListener) -> Result<()> {
    tracing::info!(addr = %listener.local_addr()?, "http binding listening");
    axum::serve(listener, app(router)).await?;
    Ok(())
}

/// Driver-side failures are reported inside a 200 body as
/// `status: "error"`; callers inspect the body, not the status line.
async fn handle_command(
    State(router): State<Arc<CommandRouter>>,
    Json(command): Json<Command>,
) -> Json<WireResponse> {
    Json(WireResponse::from_result(router.dispatch(&command).await))
}
