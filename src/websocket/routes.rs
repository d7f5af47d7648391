use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use serde_json::json;

use crate::server::SignalServer;

use super::handler::websocket_handler;

/// Create the Axum router with WebSocket support
pub fn create_router(cors_origins: &str) -> axum::Router<Arc<SignalServer>> {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    let cors = if cors_origins == "*" {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("No valid CORS origins configured, using permissive CORS");
            CorsLayer::permissive()
        } else {
            CorsLayer::new().allow_origin(origins).allow_methods(Any)
        }
    };

    axum::Router::new()
        .route("/ws", get(websocket_handler))
        .route("/health", get(health_check))
        .route("/", get(root))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn root() -> &'static str {
    "signal-relay-server. Connect via /ws with publicKey, timestamp and signature query parameters."
}

/// Health check with current presence count for diagnostics.
async fn health_check(State(server): State<Arc<SignalServer>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "connected_peers": server.registry().len(),
    }))
}
