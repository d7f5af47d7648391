use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::server::{PeerIdentity, SignalServer};

use super::connection::handle_socket;

/// Authentication credentials carried as upgrade-request query parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthParams {
    #[serde(default)]
    public_key: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    signature: Option<String>,
}

/// WebSocket upgrade handler. Verification happens before the upgrade
/// completes: a failed proof is refused with an empty 401 and the WebSocket
/// handshake never finishes, so the peer sees an abrupt termination rather
/// than a structured reply.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(server): State<Arc<SignalServer>>,
    Query(params): Query<AuthParams>,
) -> Response {
    let (Some(public_key), Some(timestamp), Some(signature)) =
        (params.public_key, params.timestamp, params.signature)
    else {
        tracing::warn!(client_addr = %addr, "Upgrade request missing credentials, refusing");
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let verdict = server.verifier().verify(&public_key, &timestamp, &signature);
    let Some(peer_id) = verdict.accepted().map(str::to_owned) else {
        tracing::warn!(client_addr = %addr, "Signature verification failed, refusing upgrade");
        return StatusCode::UNAUTHORIZED.into_response();
    };

    tracing::debug!(%peer_id, client_addr = %addr, "Handshake verified");
    let identity = PeerIdentity {
        id: peer_id,
        public_key,
    };
    ws.on_upgrade(move |socket| handle_socket(socket, server, identity, addr))
}
