use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::protocol::Reply;
use crate::server::{PeerIdentity, SignalServer};

/// Drive one authenticated peer connection to completion.
///
/// The socket is split into a writer task draining the connection's outbound
/// queue (the only writer this socket ever has) and a receive loop running
/// here. Both observe the connection's close signal so an eviction tears the
/// pair down promptly.
pub(super) async fn handle_socket(
    socket: WebSocket,
    server: Arc<SignalServer>,
    identity: PeerIdentity,
    addr: SocketAddr,
) {
    let (mut sink, mut stream) = socket.split();
    let queue_capacity = server.config().outbound_queue_size.max(1);
    let (tx, mut rx) = mpsc::channel::<Arc<Reply>>(queue_capacity);

    let conn = server.register_peer(identity, addr, tx);
    let peer_id = conn.identity.id.clone();

    let writer_conn = conn.clone();
    let writer_peer_id = peer_id.clone();
    let send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                maybe = rx.recv() => {
                    let Some(reply) = maybe else { break };
                    let frame = match serde_json::to_string(reply.as_ref()) {
                        Ok(frame) => frame,
                        Err(err) => {
                            tracing::error!(peer_id = %writer_peer_id, error = %err, "Failed to serialize reply");
                            continue;
                        }
                    };
                    if sink.send(Message::Text(frame.into())).await.is_err() {
                        tracing::debug!(peer_id = %writer_peer_id, "Outbound write failed, connection closed");
                        break;
                    }
                }
                () = writer_conn.closed().cancelled() => break,
            }
        }
        let _ = sink.close().await;
    });

    let max_message_size = server.config().max_message_size;
    loop {
        let incoming = tokio::select! {
            incoming = stream.next() => incoming,
            () = conn.closed().cancelled() => {
                tracing::debug!(%peer_id, "Connection evicted by re-authentication");
                break;
            }
        };

        let Some(incoming) = incoming else {
            break; // Stream exhausted, transport closed.
        };
        let message = match incoming {
            Ok(message) => message,
            Err(err) => {
                // Best-effort notification; the transport is usually gone.
                let _ = conn.try_deliver(Arc::new(Reply::with_data("error", err.to_string())));
                server.report_connection_error(&conn, err.to_string());
                break;
            }
        };

        match message {
            Message::Text(text) => {
                if text.len() > max_message_size {
                    tracing::warn!(
                        %peer_id,
                        size = text.len(),
                        max = max_message_size,
                        "Frame exceeds size limit"
                    );
                    let _ = conn.try_deliver(Arc::new(Reply::event("invalid-message")));
                    continue;
                }
                server.handle_frame(&conn, &text);
            }
            Message::Binary(_) => {
                tracing::warn!(%peer_id, "Binary frame on a JSON-only protocol");
                let _ = conn.try_deliver(Arc::new(Reply::event("invalid-message")));
            }
            Message::Close(_) => {
                tracing::info!(%peer_id, "Connection closed by peer");
                break;
            }
            // Ping/pong are handled at the transport level.
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    // Deregistration precedes close completion: once we fall out of the
    // loop, no further routing can resolve this connection.
    server.unregister_peer(&conn);
    conn.close();
    let _ = send_task.await;
}
