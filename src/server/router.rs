use std::sync::Arc;

use crate::protocol::{Reply, SignalMessage};

use super::{PeerConnection, SignalServer};

impl SignalServer {
    /// Validate and route one inbound text frame from an authenticated peer.
    ///
    /// Every error path is a single structured reply to the sender (or a
    /// logged drop); the connection stays open. Forwarding is one
    /// non-blocking enqueue onto the receiver's outbound path, never retried.
    pub fn handle_frame(&self, conn: &PeerConnection, raw: &str) {
        let peer_id = conn.identity.id.as_str();

        let message = match SignalMessage::parse(raw) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(%peer_id, error = %err, "Rejected inbound frame");
                reply_to(conn, Reply::event(err.reply_event()));
                return;
            }
        };

        // Sender identity binding: the claimed id must be the one
        // authenticated at the handshake, and a presented key must be the
        // bound key. Either mismatch is a spoofing attempt.
        if message.sender_id != conn.identity.id {
            tracing::warn!(
                %peer_id,
                claimed = %message.sender_id,
                "senderId does not match authenticated identity"
            );
            reply_to(
                conn,
                Reply::with_data("unauthorized", message.sender_id.clone()),
            );
            return;
        }
        if let Some(key) = message.sender_public_key.as_deref() {
            if key != conn.identity.public_key {
                tracing::warn!(%peer_id, "senderPublicKey does not match bound key");
                reply_to(
                    conn,
                    Reply::with_data("unauthorized", message.sender_id.clone()),
                );
                return;
            }
        }

        // Connection announcement: the peer is already registered at
        // upgrade time, so nothing to do.
        if message.is_connect() {
            tracing::debug!(%peer_id, "Connect announcement");
            return;
        }

        // Validated non-connect messages always carry a receiver id.
        let receiver_id = message.receiver_id.as_deref().unwrap_or_default();
        let Some(receiver) = self.registry().get(receiver_id) else {
            tracing::debug!(%peer_id, receiver_id, "Unknown receiver peer");
            reply_to(
                conn,
                Reply::with_data("unknown-receiver", receiver_id.to_string()),
            );
            return;
        };

        match receiver.try_deliver(Arc::new(Reply::relay(&message))) {
            Ok(()) => {
                tracing::info!(
                    from = %peer_id,
                    to = %receiver_id,
                    kind = %message.kind,
                    "Relayed signal"
                );
            }
            Err(err) => {
                // Best-effort, at-most-once: the message is dropped here.
                tracing::warn!(
                    from = %peer_id,
                    to = %receiver_id,
                    reason = ?err,
                    "Delivery failure, message dropped"
                );
            }
        }
    }
}

fn reply_to(conn: &PeerConnection, reply: Reply) {
    if let Err(err) = conn.try_deliver(Arc::new(reply)) {
        tracing::warn!(peer_id = %conn.identity.id, reason = ?err, "Failed to enqueue reply");
    }
}
