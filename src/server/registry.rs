use std::net::SocketAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::auth::PeerId;
use crate::protocol::Reply;

/// Identity bound to a connection at handshake time. Immutable for the
/// connection's life.
#[derive(Debug, Clone)]
pub struct PeerIdentity {
    /// Public-key fingerprint, the registry key.
    pub id: PeerId,
    /// The armored public key exactly as presented during the handshake.
    pub public_key: String,
}

/// A live peer connection: identity plus the outbound send capability.
///
/// Constructed once at registration and never mutated; forwarding only reads
/// it. The cancellation token is the close signal observed by the socket
/// tasks, fired either by the transport closing or by eviction.
#[derive(Debug)]
pub struct PeerConnection {
    pub identity: PeerIdentity,
    pub addr: SocketAddr,
    pub connected_at: DateTime<Utc>,
    outbound: mpsc::Sender<Arc<Reply>>,
    closed: CancellationToken,
}

/// Why a non-blocking delivery attempt did not enqueue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryError {
    /// Receiver's outbound queue is full (slow peer).
    QueueFull,
    /// Receiver's send path has shut down.
    Closed,
}

impl PeerConnection {
    #[must_use]
    pub fn new(
        identity: PeerIdentity,
        addr: SocketAddr,
        outbound: mpsc::Sender<Arc<Reply>>,
    ) -> Self {
        Self {
            identity,
            addr,
            connected_at: Utc::now(),
            outbound,
            closed: CancellationToken::new(),
        }
    }

    /// Single best-effort enqueue onto this connection's outbound path.
    /// Never blocks and never retries.
    pub fn try_deliver(&self, reply: Arc<Reply>) -> Result<(), DeliveryError> {
        self.outbound.try_send(reply).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => DeliveryError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    /// Signal the owning socket tasks to shut down (used for eviction).
    pub fn close(&self) {
        self.closed.cancel();
    }

    /// Close signal observed by the connection's socket tasks.
    #[must_use]
    pub fn closed(&self) -> &CancellationToken {
        &self.closed
    }
}

/// In-memory map from peer id to its live connection.
///
/// The only state shared across connection tasks. DashMap serializes
/// mutations, so concurrent add/remove/get from independent connections
/// observe a single consistent ordering.
#[derive(Debug, Default)]
pub struct Registry {
    peers: DashMap<PeerId, Arc<PeerConnection>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; returns the prior connection on overwrite so the
    /// caller can apply its eviction policy.
    pub fn add(&self, conn: Arc<PeerConnection>) -> Option<Arc<PeerConnection>> {
        self.peers.insert(conn.identity.id.clone(), conn)
    }

    /// Remove `peer_id` only if the registry still holds this exact
    /// connection. Keeps an evicted connection's teardown from deregistering
    /// the entry that replaced it.
    pub fn remove_connection(&self, conn: &Arc<PeerConnection>) -> Option<Arc<PeerConnection>> {
        self.peers
            .remove_if(&conn.identity.id, |_, current| Arc::ptr_eq(current, conn))
            .map(|(_, removed)| removed)
    }

    /// Remove whatever connection is registered under `peer_id`. No-op if absent.
    pub fn remove(&self, peer_id: &str) -> Option<Arc<PeerConnection>> {
        self.peers.remove(peer_id).map(|(_, conn)| conn)
    }

    #[must_use]
    pub fn get(&self, peer_id: &str) -> Option<Arc<PeerConnection>> {
        self.peers.get(peer_id).map(|entry| entry.value().clone())
    }

    #[must_use]
    pub fn is_connected(&self, peer_id: &str) -> bool {
        self.peers.contains_key(peer_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
