use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::time::Duration;

use crate::auth::{IdentityVerifier, DEFAULT_EXPIRY_WINDOW_SECS};
use crate::protocol::Reply;

mod events;
mod registry;
mod router;

pub use events::ServerEvent;
pub use registry::{DeliveryError, PeerConnection, PeerIdentity, Registry};

/// Runtime configuration for the signal server core.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Maximum permitted age of a signed handshake timestamp.
    pub expiry_window: Duration,
    /// Inbound text frames larger than this are rejected before parsing.
    pub max_message_size: usize,
    /// Capacity of each connection's outbound queue.
    pub outbound_queue_size: usize,
    /// Capacity of the lifecycle event broadcast channel.
    pub event_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            expiry_window: Duration::from_secs(DEFAULT_EXPIRY_WINDOW_SECS),
            max_message_size: 65536, // 64KB
            outbound_queue_size: 64,
            event_buffer_size: 100,
        }
    }
}

/// The signal server core: identity verification, connection registry and
/// message routing, composed behind one `Arc` shared by every socket task.
pub struct SignalServer {
    registry: Registry,
    verifier: IdentityVerifier,
    config: ServerConfig,
    events: broadcast::Sender<ServerEvent>,
}

impl SignalServer {
    #[must_use]
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let (events, _) = broadcast::channel(config.event_buffer_size.max(1));
        let verifier = IdentityVerifier::new(config.expiry_window);
        Arc::new(Self {
            registry: Registry::new(),
            verifier,
            config,
            events,
        })
    }

    /// Subscribe to lifecycle events (peer-added, peer-removed, connection
    /// errors). Dropping the receiver is always safe; emission never blocks.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn verifier(&self) -> &IdentityVerifier {
        &self.verifier
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register a freshly authenticated connection.
    ///
    /// A peer re-authenticating while already connected evicts its prior
    /// connection: the registry entry is swapped and the old connection's
    /// close signal fires so its socket tasks tear down.
    pub fn register_peer(
        &self,
        identity: PeerIdentity,
        addr: SocketAddr,
        outbound: mpsc::Sender<Arc<Reply>>,
    ) -> Arc<PeerConnection> {
        let conn = Arc::new(PeerConnection::new(identity, addr, outbound));
        let peer_id = conn.identity.id.clone();

        if let Some(prior) = self.registry.add(conn.clone()) {
            tracing::info!(%peer_id, "Peer re-authenticated, evicting prior connection");
            prior.close();
        }

        tracing::info!(%peer_id, client_addr = %addr, "Peer registered");
        self.emit(ServerEvent::PeerAdded(peer_id));
        conn
    }

    /// Deregister a connection on transport close or error.
    ///
    /// Called synchronously from the socket teardown path before the close
    /// completes, so routing never observes a stale-but-registered dead
    /// connection. Identity-aware removal: an evicted connection cannot
    /// deregister the entry that replaced it.
    pub fn unregister_peer(&self, conn: &Arc<PeerConnection>) {
        if self.registry.remove_connection(conn).is_some() {
            let peer_id = conn.identity.id.clone();
            tracing::info!(%peer_id, "Peer removed");
            self.emit(ServerEvent::PeerRemoved(peer_id));
        }
    }

    /// Raise a transport-level failure to subscribers. Local to the one
    /// connection, never fatal to the process.
    pub fn report_connection_error(&self, conn: &PeerConnection, message: String) {
        tracing::warn!(peer_id = %conn.identity.id, error = %message, "Connection error");
        self.emit(ServerEvent::ConnectionError {
            peer_id: conn.identity.id.clone(),
            message,
        });
    }

    fn emit(&self, event: ServerEvent) {
        // Err means no live subscribers, which is fine.
        let _ = self.events.send(event);
    }
}
