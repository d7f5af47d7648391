use crate::auth::PeerId;

/// Lifecycle and error notifications raised to the surrounding process.
///
/// Replaces the event-emitter inheritance of earlier designs with a typed
/// broadcast: collaborators subscribe for presence tracking and diagnostics,
/// and the core never blocks on (or fails because of) slow or absent
/// subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// A peer completed the handshake and was registered.
    PeerAdded(PeerId),
    /// A peer's connection closed and was deregistered.
    PeerRemoved(PeerId),
    /// A transport-level failure on one connection. Never fatal to the process.
    ConnectionError { peer_id: PeerId, message: String },
}
