#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

//! # Signal Relay Server
//!
//! An authenticated, in-memory WebSocket signaling relay for establishing
//! direct peer-to-peer encrypted channels.
//!
//! Peers authenticate at upgrade time with an Ed25519 signature over a fresh
//! timestamp; their public-key fingerprint becomes their stable identity, and
//! the server relays connection-negotiation payloads between registered pairs.
//! No persistence, no delivery guarantee beyond one best-effort forward.

/// Upgrade-time authentication (signature verification, peer identity)
pub mod auth;

/// Server configuration and environment variables
pub mod config;

/// Structured logging configuration
pub mod logging;

/// Wire message protocol definitions and validation
pub mod protocol;

/// Core server: registry, routing and lifecycle events
pub mod server;

/// WebSocket connection handling
pub mod websocket;
