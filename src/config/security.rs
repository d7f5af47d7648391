//! Security and handshake configuration types.

use super::defaults::{
    default_cors_origins, default_expiry_window_secs, default_max_message_size,
};
use serde::{Deserialize, Serialize};

/// Security settings for the authentication handshake and the wire protocol.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SecurityConfig {
    /// Maximum permitted age of a signed handshake timestamp (seconds).
    /// Proofs older than this window are rejected as replays.
    #[serde(default = "default_expiry_window_secs")]
    pub expiry_window_secs: u64,
    /// Maximum inbound text frame size (bytes).
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    /// Comma-separated CORS origins, or "*" for permissive.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            expiry_window_secs: default_expiry_window_secs(),
            max_message_size: default_max_message_size(),
            cors_origins: default_cors_origins(),
        }
    }
}
