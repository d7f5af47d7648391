//! Server behavior configuration types.

use super::defaults::{default_event_buffer_size, default_outbound_queue_size};
use serde::{Deserialize, Serialize};

/// Queue sizing for the connection and event plumbing.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// Capacity of each connection's outbound message queue.
    /// Forwarding to a peer whose queue is full drops the message.
    #[serde(default = "default_outbound_queue_size")]
    pub outbound_queue_size: usize,
    /// Capacity of the lifecycle event broadcast channel.
    #[serde(default = "default_event_buffer_size")]
    pub event_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            outbound_queue_size: default_outbound_queue_size(),
            event_buffer_size: default_event_buffer_size(),
        }
    }
}
