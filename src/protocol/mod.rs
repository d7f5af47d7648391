// Protocol module: wire message types and validation

pub mod messages;

pub use messages::{MessageError, Reply, SignalMessage, TYPE_CONNECT, TYPE_SIGNAL};
