use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Announcement sent by a freshly connected peer; carries no routing request.
pub const TYPE_CONNECT: &str = "connect";
/// Connection-negotiation payload relayed between a pair of peers.
pub const TYPE_SIGNAL: &str = "signal";

/// A signaling message as received on the wire.
///
/// The `type` value is an open set: `connect` and `signal` carry reserved
/// semantics, everything else is forwarded transparently under its own event
/// name. Type-specific payload fields are captured by the flattened map and
/// survive re-serialization verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub sender_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_public_key: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Why an inbound frame was rejected before routing.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("frame failed schema validation: {0}")]
    SchemaViolation(&'static str),
}

impl MessageError {
    /// Event name for the structured reply sent back to the offending peer.
    #[must_use]
    pub const fn reply_event(&self) -> &'static str {
        match self {
            Self::InvalidJson(_) => "invalid-json",
            Self::SchemaViolation(_) => "invalid-message",
        }
    }
}

impl SignalMessage {
    /// Parse and schema-check a raw text frame.
    ///
    /// Unparsable JSON and schema failures are distinguished so the reply
    /// envelope can name the right event (`invalid-json` vs `invalid-message`).
    pub fn parse(raw: &str) -> Result<Self, MessageError> {
        let value: Value = serde_json::from_str(raw).map_err(MessageError::InvalidJson)?;
        let message: Self = serde_json::from_value(value)
            .map_err(|_| MessageError::SchemaViolation("missing or mistyped required field"))?;

        if message.kind.trim().is_empty() {
            return Err(MessageError::SchemaViolation(
                "type must be a non-empty string",
            ));
        }
        if message.sender_id.is_empty() {
            return Err(MessageError::SchemaViolation("senderId must be non-empty"));
        }
        if message.kind != TYPE_CONNECT && message.receiver_id.as_deref().is_none_or(str::is_empty)
        {
            return Err(MessageError::SchemaViolation(
                "receiverId is required for non-connect messages",
            ));
        }

        Ok(message)
    }

    /// Whether this is a no-op connection announcement.
    #[must_use]
    pub fn is_connect(&self) -> bool {
        self.kind == TYPE_CONNECT
    }
}

/// Server -> peer reply envelope.
///
/// Every frame the server originates has this shape; on a successful relay
/// the event name equals the inbound message `type` and `data` carries the
/// original message verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Reply {
    #[must_use]
    pub fn event(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: None,
        }
    }

    #[must_use]
    pub fn with_data(event: impl Into<String>, data: impl Into<Value>) -> Self {
        Self {
            event: event.into(),
            data: Some(data.into()),
        }
    }

    /// Relay envelope for a validated message: event named after the message
    /// type, the whole message as data.
    #[must_use]
    pub fn relay(message: &SignalMessage) -> Self {
        let data = serde_json::to_value(message).unwrap_or(Value::Null);
        Self {
            event: message.kind.clone(),
            data: Some(data),
        }
    }
}
