//! Inbound frames and their typed event mapping
//!
//! The gateway sends JSON text frames of the shape
//! `{ "type": ..., "data"?: ..., "message"?: ..., "response"?: ... }`.
//! Unknown `type` values are accepted and surfaced as a generic event to
//! keep forward compatibility with new server-emitted kinds.

use serde::Deserialize;
use serde_json::Value;

/// Raw inbound wire envelope
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    /// Assistant text on chat `message` frames
    #[serde(default)]
    pub response: Option<String>,
}

impl InboundFrame {
    /// Parse a raw text frame
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Map the frame onto the dispatch model: wire `error` frames route to
    /// error handlers, everything else to message handlers.
    #[must_use]
    pub fn classify(self) -> InboundEvent {
        match self.kind.as_str() {
            "error" => InboundEvent::Error {
                message: self
                    .message
                    .or(self.response)
                    .unwrap_or_else(|| "unspecified server error".to_string()),
            },
            "connected" => InboundEvent::Server(ServerEvent::Connected {
                message: self.message,
            }),
            "started" => InboundEvent::Server(ServerEvent::Started { data: self.data }),
            "progress" => InboundEvent::Server(ServerEvent::Progress { data: self.data }),
            "completed" => InboundEvent::Server(ServerEvent::Completed { data: self.data }),
            "message" => InboundEvent::Server(ServerEvent::Message {
                response: self.response.or(self.message).unwrap_or_default(),
                data: self.data,
            }),
            _ => InboundEvent::Server(ServerEvent::Unknown {
                kind: self.kind,
                data: self.data,
                message: self.message,
            }),
        }
    }
}

/// A classified inbound frame
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Delivered to message subscribers
    Server(ServerEvent),
    /// Delivered to error subscribers
    Error { message: String },
}

/// Typed inbound event delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Greeting sent by the gateway right after the handshake
    Connected { message: Option<String> },
    /// The agent started working on a request
    Started { data: Option<Value> },
    /// Incremental progress on a running request
    Progress { data: Option<Value> },
    /// A running request finished
    Completed { data: Option<Value> },
    /// Chat response from the agent
    Message {
        response: String,
        data: Option<Value>,
    },
    /// Server-emitted kind this client does not know about
    Unknown {
        kind: String,
        data: Option<Value>,
        message: Option<String>,
    },
}

impl ServerEvent {
    /// Wire name of this event's kind
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Started { .. } => "started",
            Self::Progress { .. } => "progress",
            Self::Completed { .. } => "completed",
            Self::Message { .. } => "message",
            Self::Unknown { kind, .. } => kind,
        }
    }
}
