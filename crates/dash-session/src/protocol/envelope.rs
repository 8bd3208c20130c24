//! Outbound wire envelope

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outbound message envelope (JSON text frame)
///
/// Constructed by the client and never mutated after send:
/// `{ "message": ..., "project_id": ..., "timestamp": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEnvelope {
    pub message: String,
    pub project_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl OutboundEnvelope {
    /// Create an envelope stamped with the current time
    pub fn new(message: impl Into<String>, project_id: Option<String>) -> Self {
        Self {
            message: message.into(),
            project_id,
            timestamp: Utc::now(),
        }
    }

    /// Serialize to a JSON text frame
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
