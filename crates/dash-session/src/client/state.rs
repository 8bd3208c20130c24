//! Connection state and status events

use serde::{Deserialize, Serialize};

/// Connection lifecycle state
///
/// Driven solely by the transport session and the reconnection policy;
/// exactly one physical connection is live at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No connection requested yet
    Idle,
    /// An open attempt is in flight
    Connecting,
    /// The channel is ready; sends are accepted
    Open,
    /// Waiting out the backoff delay before the next attempt
    Reconnecting,
    /// Intentionally closed; terminal until a fresh `connect()`
    Closed,
    /// Retries exhausted; terminal until a fresh `connect()`
    Failed,
}

impl ConnectionState {
    /// Check if sends are currently accepted
    #[inline]
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Check if this is a resting state a fresh `connect()` may leave
    #[inline]
    #[must_use]
    pub fn can_connect(&self) -> bool {
        matches!(self, Self::Idle | Self::Closed | Self::Failed)
    }

    /// Check if no further transitions happen without a caller action
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Reconnecting => "reconnecting",
            Self::Closed => "closed",
            Self::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Status event published through the dispatcher on every transition
///
/// The sequence number increases monotonically per client so consumers can
/// detect out-of-order delivery (which single-threaded dispatch rules out).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusEvent {
    pub state: ConnectionState,
    pub seq: u64,
}
