//! Connector and frame sink traits
//!
//! The seam between the session state machine and the physical channel.
//! Production uses the WebSocket connector; tests substitute scripted ones.

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Error type for transport operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("send failed: {0}")]
    Send(String),

    #[error("not connected")]
    NotConnected,
}

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Why a physical channel went away
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseReason {
    /// Clean close (close frame or end of stream)
    Closed,
    /// Channel-level failure
    Error(String),
}

/// Raw event emitted by a channel's read half
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One discrete text frame, in arrival order
    Frame(String),
    /// Terminal: the channel is gone; nothing follows
    Closed(CloseReason),
}

/// Write half of an open channel
#[async_trait]
pub trait FrameSink: Send {
    /// Send one text frame, fire-and-forget
    async fn send(&mut self, text: &str) -> TransportResult<()>;

    /// Release the channel; safe to call multiple times
    async fn close(&mut self);
}

/// Opens physical channels
#[async_trait]
pub trait Connector: Send + Sync {
    /// Establish a channel, resolving once it reports ready.
    ///
    /// The returned receiver yields frames in arrival order and is
    /// terminated by exactly one `Closed` event.
    async fn connect(
        &self,
        url: &str,
    ) -> TransportResult<(Box<dyn FrameSink>, mpsc::Receiver<TransportEvent>)>;
}
