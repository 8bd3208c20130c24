//! Session error types
//!
//! Only `NotConnected` is ever returned across the call boundary; every
//! other failure travels the status/error event stream.

/// Error type for session operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Send attempted while the session is not open. Recoverable by the
    /// caller (retry after reconnect or surface to the user).
    #[error("not connected")]
    NotConnected,

    /// An inbound payload failed to parse. The frame is dropped and the
    /// connection stays open.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Channel-level failure. Feeds the reconnection policy; never fatal
    /// on its own.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server reported an error over the wire.
    #[error("server error: {0}")]
    Server(String),

    /// All reconnect attempts failed. Terminal until an explicit
    /// re-`connect()`.
    #[error("reconnect attempts exhausted after {attempts} tries")]
    RetriesExhausted { attempts: u32 },

    /// The session client's background task is gone (its handle was
    /// dropped or the runtime shut down).
    #[error("session client terminated")]
    Terminated,
}

impl SessionError {
    /// Check if the error marks the end of automatic recovery
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. } | Self::Terminated)
    }
}

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;
