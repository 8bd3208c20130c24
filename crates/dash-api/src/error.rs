//! API error types

use serde::Deserialize;

/// Error type for REST operations
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connection, timeout, TLS, ...)
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("{detail} (HTTP {status})")]
    Api { status: u16, detail: String },
}

impl ApiError {
    /// HTTP status of a server-reported failure
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
        }
    }

    /// Check if the server reported 404 for the addressed resource
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Result type alias for REST operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Error body shape the backend uses: `{"detail": "..."}`
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}
