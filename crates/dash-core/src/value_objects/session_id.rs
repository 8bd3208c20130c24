//! Session identity - opaque token naming one logical conversation
//!
//! The identity is embedded in the connection URL as a path segment and
//! stays stable across reconnect attempts for the same logical session.

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Alphabet used for generated identities (base-36).
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Number of characters in a generated identity.
const GENERATED_LEN: usize = 12;

/// Opaque session identity, safe to use as a URL path segment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a session identity from a caller-supplied token
    ///
    /// The token must be non-empty and consist of ASCII alphanumerics,
    /// `_` or `-` (it is interpolated into the connection URL unescaped).
    pub fn new(token: impl Into<String>) -> Result<Self, SessionIdError> {
        let token = token.into();

        if token.is_empty() {
            return Err(SessionIdError::Empty);
        }

        if let Some(c) = token
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != '-')
        {
            return Err(SessionIdError::InvalidCharacter(c));
        }

        Ok(Self(token))
    }

    /// Generate a fresh random identity (base-36 string)
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let token: String = (0..GENERATED_LEN)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect();

        Self(token)
    }

    /// Get the identity as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = SessionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionId::new(s)
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        SessionId::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Error when constructing a session identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionIdError {
    #[error("session identity must not be empty")]
    Empty,

    #[error("session identity contains invalid character: {0:?}")]
    InvalidCharacter(char),
}
