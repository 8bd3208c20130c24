//! Reconnection policy
//!
//! Pure decision functions: given an attempt count, whether to retry and
//! after what delay. Independent of the transport.

use std::time::Duration;

/// Exponential backoff with a delay cap and a bounded attempt count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    base_delay: Duration,
    cap_delay: Duration,
    max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            cap_delay: Duration::from_secs(10),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Create a policy with explicit parameters
    #[must_use]
    pub fn new(base_delay: Duration, cap_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            cap_delay,
            max_attempts,
        }
    }

    /// Delay before the given reconnect attempt (1-based):
    /// `min(base_delay * 2^attempt, cap_delay)`
    ///
    /// Saturates at `cap_delay` for large attempt numbers instead of
    /// overflowing.
    #[must_use]
    pub fn next_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.cap_delay)
            .min(self.cap_delay)
    }

    /// Whether the given attempt (1-based) should still be made
    #[must_use]
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt <= self.max_attempts
    }

    /// Base delay before scaling
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Upper bound on any single delay
    #[must_use]
    pub fn cap_delay(&self) -> Duration {
        self.cap_delay
    }

    /// Maximum number of consecutive attempts
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}
