//! Conversation log
//!
//! Consumer-side ordered log of exchanged messages, built purely from
//! dispatched events. Not part of the transport; it outlives individual
//! physical connections just like any other subscription.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::dispatch::{EventDispatcher, HandlerId};
use crate::protocol::ServerEvent;

/// Who produced an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One message in the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEntry {
    pub id: u64,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Default)]
struct ConversationInner {
    next_id: u64,
    entries: Vec<ConversationEntry>,
}

/// Ordered log of exchanged messages
///
/// Cheaply cloneable handle; all clones share the same log.
#[derive(Clone, Default)]
pub struct Conversation {
    inner: Arc<Mutex<ConversationInner>>,
}

impl Conversation {
    /// Create an empty conversation
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe this log to a dispatcher's message stream
    ///
    /// Appends an Assistant entry for every chat message event. Other
    /// event kinds (status, progress, ...) are not part of the transcript.
    pub fn attach(&self, dispatcher: &EventDispatcher) -> HandlerId {
        let log = self.clone();
        dispatcher.on_message(move |event| {
            if let ServerEvent::Message { response, .. } = event {
                log.push(Role::Assistant, response.clone());
            }
        })
    }

    /// Record the local user's side of the exchange
    pub fn record_user(&self, content: impl Into<String>) -> ConversationEntry {
        self.push(Role::User, content.into())
    }

    fn push(&self, role: Role, content: String) -> ConversationEntry {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let entry = ConversationEntry {
            id: inner.next_id,
            role,
            content,
            timestamp: Utc::now(),
        };
        inner.entries.push(entry.clone());
        entry
    }

    /// Snapshot of all entries in arrival order
    #[must_use]
    pub fn entries(&self) -> Vec<ConversationEntry> {
        self.inner.lock().entries.clone()
    }

    /// The most recent entry, if any
    #[must_use]
    pub fn last(&self) -> Option<ConversationEntry> {
        self.inner.lock().entries.last().cloned()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Check if the log is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Drop all entries; entry ids keep counting upward
    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }
}

impl std::fmt::Debug for Conversation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Conversation")
            .field("entries", &self.len())
            .finish()
    }
}
