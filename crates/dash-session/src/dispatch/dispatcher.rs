//! Event dispatcher
//!
//! Fan-out registry delivering one inbound event to zero or more
//! subscribers. Handlers run synchronously in registration order; a failing
//! handler never prevents the rest of the same publish call from running.

use parking_lot::Mutex;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::client::StatusEvent;
use crate::error::SessionError;
use crate::protocol::ServerEvent;

/// Handler invoked for chat/domain events
pub type MessageHandler = Arc<dyn Fn(&ServerEvent) + Send + Sync>;
/// Handler invoked on every state transition
pub type StatusHandler = Arc<dyn Fn(&StatusEvent) + Send + Sync>;
/// Handler invoked for surfaced failures
pub type ErrorHandler = Arc<dyn Fn(&SessionError) + Send + Sync>;

/// Which handler list a subscription belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Message,
    Status,
    Error,
}

/// Opaque handle naming one registered handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId {
    kind: HandlerKind,
    id: u64,
}

impl HandlerId {
    /// The handler list this subscription belongs to
    #[must_use]
    pub fn kind(&self) -> HandlerKind {
        self.kind
    }
}

#[derive(Default)]
struct Registry {
    message: Vec<(u64, MessageHandler)>,
    status: Vec<(u64, StatusHandler)>,
    error: Vec<(u64, ErrorHandler)>,
}

/// Publish/subscribe fan-out for inbound session events
#[derive(Default)]
pub struct EventDispatcher {
    registry: Mutex<Registry>,
    next_id: AtomicU64,
}

impl EventDispatcher {
    /// Create an empty dispatcher
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Register a handler for chat/domain events
    pub fn on_message(
        &self,
        handler: impl Fn(&ServerEvent) + Send + Sync + 'static,
    ) -> HandlerId {
        let id = self.next_id();
        self.registry.lock().message.push((id, Arc::new(handler)));
        HandlerId {
            kind: HandlerKind::Message,
            id,
        }
    }

    /// Register a handler for state transitions
    pub fn on_status(
        &self,
        handler: impl Fn(&StatusEvent) + Send + Sync + 'static,
    ) -> HandlerId {
        let id = self.next_id();
        self.registry.lock().status.push((id, Arc::new(handler)));
        HandlerId {
            kind: HandlerKind::Status,
            id,
        }
    }

    /// Register a handler for surfaced failures
    pub fn on_error(
        &self,
        handler: impl Fn(&SessionError) + Send + Sync + 'static,
    ) -> HandlerId {
        let id = self.next_id();
        self.registry.lock().error.push((id, Arc::new(handler)));
        HandlerId {
            kind: HandlerKind::Error,
            id,
        }
    }

    /// Remove a handler so it receives no further events
    ///
    /// Safe to call from within a handler during dispatch; the event
    /// currently being delivered was snapshotted and is not re-delivered.
    pub fn remove(&self, handler: HandlerId) -> bool {
        let mut registry = self.registry.lock();
        let removed = match handler.kind {
            HandlerKind::Message => remove_entry(&mut registry.message, handler.id),
            HandlerKind::Status => remove_entry(&mut registry.status, handler.id),
            HandlerKind::Error => remove_entry(&mut registry.error, handler.id),
        };

        if !removed {
            tracing::debug!(?handler, "remove for unknown handler ignored");
        }

        removed
    }

    /// Number of handlers currently registered for a kind
    #[must_use]
    pub fn handler_count(&self, kind: HandlerKind) -> usize {
        let registry = self.registry.lock();
        match kind {
            HandlerKind::Message => registry.message.len(),
            HandlerKind::Status => registry.status.len(),
            HandlerKind::Error => registry.error.len(),
        }
    }

    /// Deliver a chat/domain event to all message handlers
    pub fn publish_message(&self, event: &ServerEvent) {
        let handlers: Vec<MessageHandler> = {
            let registry = self.registry.lock();
            registry.message.iter().map(|(_, h)| Arc::clone(h)).collect()
        };
        invoke_all(&handlers, event, "message");
    }

    /// Deliver a status event to all status handlers
    pub fn publish_status(&self, event: &StatusEvent) {
        let handlers: Vec<StatusHandler> = {
            let registry = self.registry.lock();
            registry.status.iter().map(|(_, h)| Arc::clone(h)).collect()
        };
        invoke_all(&handlers, event, "status");
    }

    /// Deliver a failure to all error handlers
    pub fn publish_error(&self, error: &SessionError) {
        let handlers: Vec<ErrorHandler> = {
            let registry = self.registry.lock();
            registry.error.iter().map(|(_, h)| Arc::clone(h)).collect()
        };
        invoke_all(&handlers, error, "error");
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.lock();
        f.debug_struct("EventDispatcher")
            .field("message_handlers", &registry.message.len())
            .field("status_handlers", &registry.status.len())
            .field("error_handlers", &registry.error.len())
            .finish()
    }
}

fn remove_entry<H>(entries: &mut Vec<(u64, H)>, id: u64) -> bool {
    let before = entries.len();
    entries.retain(|(entry_id, _)| *entry_id != id);
    entries.len() != before
}

/// Invoke a snapshot of handlers in registration order, isolating panics
fn invoke_all<T>(handlers: &[Arc<dyn Fn(&T) + Send + Sync>], event: &T, channel: &str) {
    for handler in handlers {
        if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
            tracing::error!(
                channel = channel,
                "event handler panicked; continuing with remaining handlers"
            );
        }
    }
}
