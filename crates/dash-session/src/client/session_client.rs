//! Public session client handle
//!
//! Cheaply cloneable; every call site gets an explicit handle instead of a
//! process-wide singleton. Dropping the last handle stops the background
//! state machine and releases the channel.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot, watch};

use dash_common::AppConfig;
use dash_core::SessionId;

use crate::backoff::ReconnectPolicy;
use crate::client::actor::{Command, SessionActor};
use crate::client::state::{ConnectionState, StatusEvent};
use crate::dispatch::{EventDispatcher, HandlerId};
use crate::error::{SessionError, SessionResult};
use crate::protocol::ServerEvent;
use crate::transport::{Connector, WsConnector};

/// Buffer size for pending commands
const COMMAND_BUFFER_SIZE: usize = 32;

/// Buffer size for transport signals
const SIGNAL_BUFFER_SIZE: usize = 64;

/// Session client configuration
#[derive(Debug, Clone)]
pub struct SessionOptions {
    ws_url: String,
    policy: ReconnectPolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:8000".to_string(),
            policy: ReconnectPolicy::default(),
        }
    }
}

impl SessionOptions {
    /// Create options for the given WebSocket origin
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            ..Self::default()
        }
    }

    /// Override the reconnection policy
    #[must_use]
    pub fn with_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build options from the application configuration
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            ws_url: config.gateway.ws_url.clone(),
            policy: ReconnectPolicy::new(
                Duration::from_millis(config.session.base_delay_ms),
                Duration::from_millis(config.session.cap_delay_ms),
                config.session.max_attempts,
            ),
        }
    }

    /// The configured reconnection policy
    #[must_use]
    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Connection endpoint for a session identity
    #[must_use]
    pub fn session_url(&self, identity: &SessionId) -> String {
        format!("{}/ws/{}", self.ws_url.trim_end_matches('/'), identity)
    }
}

/// Public-facing session client
///
/// Must be created inside a tokio runtime; the state machine runs as a
/// background task owned by this handle.
#[derive(Clone)]
pub struct SessionClient {
    commands: mpsc::Sender<Command>,
    state_rx: watch::Receiver<ConnectionState>,
    dispatcher: Arc<EventDispatcher>,
    identity: Arc<RwLock<Option<SessionId>>>,
}

impl SessionClient {
    /// Create a client over the production WebSocket transport
    #[must_use]
    pub fn new(options: SessionOptions) -> Self {
        Self::with_connector(options, Arc::new(WsConnector::new()))
    }

    /// Create a client over a custom transport (tests, alternate stacks)
    #[must_use]
    pub fn with_connector(options: SessionOptions, connector: Arc<dyn Connector>) -> Self {
        let dispatcher = Arc::new(EventDispatcher::new());
        let identity = Arc::new(RwLock::new(None));
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER_SIZE);
        let (signal_tx, signal_rx) = mpsc::channel(SIGNAL_BUFFER_SIZE);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Idle);

        let actor = SessionActor::new(
            options,
            connector,
            Arc::clone(&dispatcher),
            state_tx,
            Arc::clone(&identity),
            command_rx,
            signal_tx,
            signal_rx,
        );
        tokio::spawn(actor.run());

        Self {
            commands: command_tx,
            state_rx,
            dispatcher,
            identity,
        }
    }

    /// Start connecting, generating a session identity if none is active
    ///
    /// No-op (returning the current state) while already connecting or
    /// open. Returns the state after the command was processed.
    pub async fn connect(&self) -> SessionResult<ConnectionState> {
        self.connect_inner(None).await
    }

    /// Start connecting under a caller-supplied identity
    pub async fn connect_with(&self, identity: SessionId) -> SessionResult<ConnectionState> {
        self.connect_inner(Some(identity)).await
    }

    async fn connect_inner(&self, identity: Option<SessionId>) -> SessionResult<ConnectionState> {
        let (ack, response) = oneshot::channel();
        self.commands
            .send(Command::Connect { identity, ack })
            .await
            .map_err(|_| SessionError::Terminated)?;
        response.await.map_err(|_| SessionError::Terminated)
    }

    /// Send a chat message, optionally scoped to a project
    ///
    /// Fails with `NotConnected` unless the session is open. Accepted
    /// sends are fire-and-forget: delivery is at-most-once and nothing is
    /// buffered across reconnects.
    pub async fn send(
        &self,
        message: impl Into<String>,
        project_id: Option<String>,
    ) -> SessionResult<()> {
        let (ack, response) = oneshot::channel();
        self.commands
            .send(Command::Send {
                message: message.into(),
                project_id,
                ack,
            })
            .await
            .map_err(|_| SessionError::Terminated)?;
        response.await.map_err(|_| SessionError::Terminated)?
    }

    /// Close the session and suppress any further reconnection
    ///
    /// Idempotent; completes once the client has settled in `Closed`.
    pub async fn disconnect(&self) {
        let (ack, response) = oneshot::channel();
        if self
            .commands
            .send(Command::Disconnect { ack })
            .await
            .is_ok()
        {
            let _ = response.await;
        }
    }

    /// Current connection state
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Check if the session is currently open
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_open()
    }

    /// Watch channel tracking every state change
    #[must_use]
    pub fn state_watch(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Identity of the active logical session, if any
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.identity.read().clone()
    }

    /// The dispatcher delivering this client's events
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }

    /// Subscribe to chat/domain events
    pub fn on_message(
        &self,
        handler: impl Fn(&ServerEvent) + Send + Sync + 'static,
    ) -> HandlerId {
        self.dispatcher.on_message(handler)
    }

    /// Subscribe to state transitions
    pub fn on_status(
        &self,
        handler: impl Fn(&StatusEvent) + Send + Sync + 'static,
    ) -> HandlerId {
        self.dispatcher.on_status(handler)
    }

    /// Subscribe to surfaced failures
    pub fn on_error(
        &self,
        handler: impl Fn(&SessionError) + Send + Sync + 'static,
    ) -> HandlerId {
        self.dispatcher.on_error(handler)
    }

    /// Remove a previously registered handler
    pub fn unsubscribe(&self, handler: HandlerId) -> bool {
        self.dispatcher.remove(handler)
    }
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("state", &self.state())
            .field("session_id", &self.session_id())
            .finish()
    }
}
