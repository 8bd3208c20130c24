//! Session actor
//!
//! Single-task state machine: commands, transport signals, and the
//! reconnect timer all land in one `select!` loop, so no two transitions
//! ever interleave.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{sleep_until, Instant};

use dash_core::SessionId;

use crate::client::session_client::SessionOptions;
use crate::client::state::{ConnectionState, StatusEvent};
use crate::dispatch::EventDispatcher;
use crate::error::{SessionError, SessionResult};
use crate::protocol::{InboundEvent, InboundFrame, OutboundEnvelope};
use crate::transport::{CloseReason, Connector, Signal, TransportSession};

/// Commands accepted by the actor
#[derive(Debug)]
pub(crate) enum Command {
    Connect {
        identity: Option<SessionId>,
        ack: oneshot::Sender<ConnectionState>,
    },
    Send {
        message: String,
        project_id: Option<String>,
        ack: oneshot::Sender<SessionResult<()>>,
    },
    Disconnect {
        ack: oneshot::Sender<()>,
    },
}

/// The state machine behind a `SessionClient`
pub(crate) struct SessionActor {
    options: SessionOptions,
    dispatcher: Arc<EventDispatcher>,
    state_tx: watch::Sender<ConnectionState>,
    shared_identity: Arc<RwLock<Option<SessionId>>>,
    commands: mpsc::Receiver<Command>,
    signals: mpsc::Receiver<Signal>,
    transport: TransportSession,

    state: ConnectionState,
    identity: Option<SessionId>,
    /// Disowns signals from superseded connections
    generation: u64,
    /// Consecutive physical-disconnect episodes; zeroed on every Open
    attempts: u32,
    /// Set by `disconnect()`, cleared only by `connect()`
    intentional_close: bool,
    status_seq: u64,
    /// Pending reconnect timer deadline
    reconnect_at: Option<Instant>,
}

impl SessionActor {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        options: SessionOptions,
        connector: Arc<dyn Connector>,
        dispatcher: Arc<EventDispatcher>,
        state_tx: watch::Sender<ConnectionState>,
        shared_identity: Arc<RwLock<Option<SessionId>>>,
        commands: mpsc::Receiver<Command>,
        signal_tx: mpsc::Sender<Signal>,
        signals: mpsc::Receiver<Signal>,
    ) -> Self {
        Self {
            options,
            dispatcher,
            state_tx,
            shared_identity,
            commands,
            signals,
            transport: TransportSession::new(connector, signal_tx),
            state: ConnectionState::Idle,
            identity: None,
            generation: 0,
            attempts: 0,
            intentional_close: false,
            status_seq: 0,
            reconnect_at: None,
        }
    }

    /// Run until every client handle is dropped
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                Some(signal) = self.signals.recv() => self.handle_signal(signal).await,
                _ = sleep_until(self.reconnect_at.unwrap_or_else(Instant::now)),
                    if self.reconnect_at.is_some() =>
                {
                    self.handle_reconnect_elapsed();
                }
            }
        }

        // Last handle dropped; release the channel
        self.transport.close().await;
        tracing::debug!("session actor stopped");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Connect { identity, ack } => {
                self.handle_connect(identity);
                let _ = ack.send(self.state);
            }
            Command::Send {
                message,
                project_id,
                ack,
            } => {
                let result = self.handle_send(message, project_id).await;
                let _ = ack.send(result);
            }
            Command::Disconnect { ack } => {
                self.handle_disconnect().await;
                let _ = ack.send(());
            }
        }
    }

    fn handle_connect(&mut self, identity: Option<SessionId>) {
        if !self.state.can_connect() {
            tracing::debug!(state = %self.state, "connect requested while already active, ignoring");
            return;
        }

        if let Some(id) = identity {
            self.set_identity(Some(id));
        } else if self.identity.is_none() {
            self.set_identity(Some(SessionId::generate()));
        }

        self.intentional_close = false;
        self.attempts = 0;
        self.reconnect_at = None;
        self.start_open_attempt();
    }

    async fn handle_send(
        &mut self,
        message: String,
        project_id: Option<String>,
    ) -> SessionResult<()> {
        if !self.state.is_open() {
            return Err(SessionError::NotConnected);
        }

        let envelope = OutboundEnvelope::new(message, project_id);
        match envelope.to_json() {
            Ok(json) => {
                // Fire-and-forget: a failed write surfaces on the error
                // stream and the close signal drives recovery
                if let Err(e) = self.transport.send(&json).await {
                    tracing::warn!(error = %e, "failed to write outbound frame");
                    self.dispatcher
                        .publish_error(&SessionError::Transport(e.to_string()));
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize outbound envelope");
            }
        }

        Ok(())
    }

    async fn handle_disconnect(&mut self) {
        tracing::info!("session disconnect requested");

        self.intentional_close = true;
        self.generation += 1;
        self.reconnect_at = None;
        self.attempts = 0;
        self.transport.close().await;
        self.set_identity(None);

        if self.state != ConnectionState::Closed {
            self.transition(ConnectionState::Closed);
        }
    }

    async fn handle_signal(&mut self, signal: Signal) {
        if signal.generation() != self.generation {
            tracing::trace!(
                signal = ?signal,
                current_generation = self.generation,
                "stale transport signal ignored"
            );
            // A stale Opened still carries a live channel; release it
            if let Signal::Opened { mut sink, .. } = signal {
                sink.close().await;
            }
            return;
        }

        match signal {
            Signal::Opened { sink, .. } => {
                self.transport.attach(sink);
                self.attempts = 0;
                self.transition(ConnectionState::Open);
            }
            Signal::OpenFailed { error, .. } => {
                tracing::debug!(error = %error, "open attempt failed");
                self.transport.open_failed();
                self.dispatcher
                    .publish_error(&SessionError::Transport(error.to_string()));
                self.handle_connection_lost();
            }
            Signal::Frame { raw, .. } => self.handle_frame(&raw),
            Signal::Closed { reason, .. } => {
                tracing::debug!(reason = ?reason, "transport closed");
                self.transport.close().await;

                if self.intentional_close {
                    // Explicit disconnect already drove the transition
                    return;
                }

                if let CloseReason::Error(e) = &reason {
                    self.dispatcher
                        .publish_error(&SessionError::Transport(e.clone()));
                }
                self.handle_connection_lost();
            }
        }
    }

    fn handle_frame(&mut self, raw: &str) {
        match InboundFrame::from_json(raw) {
            Ok(frame) => match frame.classify() {
                InboundEvent::Server(event) => self.dispatcher.publish_message(&event),
                InboundEvent::Error { message } => {
                    self.dispatcher.publish_error(&SessionError::Server(message));
                }
            },
            Err(e) => {
                tracing::debug!(error = %e, "dropping malformed frame");
                self.dispatcher
                    .publish_error(&SessionError::MalformedFrame(e.to_string()));
            }
        }
    }

    fn handle_connection_lost(&mut self) {
        self.attempts += 1;

        if self.options.policy().should_retry(self.attempts) {
            let delay = self.options.policy().next_delay(self.attempts);
            tracing::info!(
                attempt = self.attempts,
                delay_ms = delay.as_millis() as u64,
                "scheduling reconnect"
            );
            self.reconnect_at = Some(Instant::now() + delay);
            self.transition(ConnectionState::Reconnecting);
        } else {
            tracing::warn!(attempts = self.attempts, "reconnect attempts exhausted");
            self.reconnect_at = None;
            self.transition(ConnectionState::Failed);
            self.dispatcher.publish_error(&SessionError::RetriesExhausted {
                attempts: self.options.policy().max_attempts(),
            });
        }
    }

    fn handle_reconnect_elapsed(&mut self) {
        self.reconnect_at = None;

        if self.state != ConnectionState::Reconnecting {
            return;
        }

        self.start_open_attempt();
    }

    fn start_open_attempt(&mut self) {
        let Some(identity) = self.identity.clone() else {
            tracing::error!("open attempt without a session identity");
            return;
        };

        self.generation += 1;
        self.transition(ConnectionState::Connecting);
        self.transport
            .begin_open(self.options.session_url(&identity), self.generation);
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state == next {
            return;
        }

        tracing::debug!(from = %self.state, to = %next, "session state transition");
        self.state = next;
        self.status_seq += 1;
        self.dispatcher.publish_status(&StatusEvent {
            state: next,
            seq: self.status_seq,
        });
        // Wake watch observers only after the status event is out, so a
        // task resumed by the state change sees the event already delivered
        self.state_tx.send_replace(next);
    }

    fn set_identity(&mut self, identity: Option<SessionId>) {
        *self.shared_identity.write() = identity.clone();
        self.identity = identity;
    }
}
