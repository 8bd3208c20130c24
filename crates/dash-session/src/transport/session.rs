//! Transport session
//!
//! Owns at most one physical channel at a time and reports everything it
//! observes as generation-tagged signals, so the owner can discard events
//! from superseded connections.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::connector::{CloseReason, Connector, FrameSink, TransportError, TransportEvent, TransportResult};

/// Signal delivered to the owner of a `TransportSession`
pub enum Signal {
    /// An open attempt succeeded; the write half is attached via `attach`
    Opened {
        generation: u64,
        sink: Box<dyn FrameSink>,
    },
    /// An open attempt failed outright
    OpenFailed {
        generation: u64,
        error: TransportError,
    },
    /// One inbound text frame
    Frame { generation: u64, raw: String },
    /// The channel is gone
    Closed {
        generation: u64,
        reason: CloseReason,
    },
}

impl Signal {
    /// Generation of the open attempt that produced this signal
    #[must_use]
    pub fn generation(&self) -> u64 {
        match self {
            Self::Opened { generation, .. }
            | Self::OpenFailed { generation, .. }
            | Self::Frame { generation, .. }
            | Self::Closed { generation, .. } => *generation,
        }
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opened { generation, .. } => {
                f.debug_struct("Opened").field("generation", generation).finish()
            }
            Self::OpenFailed { generation, error } => f
                .debug_struct("OpenFailed")
                .field("generation", generation)
                .field("error", error)
                .finish(),
            Self::Frame { generation, raw } => f
                .debug_struct("Frame")
                .field("generation", generation)
                .field("raw", raw)
                .finish(),
            Self::Closed { generation, reason } => f
                .debug_struct("Closed")
                .field("generation", generation)
                .field("reason", reason)
                .finish(),
        }
    }
}

/// Exclusive owner of the single physical channel
pub struct TransportSession {
    connector: Arc<dyn Connector>,
    signals: mpsc::Sender<Signal>,
    sink: Option<Box<dyn FrameSink>>,
    /// Generation of an open attempt currently in flight, if any
    opening: Option<u64>,
}

impl TransportSession {
    /// Create a session that reports through the given signal channel
    pub fn new(connector: Arc<dyn Connector>, signals: mpsc::Sender<Signal>) -> Self {
        Self {
            connector,
            signals,
            sink: None,
            opening: None,
        }
    }

    /// Start opening a channel; the outcome arrives as a signal.
    ///
    /// No-op while a channel is already open or an open attempt is in
    /// flight, making repeated open requests safe.
    pub fn begin_open(&mut self, url: String, generation: u64) {
        if self.sink.is_some() || self.opening.is_some() {
            tracing::debug!(generation, "open requested while channel active, ignoring");
            return;
        }

        self.opening = Some(generation);
        let connector = Arc::clone(&self.connector);
        let signals = self.signals.clone();

        tokio::spawn(async move {
            match connector.connect(&url).await {
                Ok((sink, mut events)) => {
                    if signals
                        .send(Signal::Opened { generation, sink })
                        .await
                        .is_err()
                    {
                        return;
                    }

                    let mut closed = false;
                    while let Some(event) = events.recv().await {
                        let signal = match event {
                            TransportEvent::Frame(raw) => Signal::Frame { generation, raw },
                            TransportEvent::Closed(reason) => {
                                closed = true;
                                Signal::Closed { generation, reason }
                            }
                        };

                        if signals.send(signal).await.is_err() || closed {
                            return;
                        }
                    }

                    // The read half vanished without a close event
                    let _ = signals
                        .send(Signal::Closed {
                            generation,
                            reason: CloseReason::Closed,
                        })
                        .await;
                }
                Err(error) => {
                    let _ = signals.send(Signal::OpenFailed { generation, error }).await;
                }
            }
        });
    }

    /// Attach the write half delivered by a successful open
    pub fn attach(&mut self, sink: Box<dyn FrameSink>) {
        self.opening = None;
        self.sink = Some(sink);
    }

    /// Record that the in-flight open attempt failed
    pub fn open_failed(&mut self) {
        self.opening = None;
    }

    /// Send one text frame over the attached channel
    pub async fn send(&mut self, text: &str) -> TransportResult<()> {
        match self.sink.as_mut() {
            Some(sink) => sink.send(text).await,
            None => Err(TransportError::NotConnected),
        }
    }

    /// Release the channel; always succeeds, safe to call repeatedly
    pub async fn close(&mut self) {
        self.opening = None;
        if let Some(mut sink) = self.sink.take() {
            sink.close().await;
        }
    }

    /// Check if a write half is currently attached
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.sink.is_some()
    }
}
