//! WebSocket connector
//!
//! Production transport backed by tokio-tungstenite. The read half is
//! pumped by a background task; the write half is handed to the owner.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::connector::{
    CloseReason, Connector, FrameSink, TransportError, TransportEvent, TransportResult,
};

/// Buffer size for inbound transport events
const EVENT_BUFFER_SIZE: usize = 64;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket connector backed by tokio-tungstenite
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl WsConnector {
    /// Create a new connector
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(
        &self,
        url: &str,
    ) -> TransportResult<(Box<dyn FrameSink>, mpsc::Receiver<TransportEvent>)> {
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        tracing::debug!(url = %url, "websocket channel established");

        let (sink, read) = stream.split();
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER_SIZE);

        tokio::spawn(pump_frames(read, event_tx));

        Ok((Box::new(WsSink { sink }), event_rx))
    }
}

/// Forward inbound frames until the channel dies, then report why
async fn pump_frames(mut read: SplitStream<WsStream>, event_tx: mpsc::Sender<TransportEvent>) {
    let reason = loop {
        match read.next().await {
            Some(Ok(Message::Text(text))) => {
                if event_tx.send(TransportEvent::Frame(text)).await.is_err() {
                    // Owner dropped the receiver; stop pumping
                    return;
                }
            }
            Some(Ok(Message::Close(frame))) => {
                tracing::debug!(frame = ?frame, "close frame received");
                break CloseReason::Closed;
            }
            Some(Ok(Message::Binary(_))) => {
                tracing::debug!("binary frame ignored");
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
            Some(Err(e)) => break CloseReason::Error(e.to_string()),
            None => break CloseReason::Closed,
        }
    };

    let _ = event_tx.send(TransportEvent::Closed(reason)).await;
}

struct WsSink {
    sink: SplitSink<WsStream, Message>,
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send(&mut self, text: &str) -> TransportResult<()> {
        self.sink
            .send(Message::Text(text.to_string()))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.sink.send(Message::Close(None)).await;
        let _ = self.sink.close().await;
    }
}
