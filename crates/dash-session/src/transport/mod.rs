//! Transport layer
//!
//! Owns the physical WebSocket channel: opening, sending text frames,
//! receiving text frames, and reporting close/error. Parsing of frames
//! into structured events happens one layer up.

mod connector;
mod session;
mod ws;

pub use connector::{
    CloseReason, Connector, FrameSink, TransportError, TransportEvent, TransportResult,
};
pub use session::{Signal, TransportSession};
pub use ws::WsConnector;
