//! Wire protocol
//!
//! JSON text frames exchanged with the gateway: the outbound envelope and
//! the inbound frame with its typed event mapping.

mod envelope;
mod events;

pub use envelope::OutboundEnvelope;
pub use events::{InboundEvent, InboundFrame, ServerEvent};
