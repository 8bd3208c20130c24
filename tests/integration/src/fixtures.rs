//! Test fixtures: wire frames and client options

use std::time::Duration;

use dash_session::{ReconnectPolicy, SessionOptions};

/// Greeting the gateway sends right after the handshake
pub const CONNECTED_FRAME: &str = r#"{"type":"connected","message":"Connected"}"#;

/// A server-emitted kind this client does not know about
pub const UNKNOWN_KIND_FRAME: &str = r#"{"type":"unknown_kind","data":{}}"#;

/// Wire-level error report
pub const ERROR_FRAME: &str = r#"{"type":"error","message":"out of credits"}"#;

/// A frame that is not valid JSON
pub const MALFORMED_FRAME: &str = "{\"type\": unquoted}";

/// Chat response frame with the given text
pub fn message_frame(text: &str) -> String {
    serde_json::json!({
        "type": "message",
        "response": text,
        "usage": {"input_tokens": 0, "output_tokens": 0}
    })
    .to_string()
}

/// Progress frame with the given completion percentage
pub fn progress_frame(percent: u32) -> String {
    serde_json::json!({
        "type": "progress",
        "data": {"percent": percent}
    })
    .to_string()
}

/// Options with a backoff fast enough for tests to ride through
pub fn fast_options() -> SessionOptions {
    SessionOptions::new("ws://gateway.test").with_policy(ReconnectPolicy::new(
        Duration::from_millis(5),
        Duration::from_millis(20),
        2,
    ))
}

/// Options with a backoff slow enough for tests to observe Reconnecting
pub fn patient_options() -> SessionOptions {
    SessionOptions::new("ws://gateway.test").with_policy(ReconnectPolicy::new(
        Duration::from_millis(60),
        Duration::from_millis(240),
        5,
    ))
}
