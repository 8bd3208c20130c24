//! Session client integration tests
//!
//! Drive the client end-to-end over a scripted transport: connection
//! lifecycle, reconnection schedule, dispatch ordering, and failure
//! surfacing.
//!
//! Run with: cargo test -p integration-tests --test session_tests

use std::time::Duration;

use dash_common::AppConfig;
use dash_core::SessionId;
use dash_session::{
    CloseReason, ConnectionState, ServerEvent, SessionError, SessionOptions, StatusEvent,
};
use integration_tests::{
    fast_options, message_frame, patient_options, progress_frame, SessionHarness,
    CONNECTED_FRAME, ERROR_FRAME, MALFORMED_FRAME, UNKNOWN_KIND_FRAME,
};

// ============================================================================
// Configuration wiring
// ============================================================================

#[test]
fn test_options_from_default_config_target_local_gateway() {
    let options = SessionOptions::from_config(&AppConfig::default());
    let identity = SessionId::new("s1").unwrap();

    assert_eq!(options.session_url(&identity), "ws://localhost:8000/ws/s1");
    assert_eq!(options.policy().max_attempts(), 5);
    assert_eq!(options.policy().next_delay(1), Duration::from_secs(2));
    assert_eq!(options.policy().next_delay(10), Duration::from_secs(10));
}

// ============================================================================
// Connection lifecycle
// ============================================================================

#[tokio::test]
async fn test_connect_reaches_open_with_numbered_statuses() {
    let harness = SessionHarness::new(fast_options());

    harness.connect_and_open().await;

    let statuses = harness.statuses.wait_for(2).await;
    assert_eq!(
        statuses,
        vec![
            StatusEvent {
                state: ConnectionState::Connecting,
                seq: 1
            },
            StatusEvent {
                state: ConnectionState::Open,
                seq: 2
            },
        ]
    );
}

#[tokio::test]
async fn test_session_identity_is_a_path_segment() {
    let harness = SessionHarness::new(fast_options());

    let identity = SessionId::new("s1").unwrap();
    harness.client.connect_with(identity).await.unwrap();
    harness.wait_for_state(ConnectionState::Open).await;

    assert_eq!(
        harness.connector.connect_urls(),
        vec!["ws://gateway.test/ws/s1".to_string()]
    );
}

#[tokio::test]
async fn test_generated_identity_is_stable_across_reconnects() {
    let harness = SessionHarness::new(fast_options());

    harness.connect_and_open().await;
    let first_id = harness.client.session_id().expect("identity missing");

    harness.connector.remote().close(CloseReason::Closed).await;
    harness.connector.wait_for_connects(2).await;
    harness.wait_for_state(ConnectionState::Open).await;

    assert_eq!(harness.client.session_id(), Some(first_id.clone()));

    let urls = harness.connector.connect_urls();
    assert_eq!(urls.len(), 2);
    assert_eq!(urls[0], urls[1]);
    assert!(urls[0].ends_with(&format!("/ws/{first_id}")));
}

#[tokio::test]
async fn test_connect_is_noop_while_open() {
    let harness = SessionHarness::new(fast_options());

    harness.connect_and_open().await;
    let state = harness.client.connect().await.unwrap();

    assert_eq!(state, ConnectionState::Open);
    assert_eq!(harness.connector.connect_count(), 1);
}

// ============================================================================
// Outbound sends
// ============================================================================

#[tokio::test]
async fn test_send_while_open_produces_wire_envelope() {
    let harness = SessionHarness::new(fast_options());
    harness.connect_and_open().await;

    harness.client.send("hello", None).await.unwrap();
    let frames = harness.connector.remote().wait_for_sent(1).await;

    let value: serde_json::Value = serde_json::from_str(&frames[0]).unwrap();
    assert_eq!(value["message"], "hello");
    assert!(value["project_id"].is_null());
    assert!(value["timestamp"].is_string());
    assert_eq!(value.as_object().unwrap().len(), 3);
}

#[tokio::test]
async fn test_send_carries_project_scope() {
    let harness = SessionHarness::new(fast_options());
    harness.connect_and_open().await;

    harness
        .client
        .send("update the plan", Some("proj_7".to_string()))
        .await
        .unwrap();
    let frames = harness.connector.remote().wait_for_sent(1).await;

    let value: serde_json::Value = serde_json::from_str(&frames[0]).unwrap();
    assert_eq!(value["project_id"], "proj_7");
}

#[tokio::test]
async fn test_send_while_idle_fails_without_side_effects() {
    let harness = SessionHarness::new(fast_options());

    let result = harness.client.send("hello", None).await;

    assert_eq!(result, Err(SessionError::NotConnected));
    assert_eq!(harness.connector.connect_count(), 0);
    assert_eq!(harness.client.state(), ConnectionState::Idle);
    assert!(harness.statuses.is_empty());
}

#[tokio::test]
async fn test_send_while_reconnecting_fails() {
    let harness = SessionHarness::new(patient_options());
    harness.connect_and_open().await;

    harness.connector.remote().close(CloseReason::Closed).await;
    harness.wait_for_state(ConnectionState::Reconnecting).await;

    let result = harness.client.send("hello", None).await;
    assert_eq!(result, Err(SessionError::NotConnected));
}

// ============================================================================
// Reconnection
// ============================================================================

#[tokio::test]
async fn test_unexpected_close_schedules_backoff_then_reconnects() {
    let harness = SessionHarness::new(patient_options());
    harness.connect_and_open().await;

    harness
        .connector
        .remote()
        .close(CloseReason::Error("connection reset".to_string()))
        .await;

    harness.wait_for_state(ConnectionState::Reconnecting).await;
    assert_eq!(harness.connector.connect_count(), 1);

    // The timer fires and a fresh attempt is made
    harness.connector.wait_for_connects(2).await;
    harness.wait_for_state(ConnectionState::Open).await;

    let states: Vec<ConnectionState> = harness
        .statuses
        .wait_for(4)
        .await
        .iter()
        .take(4)
        .map(|s| s.state)
        .collect();
    assert_eq!(
        states,
        vec![
            ConnectionState::Connecting,
            ConnectionState::Open,
            ConnectionState::Reconnecting,
            ConnectionState::Connecting,
        ]
    );
}

#[tokio::test]
async fn test_open_failing_every_attempt_reaches_failed() {
    let harness = SessionHarness::new(fast_options());
    harness.connector.fail_always(true);

    harness.client.connect().await.unwrap();
    harness.wait_for_state(ConnectionState::Failed).await;

    // Initial attempt plus max_attempts (2) retries, then the client gives up
    assert_eq!(harness.connector.connect_count(), 3);

    let errors = harness.errors.snapshot();
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, SessionError::RetriesExhausted { attempts: 2 })),
        "expected a RetriesExhausted error, got: {errors:?}"
    );

    // Failed is terminal: no further automatic attempts
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(harness.connector.connect_count(), 3);
    assert_eq!(harness.client.state(), ConnectionState::Failed);
}

#[tokio::test]
async fn test_retries_exhausted_is_distinct_from_transport_errors() {
    let harness = SessionHarness::new(fast_options());
    harness.connector.fail_always(true);

    harness.client.connect().await.unwrap();
    harness.wait_for_state(ConnectionState::Failed).await;

    let errors = harness.errors.snapshot();
    let transports = errors
        .iter()
        .filter(|e| matches!(e, SessionError::Transport(_)))
        .count();
    let exhausted = errors
        .iter()
        .filter(|e| matches!(e, SessionError::RetriesExhausted { .. }))
        .count();

    // Every failed open surfaces as a transport error; exhaustion once
    assert_eq!(transports, 3);
    assert_eq!(exhausted, 1);
}

#[tokio::test]
async fn test_failed_is_reenterable_via_fresh_connect() {
    let harness = SessionHarness::new(fast_options());
    harness.connector.fail_always(true);

    harness.client.connect().await.unwrap();
    harness.wait_for_state(ConnectionState::Failed).await;

    harness.connector.fail_always(false);
    harness.client.connect().await.unwrap();
    harness.wait_for_state(ConnectionState::Open).await;
}

#[tokio::test]
async fn test_disconnect_during_reconnecting_cancels_timer() {
    let harness = SessionHarness::new(patient_options());
    harness.connect_and_open().await;

    harness.connector.remote().close(CloseReason::Closed).await;
    harness.wait_for_state(ConnectionState::Reconnecting).await;
    let connects_before = harness.connector.connect_count();

    harness.client.disconnect().await;
    assert_eq!(harness.client.state(), ConnectionState::Closed);

    // Sleep well past the pending delay: no stale connect fires
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(harness.connector.connect_count(), connects_before);
    assert_eq!(harness.client.state(), ConnectionState::Closed);

    let last = harness.statuses.snapshot().last().copied().unwrap();
    assert_eq!(last.state, ConnectionState::Closed);
}

#[tokio::test]
async fn test_disconnect_drops_identity_and_suppresses_reconnect() {
    let harness = SessionHarness::new(fast_options());
    harness.connect_and_open().await;
    let remote = harness.connector.remote();

    harness.client.disconnect().await;
    assert!(harness.client.session_id().is_none());

    // A close racing in right after the explicit disconnect is ignored
    remote.close(CloseReason::Closed).await;
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(harness.client.state(), ConnectionState::Closed);
    assert_eq!(harness.connector.connect_count(), 1);
}

// ============================================================================
// Dispatch
// ============================================================================

#[tokio::test]
async fn test_frames_dispatched_in_arrival_order() {
    let harness = SessionHarness::new(fast_options());
    harness.connect_and_open().await;
    let remote = harness.connector.remote();

    for n in 0..20 {
        remote.frame(&message_frame(&format!("reply {n}"))).await;
    }

    let events = harness.messages.wait_for(20).await;
    let texts: Vec<String> = events
        .iter()
        .filter_map(|event| match event {
            ServerEvent::Message { response, .. } => Some(response.clone()),
            _ => None,
        })
        .collect();

    let expected: Vec<String> = (0..20).map(|n| format!("reply {n}")).collect();
    assert_eq!(texts, expected);
}

#[tokio::test]
async fn test_unknown_kind_is_dispatched_as_generic_event() {
    let harness = SessionHarness::new(fast_options());
    harness.connect_and_open().await;

    harness.connector.remote().frame(UNKNOWN_KIND_FRAME).await;

    let events = harness.messages.wait_for(1).await;
    match &events[0] {
        ServerEvent::Unknown { kind, data, .. } => {
            assert_eq!(kind, "unknown_kind");
            assert!(data.is_some());
        }
        other => panic!("expected a generic event, got {other:?}"),
    }
    assert_eq!(harness.client.state(), ConnectionState::Open);
}

#[tokio::test]
async fn test_error_frames_route_to_error_handlers_only() {
    let harness = SessionHarness::new(fast_options());
    harness.connect_and_open().await;

    let remote = harness.connector.remote();
    remote.frame(ERROR_FRAME).await;
    remote.frame(CONNECTED_FRAME).await;

    harness.messages.wait_for(1).await;
    let errors = harness.errors.snapshot();

    assert_eq!(
        errors,
        vec![SessionError::Server("out of credits".to_string())]
    );
    // The error frame itself never reached message subscribers
    assert!(harness
        .messages
        .snapshot()
        .iter()
        .all(|e| matches!(e, ServerEvent::Connected { .. })));
}

#[tokio::test]
async fn test_malformed_frame_dropped_and_reported() {
    let harness = SessionHarness::new(fast_options());
    harness.connect_and_open().await;

    let remote = harness.connector.remote();
    remote.frame(MALFORMED_FRAME).await;
    remote.frame(&progress_frame(40)).await;

    // The good frame behind the bad one still arrives, in order
    let events = harness.messages.wait_for(1).await;
    assert!(matches!(events[0], ServerEvent::Progress { .. }));

    let errors = harness.errors.snapshot();
    assert!(matches!(errors[0], SessionError::MalformedFrame(_)));
    assert_eq!(harness.client.state(), ConnectionState::Open);
}

#[tokio::test]
async fn test_subscriptions_survive_physical_reconnects() {
    let harness = SessionHarness::new(fast_options());
    harness.connect_and_open().await;

    harness.connector.remote().frame(&message_frame("before")).await;
    harness.messages.wait_for(1).await;

    harness.connector.remote().close(CloseReason::Closed).await;
    harness.connector.wait_for_connects(2).await;
    harness.wait_for_state(ConnectionState::Open).await;

    harness.connector.remote().frame(&message_frame("after")).await;

    let events = harness.messages.wait_for(2).await;
    assert_eq!(events.len(), 2);
}

#[tokio::test]
async fn test_stale_connection_signals_are_ignored() {
    let harness = SessionHarness::new(fast_options());
    harness.connect_and_open().await;
    let old_remote = harness.connector.remote_at(0);

    // Supersede the first connection entirely
    harness.client.disconnect().await;
    harness.client.connect().await.unwrap();
    harness.wait_for_state(ConnectionState::Open).await;
    let messages_before = harness.messages.len();

    // The zombie connection keeps talking; nothing may come of it
    old_remote.frame(&message_frame("ghost")).await;
    old_remote.close(CloseReason::Error("ghost reset".to_string())).await;
    tokio::time::sleep(Duration::from_millis(60)).await;

    assert_eq!(harness.messages.len(), messages_before);
    assert_eq!(harness.client.state(), ConnectionState::Open);
    assert_eq!(harness.connector.connect_count(), 2);
}
