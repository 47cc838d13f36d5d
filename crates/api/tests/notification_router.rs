//! Integration tests for the notification router.
//!
//! A real `EventBus` and `WsManager` are wired together; events published
//! on the bus must show up as text frames on the right connection's
//! channel, and only there.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use benesync_api::notifications::NotificationRouter;
use benesync_api::ws::WsManager;
use benesync_events::{EventBus, JobEvent};
use serde_json::Value;

/// Wire a router to a fresh bus/manager pair and start its loop.
fn setup() -> (Arc<EventBus>, Arc<WsManager>) {
    let bus = Arc::new(EventBus::default());
    let ws_manager = Arc::new(WsManager::new());

    let router = NotificationRouter::new(Arc::clone(&ws_manager));
    tokio::spawn(router.run(bus.subscribe()));

    (bus, ws_manager)
}

async fn recv_frame(rx: &mut tokio::sync::mpsc::UnboundedReceiver<Message>) -> Value {
    let msg = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("frame should arrive within a second")
        .expect("channel should stay open");
    match msg {
        Message::Text(text) => serde_json::from_str(&text).expect("frame should be JSON"),
        other => panic!("expected Text frame, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: events reach the connection they name
// ---------------------------------------------------------------------------

#[tokio::test]
async fn event_is_forwarded_to_named_connection() {
    let (bus, ws_manager) = setup();
    let mut rx = ws_manager.add("conn-1".to_string()).await;

    bus.publish(JobEvent::otp_required(
        "sess-1",
        Some("conn-1".into()),
        "OTP required for login",
    ));

    let frame = recv_frame(&mut rx).await;
    assert_eq!(frame["type"], "otp_required");
    assert_eq!(frame["session_id"], "sess-1");
    assert_eq!(frame["message"], "OTP required for login");
}

// ---------------------------------------------------------------------------
// Test: other connections never see the event
// ---------------------------------------------------------------------------

#[tokio::test]
async fn event_is_not_broadcast_to_other_connections() {
    let (bus, ws_manager) = setup();
    let mut rx1 = ws_manager.add("conn-1".to_string()).await;
    let mut rx2 = ws_manager.add("conn-2".to_string()).await;

    bus.publish(JobEvent::session_update(
        "sess-2",
        Some("conn-1".into()),
        "completed",
        None,
        None,
        None,
    ));

    let frame = recv_frame(&mut rx1).await;
    assert_eq!(frame["type"], "session_update");

    assert!(rx2.try_recv().is_err(), "conn-2 should receive nothing");
}

// ---------------------------------------------------------------------------
// Test: events naming an unknown connection are dropped quietly
// ---------------------------------------------------------------------------

#[tokio::test]
async fn event_for_unknown_connection_is_dropped() {
    let (bus, ws_manager) = setup();
    let mut rx = ws_manager.add("conn-1".to_string()).await;

    bus.publish(JobEvent::session_update(
        "sess-3",
        Some("conn-gone".into()),
        "error",
        Some("session failed".into()),
        None,
        None,
    ));

    // Follow with an event we CAN observe, proving the router survived.
    bus.publish(JobEvent::session_update(
        "sess-4",
        Some("conn-1".into()),
        "completed",
        None,
        None,
        None,
    ));

    let frame = recv_frame(&mut rx).await;
    assert_eq!(frame["session_id"], "sess-4");
}

// ---------------------------------------------------------------------------
// Test: events without a connection id are dropped quietly
// ---------------------------------------------------------------------------

#[tokio::test]
async fn event_without_connection_id_is_dropped() {
    let (bus, ws_manager) = setup();
    let mut rx = ws_manager.add("conn-1".to_string()).await;

    bus.publish(JobEvent::session_update(
        "sess-5", None, "completed", None, None, None,
    ));

    bus.publish(JobEvent::session_update(
        "sess-6",
        Some("conn-1".into()),
        "completed",
        None,
        None,
        None,
    ));

    let frame = recv_frame(&mut rx).await;
    assert_eq!(frame["session_id"], "sess-6");
}
