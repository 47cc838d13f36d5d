//! Event-to-WebSocket routing engine.
//!
//! [`NotificationRouter`] subscribes to the job event bus and forwards each
//! event to the originating client's WebSocket connection. Delivery is
//! strictly best-effort: events with no connection id, or whose connection
//! has since disconnected, are dropped without affecting the job itself.

use std::sync::Arc;

use axum::extract::ws::Message;
use benesync_events::bus::JobEvent;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Routes job events to client WebSocket connections.
pub struct NotificationRouter {
    ws_manager: Arc<WsManager>,
}

impl NotificationRouter {
    /// Create a new router backed by the given WebSocket manager.
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](benesync_events::bus::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<JobEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.route_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Forward a single event to its target connection, if any.
    async fn route_event(&self, event: &JobEvent) {
        let Some(conn_id) = event.connection_id.as_deref() else {
            tracing::debug!(
                session_id = %event.session_id,
                kind = event.kind.as_str(),
                "Job event has no connection id, dropping"
            );
            return;
        };

        let frame = build_frame(event);
        let delivered = self
            .ws_manager
            .send_to_connection(conn_id, Message::Text(frame.to_string().into()))
            .await;

        if delivered {
            tracing::debug!(
                conn_id,
                session_id = %event.session_id,
                kind = event.kind.as_str(),
                "Job event delivered"
            );
        } else {
            tracing::debug!(
                conn_id,
                session_id = %event.session_id,
                kind = event.kind.as_str(),
                "Connection gone, job event dropped"
            );
        }
    }
}

/// Build the outbound WebSocket frame for a job event.
///
/// The frame is the event payload flattened under a `type` discriminator,
/// so clients can switch on `frame.type` directly.
fn build_frame(event: &JobEvent) -> Value {
    let mut frame = json!({
        "type": event.kind.as_str(),
        "session_id": event.session_id,
    });

    if let (Some(frame_obj), Some(payload_obj)) =
        (frame.as_object_mut(), event.payload.as_object())
    {
        for (key, value) in payload_obj {
            frame_obj.insert(key.clone(), value.clone());
        }
    }

    frame
}
