//! Event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`JobEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// JobEvent
// ---------------------------------------------------------------------------

/// The kind of a job event, fixed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobEventKind {
    OtpRequired,
    OtpSubmitted,
    SessionUpdate,
}

impl JobEventKind {
    /// Wire name of the kind, matching the serialized value.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobEventKind::OtpRequired => "otp_required",
            JobEventKind::OtpSubmitted => "otp_submitted",
            JobEventKind::SessionUpdate => "session_update",
        }
    }
}

/// A transient event describing progress of one automation session.
///
/// `connection_id` names the single client connection interested in
/// this session; events without one have no audience and are dropped
/// by the router.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEvent {
    pub kind: JobEventKind,
    pub session_id: String,
    pub connection_id: Option<String>,
    /// Kind-specific JSON payload (see the constructors).
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl JobEvent {
    fn new(
        kind: JobEventKind,
        session_id: impl Into<String>,
        connection_id: Option<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            kind,
            session_id: session_id.into(),
            connection_id,
            payload,
            timestamp: Utc::now(),
        }
    }

    /// `otp_required`: `{ session_id, message }`.
    pub fn otp_required(
        session_id: impl Into<String>,
        connection_id: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        let session_id = session_id.into();
        let payload = serde_json::json!({
            "session_id": session_id,
            "message": message.into(),
        });
        Self::new(JobEventKind::OtpRequired, session_id, connection_id, payload)
    }

    /// `otp_submitted`: `{ session_id, result }`.
    pub fn otp_submitted(
        session_id: impl Into<String>,
        connection_id: Option<String>,
        result: serde_json::Value,
    ) -> Self {
        let session_id = session_id.into();
        let payload = serde_json::json!({
            "session_id": session_id,
            "result": result,
        });
        Self::new(
            JobEventKind::OtpSubmitted,
            session_id,
            connection_id,
            payload,
        )
    }

    /// `session_update`: `{ session_id, status, message?, raw_result?, final? }`.
    ///
    /// Optional fields are omitted from the payload entirely rather
    /// than serialized as `null`.
    pub fn session_update(
        session_id: impl Into<String>,
        connection_id: Option<String>,
        status: &str,
        message: Option<String>,
        raw_result: Option<serde_json::Value>,
        final_summary: Option<serde_json::Value>,
    ) -> Self {
        let session_id = session_id.into();
        let mut map = serde_json::Map::new();
        map.insert(
            "session_id".into(),
            serde_json::Value::String(session_id.clone()),
        );
        map.insert(
            "status".into(),
            serde_json::Value::String(status.to_string()),
        );
        if let Some(message) = message {
            map.insert("message".into(), serde_json::Value::String(message));
        }
        if let Some(raw) = raw_result {
            map.insert("raw_result".into(), raw);
        }
        if let Some(summary) = final_summary {
            map.insert("final".into(), summary);
        }
        Self::new(
            JobEventKind::SessionUpdate,
            session_id,
            connection_id,
            serde_json::Value::Object(map),
        )
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`JobEvent`].
pub struct EventBus {
    sender: broadcast::Sender<JobEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are
    /// dropped and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: JobEvent) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
