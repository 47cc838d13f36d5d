//! Notification routing infrastructure.
//!
//! The [`NotificationRouter`] subscribes to the job event bus and delivers
//! events to the WebSocket connection that initiated the job.

pub mod router;

pub use router::NotificationRouter;
