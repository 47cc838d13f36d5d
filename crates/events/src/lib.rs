//! In-process job event bus.
//!
//! The poller and the OTP handler publish [`JobEvent`]s here; the API
//! layer's notification router subscribes and forwards them to the
//! interested client connection. Events are transient -- nothing is
//! persisted or replayed.

pub mod bus;

pub use bus::{EventBus, JobEvent, JobEventKind};
