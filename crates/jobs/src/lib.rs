//! Job orchestration for externally-executed automation sessions.
//!
//! One eligibility check is one agent-owned session. This crate tracks
//! active sessions in an in-memory [`registry`], drives each one to a
//! terminal state with a per-session [`poller`], and reconciles the
//! eventual agent result with domain records through the completion
//! [`pipeline`]. Nothing here survives a process restart.

pub mod memory;
pub mod pipeline;
pub mod poller;
pub mod registry;

pub use pipeline::{CompletionPipeline, CompletionSummary};
pub use poller::{PollerConfig, SessionPoller};
pub use registry::{JobContext, JobRegistry};
