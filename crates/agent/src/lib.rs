//! Client for the external browser-automation agent.
//!
//! The agent runs the actual insurance-portal automation out of
//! process and is opaque beyond a three-operation HTTP contract:
//! start a session, report session status, accept an OTP.

pub mod api;
pub mod types;

pub use api::{AgentApi, AgentError, AgentHttpClient};
pub use types::{AgentResult, SessionStatus, SessionStatusResponse, StartSessionResponse};
