//! Request handlers.
//!
//! - [`eligibility`] -- start eligibility checks and forward OTP codes.

pub mod eligibility;
