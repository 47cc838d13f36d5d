//! Request middleware.
//!
//! - [`auth`] -- JWT Bearer-token extractor for protected handlers.

pub mod auth;
