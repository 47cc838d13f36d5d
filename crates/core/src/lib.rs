//! Shared domain types for the Benesync eligibility backend.
//!
//! Holds the error taxonomy, patient domain model, eligibility request
//! payloads, stored portal credentials, and the collaborator traits that
//! abstract external persistence/extraction services.

pub mod collaborators;
pub mod credentials;
pub mod eligibility;
pub mod error;
pub mod patient;
pub mod types;
