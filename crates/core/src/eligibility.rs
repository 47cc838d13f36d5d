//! Eligibility-check request payloads.

use serde::{Deserialize, Serialize};

/// An eligibility-check request enriched with portal credentials.
///
/// Built by the start handler from the caller-supplied fields plus the
/// stored [`SiteCredentials`](crate::credentials::SiteCredentials) for
/// the requested site. Immutable once registered with a job.
#[derive(Clone, Serialize, Deserialize)]
pub struct EligibilityRequest {
    /// Insurance member identifier.
    pub member_id: String,
    /// Date of birth (`MM/DD/YYYY`).
    pub date_of_birth: String,
    /// Which insurance portal to run against (e.g. `"MH"`, `"DDMA"`).
    pub insurance_site_key: String,
    /// Portal login injected from the credential store.
    pub username: String,
    /// Portal password injected from the credential store.
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

// Credentials must not leak into logs; Debug is implemented manually
// with the password redacted.
impl std::fmt::Debug for EligibilityRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EligibilityRequest")
            .field("member_id", &self.member_id)
            .field("date_of_birth", &self.date_of_birth)
            .field("insurance_site_key", &self.insurance_site_key)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}
