//! Patient domain model and eligibility-derived status.
//!
//! Records resolved by insurance member id. Updates go through a
//! conservative merge: an existing non-empty field is never overwritten
//! by empty incoming data, and unchanged fields are not rewritten.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Enumerated patient eligibility status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    Active,
    Inactive,
}

impl PatientStatus {
    /// Derive a status from the raw eligibility flag reported by the
    /// automation agent.
    ///
    /// The portal reports eligibility as a bare literal (`"Y"` / `"Yes"`
    /// in practice). Anything that is not a recognized positive literal
    /// maps to [`PatientStatus::Inactive`].
    pub fn from_eligibility(flag: &str) -> Self {
        let flag = flag.trim();
        if flag.eq_ignore_ascii_case("y") || flag.eq_ignore_ascii_case("yes") {
            PatientStatus::Active
        } else {
            PatientStatus::Inactive
        }
    }

    /// Stable lowercase string form, matching the serialized value.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Active => "active",
            PatientStatus::Inactive => "inactive",
        }
    }
}

/// A patient record keyed by insurance member id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: DbId,
    /// Insurance member identifier, unique per patient.
    pub member_id: String,
    pub first_name: String,
    pub last_name: String,
    /// Date of birth as supplied by the portal/request (`MM/DD/YYYY`).
    pub date_of_birth: String,
    pub status: PatientStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating a new patient record.
#[derive(Debug, Clone)]
pub struct NewPatient {
    pub member_id: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: String,
    pub status: PatientStatus,
}

/// Partial update applied to an existing patient.
///
/// `None` fields are left untouched by the store.
#[derive(Debug, Clone, Default)]
pub struct PatientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub status: Option<PatientStatus>,
}

impl PatientUpdate {
    /// True when the update would not change anything.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.date_of_birth.is_none()
            && self.status.is_none()
    }
}

/// Incoming patient data from a completed eligibility run.
#[derive(Debug, Clone, Default)]
pub struct PatientInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub status: Option<PatientStatus>,
}

/// Compute the conservative merge of `incoming` onto `existing`.
///
/// A field is included in the returned update only when the incoming
/// value is non-empty and differs from the stored one. Empty incoming
/// values never clobber populated fields.
pub fn conservative_diff(existing: &Patient, incoming: &PatientInput) -> PatientUpdate {
    let keep_if_changed = |current: &str, candidate: &Option<String>| -> Option<String> {
        match candidate {
            Some(v) if !v.trim().is_empty() && v != current => Some(v.clone()),
            _ => None,
        }
    };

    PatientUpdate {
        first_name: keep_if_changed(&existing.first_name, &incoming.first_name),
        last_name: keep_if_changed(&existing.last_name, &incoming.last_name),
        date_of_birth: keep_if_changed(&existing.date_of_birth, &incoming.date_of_birth),
        status: match incoming.status {
            Some(s) if s != existing.status => Some(s),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> Patient {
        Patient {
            id: 1,
            member_id: "123".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            date_of_birth: "01/02/1980".into(),
            status: PatientStatus::Inactive,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn positive_eligibility_literals_map_to_active() {
        assert_eq!(PatientStatus::from_eligibility("Y"), PatientStatus::Active);
        assert_eq!(PatientStatus::from_eligibility("y"), PatientStatus::Active);
        assert_eq!(
            PatientStatus::from_eligibility(" Yes "),
            PatientStatus::Active
        );
    }

    #[test]
    fn any_other_literal_maps_to_inactive() {
        assert_eq!(PatientStatus::from_eligibility("N"), PatientStatus::Inactive);
        assert_eq!(
            PatientStatus::from_eligibility("Not eligible"),
            PatientStatus::Inactive
        );
        assert_eq!(PatientStatus::from_eligibility(""), PatientStatus::Inactive);
    }

    #[test]
    fn diff_ignores_empty_incoming_fields() {
        let existing = patient();
        let incoming = PatientInput {
            first_name: Some("".into()),
            last_name: Some("   ".into()),
            ..Default::default()
        };

        let update = conservative_diff(&existing, &incoming);
        assert!(update.is_empty());
    }

    #[test]
    fn diff_ignores_unchanged_fields() {
        let existing = patient();
        let incoming = PatientInput {
            first_name: Some("Jane".into()),
            date_of_birth: Some("01/02/1980".into()),
            status: Some(PatientStatus::Inactive),
            ..Default::default()
        };

        let update = conservative_diff(&existing, &incoming);
        assert!(update.is_empty());
    }

    #[test]
    fn diff_picks_up_changed_non_empty_fields() {
        let existing = patient();
        let incoming = PatientInput {
            first_name: Some("Janet".into()),
            status: Some(PatientStatus::Active),
            ..Default::default()
        };

        let update = conservative_diff(&existing, &incoming);
        assert_eq!(update.first_name.as_deref(), Some("Janet"));
        assert_eq!(update.status, Some(PatientStatus::Active));
        assert!(update.last_name.is_none());
        assert!(update.date_of_birth.is_none());
    }
}
