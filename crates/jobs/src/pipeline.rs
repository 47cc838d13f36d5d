//! Completion pipeline: agent result to durable domain effects.
//!
//! Runs once per completed session. The agent result is untrusted
//! external data, so every field is checked before use, and every
//! collaborator failure is captured into the returned summary rather
//! than propagated -- the session still completes either way.

use std::path::Path;
use std::sync::Arc;

use benesync_agent::AgentResult;
use benesync_core::collaborators::{DocumentStore, PatientStore, TempFileCleaner, TextExtractor};
use benesync_core::eligibility::EligibilityRequest;
use benesync_core::patient::{conservative_diff, NewPatient, PatientInput, PatientStatus};
use benesync_core::types::DbId;
use serde::{Deserialize, Serialize};

/// Stable lookup key for the eligibility document group.
pub const DOCUMENT_GROUP_KEY: &str = "eligibility_status";
/// Human title used when the group has to be created.
pub const DOCUMENT_GROUP_TITLE: &str = "Eligibility Status";

/// Caller-facing summary of what the pipeline did.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSummary {
    /// `created` / `updated` / `unchanged` / `error: ...`.
    pub patient_update_status: String,
    /// `uploaded` / `no valid path provided` / `skipped: ...` / `error: ...`.
    pub pdf_upload_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_file_id: Option<DbId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_subject: Option<String>,
    /// Non-fatal extraction failure, recorded instead of raised.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<String>,
}

/// Transforms an [`AgentResult`] into patient/document effects.
///
/// All collaborators are trait objects so the concrete services
/// (relational store, binary storage, PDF extraction) stay external.
pub struct CompletionPipeline {
    patients: Arc<dyn PatientStore>,
    documents: Arc<dyn DocumentStore>,
    extractor: Arc<dyn TextExtractor>,
    cleaner: Arc<dyn TempFileCleaner>,
}

impl CompletionPipeline {
    pub fn new(
        patients: Arc<dyn PatientStore>,
        documents: Arc<dyn DocumentStore>,
        extractor: Arc<dyn TextExtractor>,
        cleaner: Arc<dyn TempFileCleaner>,
    ) -> Self {
        Self {
            patients,
            documents,
            extractor,
            cleaner,
        }
    }

    /// Run the full pipeline for one completed session.
    ///
    /// Infallible by contract: failures are recorded in the summary.
    /// Repeated invocation with the same result is safe except for
    /// document storage, which appends a new row per run.
    pub async fn run(
        &self,
        session_id: &str,
        request: &EligibilityRequest,
        result: &AgentResult,
    ) -> CompletionSummary {
        // 1. Best-effort subject extraction from the PDF, if any.
        let (extracted_subject, extraction_error) = self.extract_subject(session_id, result).await;

        // 2+3. Resolve/create the patient and persist the derived status.
        let status = PatientStatus::from_eligibility(result.eligibility.as_deref().unwrap_or(""));
        let (patient_update_status, patient_id) = self
            .upsert_patient(session_id, request, extracted_subject.as_deref(), status)
            .await;

        // 4. Store the PDF under the eligibility document group.
        let (pdf_upload_status, pdf_file_id) =
            self.store_pdf(session_id, result, patient_id).await;

        // 5. Schedule cleanup of the agent's temp directory.
        self.cleanup_temp(session_id, result).await;

        CompletionSummary {
            patient_update_status,
            pdf_upload_status,
            pdf_file_id,
            extracted_subject,
            extraction_error,
        }
    }

    async fn extract_subject(
        &self,
        session_id: &str,
        result: &AgentResult,
    ) -> (Option<String>, Option<String>) {
        let Some(path) = result.pdf_path.as_deref().filter(|_| result.has_pdf()) else {
            return (None, None);
        };
        match self.extractor.extract_subject(path).await {
            Ok(subject) => (subject, None),
            Err(e) => {
                tracing::warn!(
                    session_id = %session_id,
                    pdf_path = %path,
                    error = %e,
                    "Subject extraction failed",
                );
                (None, Some(e.to_string()))
            }
        }
    }

    /// Resolve the patient by member id; create when absent, otherwise
    /// apply a conservative merge. Returns `(status_text, patient_id)`.
    async fn upsert_patient(
        &self,
        session_id: &str,
        request: &EligibilityRequest,
        extracted_subject: Option<&str>,
        status: PatientStatus,
    ) -> (String, Option<DbId>) {
        let existing = match self.patients.find_by_member_id(&request.member_id).await {
            Ok(found) => found,
            Err(e) => {
                tracing::error!(
                    session_id = %session_id,
                    member_id = %request.member_id,
                    error = %e,
                    "Patient lookup failed",
                );
                return (format!("error: {e}"), None);
            }
        };

        // Request-supplied names win; the extracted subject fills gaps.
        let (subject_first, subject_last) = split_subject(extracted_subject);
        let first_name = request.first_name.clone().or(subject_first);
        let last_name = request.last_name.clone().or(subject_last);

        match existing {
            None => {
                let new = NewPatient {
                    member_id: request.member_id.clone(),
                    first_name: first_name.unwrap_or_default(),
                    last_name: last_name.unwrap_or_default(),
                    date_of_birth: request.date_of_birth.clone(),
                    status,
                };
                match self.patients.create(new).await {
                    Ok(patient) => ("created".to_string(), Some(patient.id)),
                    Err(e) => {
                        tracing::error!(session_id = %session_id, error = %e, "Patient create failed");
                        (format!("error: {e}"), None)
                    }
                }
            }
            Some(patient) => {
                let incoming = PatientInput {
                    first_name,
                    last_name,
                    date_of_birth: Some(request.date_of_birth.clone()),
                    status: Some(status),
                };
                let update = conservative_diff(&patient, &incoming);
                if update.is_empty() {
                    return ("unchanged".to_string(), Some(patient.id));
                }
                match self.patients.update(patient.id, update).await {
                    Ok(updated) => ("updated".to_string(), Some(updated.id)),
                    Err(e) => {
                        tracing::error!(session_id = %session_id, error = %e, "Patient update failed");
                        (format!("error: {e}"), Some(patient.id))
                    }
                }
            }
        }
    }

    async fn store_pdf(
        &self,
        session_id: &str,
        result: &AgentResult,
        patient_id: Option<DbId>,
    ) -> (String, Option<DbId>) {
        let Some(path) = result.pdf_path.as_deref().filter(|_| result.has_pdf()) else {
            return ("no valid path provided".to_string(), None);
        };
        let Some(patient_id) = patient_id else {
            return ("skipped: patient record unavailable".to_string(), None);
        };

        let group_id = match self
            .documents
            .find_or_create_group(patient_id, DOCUMENT_GROUP_KEY, DOCUMENT_GROUP_TITLE)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "Document group lookup failed");
                return (format!("error: {e}"), None);
            }
        };

        match self
            .documents
            .store_document(group_id, patient_id, path)
            .await
        {
            Ok(document_id) => ("uploaded".to_string(), Some(document_id)),
            Err(e) => {
                tracing::error!(session_id = %session_id, error = %e, "Document store failed");
                (format!("error: {e}"), None)
            }
        }
    }

    /// Remove the temp directory containing the agent's output file.
    /// Failure is logged, never propagated.
    async fn cleanup_temp(&self, session_id: &str, result: &AgentResult) {
        let Some(path) = result.pdf_path.as_deref() else {
            return;
        };
        let Some(parent) = Path::new(path).parent().and_then(|p| p.to_str()) else {
            return;
        };
        if parent.is_empty() {
            return;
        }
        if let Err(e) = self.cleaner.cleanup(parent).await {
            tracing::warn!(
                session_id = %session_id,
                path = %parent,
                error = %e,
                "Temp file cleanup failed",
            );
        }
    }
}

/// Split a full subject name into `(first, rest)`.
fn split_subject(subject: Option<&str>) -> (Option<String>, Option<String>) {
    let Some(subject) = subject.map(str::trim).filter(|s| !s.is_empty()) else {
        return (None, None);
    };
    match subject.split_once(' ') {
        Some((first, rest)) => (Some(first.to_string()), Some(rest.trim().to_string())),
        None => (Some(subject.to_string()), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_subject_handles_full_and_single_names() {
        assert_eq!(
            split_subject(Some("Jane Q Doe")),
            (Some("Jane".into()), Some("Q Doe".into()))
        );
        assert_eq!(split_subject(Some("Cher")), (Some("Cher".into()), None));
        assert_eq!(split_subject(Some("   ")), (None, None));
        assert_eq!(split_subject(None), (None, None));
    }
}
