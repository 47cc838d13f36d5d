//! Collaborator contracts for external persistence and extraction.
//!
//! The concrete implementations (relational patient store, binary
//! document storage, PDF text extraction) live outside this system;
//! these traits are the seams the completion pipeline is written
//! against. All are object-safe so they can be shared as
//! `Arc<dyn Trait>` across tasks.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::patient::{NewPatient, Patient, PatientUpdate};
use crate::types::DbId;

/// Patient record persistence, keyed by insurance member id.
#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn find_by_member_id(&self, member_id: &str) -> Result<Option<Patient>, CoreError>;

    async fn create(&self, new: NewPatient) -> Result<Patient, CoreError>;

    /// Apply a partial update; `None` fields are left untouched.
    async fn update(&self, id: DbId, update: PatientUpdate) -> Result<Patient, CoreError>;
}

/// Document group + document persistence.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Resolve the document group for `(patient_id, group_key)`,
    /// creating it with the given human title when absent.
    ///
    /// The stable `group_key` is the lookup key; the title is display
    /// metadata only.
    async fn find_or_create_group(
        &self,
        patient_id: DbId,
        group_key: &str,
        title: &str,
    ) -> Result<DbId, CoreError>;

    /// Store a document under a group. Append semantics: every call
    /// creates a new document row.
    async fn store_document(
        &self,
        group_id: DbId,
        patient_id: DbId,
        file_path: &str,
    ) -> Result<DbId, CoreError>;
}

/// Best-effort subject-name extraction from a PDF document.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Returns the extracted subject name, `Ok(None)` when the document
    /// carries no recognizable subject.
    async fn extract_subject(&self, pdf_path: &str) -> Result<Option<String>, CoreError>;
}

/// Cleanup of temporary files produced by the automation agent.
#[async_trait]
pub trait TempFileCleaner: Send + Sync {
    async fn cleanup(&self, path: &str) -> Result<(), CoreError>;
}
