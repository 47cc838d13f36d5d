//! In-memory collaborator implementations.
//!
//! The real patient store, document storage, and PDF extraction are
//! external services; these stand-ins back the binary in development
//! and are the fixtures the pipeline tests run against.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use benesync_core::collaborators::{DocumentStore, PatientStore, TempFileCleaner, TextExtractor};
use benesync_core::error::CoreError;
use benesync_core::patient::{NewPatient, Patient, PatientUpdate};
use benesync_core::types::{DbId, Timestamp};
use tokio::sync::RwLock;

// ---------------------------------------------------------------------------
// MemoryPatientStore
// ---------------------------------------------------------------------------

/// Patient store backed by a `HashMap` keyed by member id.
pub struct MemoryPatientStore {
    patients: RwLock<HashMap<String, Patient>>,
    next_id: AtomicI64,
}

impl MemoryPatientStore {
    pub fn new() -> Self {
        Self {
            patients: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Seed an existing patient (test helper).
    pub async fn seed(&self, patient: Patient) {
        self.patients
            .write()
            .await
            .insert(patient.member_id.clone(), patient);
    }

    pub async fn len(&self) -> usize {
        self.patients.read().await.len()
    }
}

impl Default for MemoryPatientStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PatientStore for MemoryPatientStore {
    async fn find_by_member_id(&self, member_id: &str) -> Result<Option<Patient>, CoreError> {
        Ok(self.patients.read().await.get(member_id).cloned())
    }

    async fn create(&self, new: NewPatient) -> Result<Patient, CoreError> {
        let mut patients = self.patients.write().await;
        if patients.contains_key(&new.member_id) {
            return Err(CoreError::Conflict(format!(
                "patient with member id {} already exists",
                new.member_id
            )));
        }
        let now: Timestamp = chrono::Utc::now();
        let patient = Patient {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            member_id: new.member_id.clone(),
            first_name: new.first_name,
            last_name: new.last_name,
            date_of_birth: new.date_of_birth,
            status: new.status,
            created_at: now,
            updated_at: now,
        };
        patients.insert(new.member_id, patient.clone());
        Ok(patient)
    }

    async fn update(&self, id: DbId, update: PatientUpdate) -> Result<Patient, CoreError> {
        let mut patients = self.patients.write().await;
        let patient = patients
            .values_mut()
            .find(|p| p.id == id)
            .ok_or(CoreError::NotFound {
                entity: "Patient",
                id,
            })?;

        if let Some(first_name) = update.first_name {
            patient.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            patient.last_name = last_name;
        }
        if let Some(date_of_birth) = update.date_of_birth {
            patient.date_of_birth = date_of_birth;
        }
        if let Some(status) = update.status {
            patient.status = status;
        }
        patient.updated_at = chrono::Utc::now();
        Ok(patient.clone())
    }
}

// ---------------------------------------------------------------------------
// MemoryDocumentStore
// ---------------------------------------------------------------------------

/// A stored document row.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: DbId,
    pub group_id: DbId,
    pub patient_id: DbId,
    pub file_path: String,
}

/// Document store with create-if-absent groups keyed by
/// `(patient_id, group_key)` and append-only document rows.
pub struct MemoryDocumentStore {
    groups: RwLock<HashMap<(DbId, String), DbId>>,
    documents: RwLock<Vec<StoredDocument>>,
    next_id: AtomicI64,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
            documents: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub async fn group_count(&self) -> usize {
        self.groups.read().await.len()
    }

    pub async fn documents(&self) -> Vec<StoredDocument> {
        self.documents.read().await.clone()
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn find_or_create_group(
        &self,
        patient_id: DbId,
        group_key: &str,
        _title: &str,
    ) -> Result<DbId, CoreError> {
        let mut groups = self.groups.write().await;
        let id = groups
            .entry((patient_id, group_key.to_string()))
            .or_insert_with(|| self.next_id.fetch_add(1, Ordering::Relaxed));
        Ok(*id)
    }

    async fn store_document(
        &self,
        group_id: DbId,
        patient_id: DbId,
        file_path: &str,
    ) -> Result<DbId, CoreError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.documents.write().await.push(StoredDocument {
            id,
            group_id,
            patient_id,
            file_path: file_path.to_string(),
        });
        Ok(id)
    }
}

// ---------------------------------------------------------------------------
// NoopExtractor
// ---------------------------------------------------------------------------

/// Extractor that never finds a subject. Used when no extraction
/// service is configured.
#[derive(Default)]
pub struct NoopExtractor;

#[async_trait]
impl TextExtractor for NoopExtractor {
    async fn extract_subject(&self, _pdf_path: &str) -> Result<Option<String>, CoreError> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// TempDirCleaner
// ---------------------------------------------------------------------------

/// Removes the temp directory the agent wrote its output into.
#[derive(Default)]
pub struct TempDirCleaner;

#[async_trait]
impl TempFileCleaner for TempDirCleaner {
    async fn cleanup(&self, path: &str) -> Result<(), CoreError> {
        tokio::fs::remove_dir_all(path)
            .await
            .map_err(|e| CoreError::Internal(format!("failed to remove {path}: {e}")))
    }
}

/// Convenience constructor bundle for the binary: in-memory stores,
/// no-op extraction, real temp-dir cleanup.
pub fn default_collaborators() -> (
    Arc<MemoryPatientStore>,
    Arc<MemoryDocumentStore>,
    Arc<NoopExtractor>,
    Arc<TempDirCleaner>,
) {
    (
        Arc::new(MemoryPatientStore::new()),
        Arc::new(MemoryDocumentStore::new()),
        Arc::new(NoopExtractor),
        Arc::new(TempDirCleaner),
    )
}
