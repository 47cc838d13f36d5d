//! Shared fixtures for the jobs crate tests: a scriptable agent,
//! recording/failing collaborators, and domain object builders.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use benesync_agent::{
    AgentApi, AgentError, SessionStatus, SessionStatusResponse, StartSessionResponse,
};
use benesync_core::collaborators::{TempFileCleaner, TextExtractor};
use benesync_core::eligibility::EligibilityRequest;
use benesync_core::error::CoreError;
use benesync_core::patient::{Patient, PatientStatus};
use tokio::sync::Mutex;

/// One scripted reply from the fake agent.
pub enum ScriptItem {
    Status(SessionStatusResponse),
    /// Simulated network failure while querying the agent.
    TransientError,
}

/// Agent double that replays a script of status responses, then keeps
/// returning a fallback response. Counts every status query.
pub struct ScriptedAgent {
    script: Mutex<VecDeque<ScriptItem>>,
    fallback: SessionStatusResponse,
    status_calls: AtomicU32,
}

impl ScriptedAgent {
    pub fn new(script: Vec<ScriptItem>, fallback: SessionStatusResponse) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            fallback,
            status_calls: AtomicU32::new(0),
        })
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AgentApi for ScriptedAgent {
    async fn start_session(
        &self,
        _request: &EligibilityRequest,
    ) -> Result<StartSessionResponse, AgentError> {
        Ok(StartSessionResponse {
            status: "started".into(),
            session_id: "scripted-session".into(),
        })
    }

    async fn get_status(&self, _session_id: &str) -> Result<SessionStatusResponse, AgentError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().await.pop_front() {
            Some(ScriptItem::Status(response)) => Ok(response),
            Some(ScriptItem::TransientError) => Err(AgentError::InvalidResponse(
                "simulated network failure".into(),
            )),
            None => Ok(self.fallback.clone()),
        }
    }

    async fn submit_otp(
        &self,
        _session_id: &str,
        _otp: &str,
    ) -> Result<serde_json::Value, AgentError> {
        Ok(serde_json::json!({"status": "ok", "message": "otp accepted"}))
    }
}

/// Status response shorthand.
pub fn status(status: SessionStatus) -> SessionStatusResponse {
    SessionStatusResponse {
        status,
        result: None,
        message: None,
    }
}

pub fn status_with_result(
    status: SessionStatus,
    result: serde_json::Value,
) -> SessionStatusResponse {
    SessionStatusResponse {
        status,
        result: Some(result),
        message: None,
    }
}

/// Extractor that always returns the same subject.
pub struct FixedExtractor(pub Option<String>);

#[async_trait]
impl TextExtractor for FixedExtractor {
    async fn extract_subject(&self, _pdf_path: &str) -> Result<Option<String>, CoreError> {
        Ok(self.0.clone())
    }
}

/// Extractor that always fails.
pub struct FailingExtractor;

#[async_trait]
impl TextExtractor for FailingExtractor {
    async fn extract_subject(&self, _pdf_path: &str) -> Result<Option<String>, CoreError> {
        Err(CoreError::Internal("extraction service unavailable".into()))
    }
}

/// Cleaner that records the paths it was asked to remove.
#[derive(Default)]
pub struct RecordingCleaner {
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl TempFileCleaner for RecordingCleaner {
    async fn cleanup(&self, path: &str) -> Result<(), CoreError> {
        self.calls.lock().await.push(path.to_string());
        Ok(())
    }
}

pub fn request(member_id: &str, site_key: &str) -> EligibilityRequest {
    EligibilityRequest {
        member_id: member_id.into(),
        date_of_birth: "01/02/1980".into(),
        insurance_site_key: site_key.into(),
        username: "provider@example.com".into(),
        password: "secret".into(),
        first_name: None,
        last_name: None,
    }
}

pub fn patient(id: i64, member_id: &str, status: PatientStatus) -> Patient {
    Patient {
        id,
        member_id: member_id.into(),
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        date_of_birth: "01/02/1980".into(),
        status,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}
