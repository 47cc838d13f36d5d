//! Shared fixtures for the API crate tests: a configurable agent double
//! and an [`AppState`] builder wired to in-memory collaborators.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use benesync_agent::{
    AgentApi, AgentError, SessionStatus, SessionStatusResponse, StartSessionResponse,
};
use benesync_api::auth::jwt::JwtConfig;
use benesync_api::config::ServerConfig;
use benesync_api::state::AppState;
use benesync_api::ws::WsManager;
use benesync_core::credentials::{CredentialStore, SiteCredentials};
use benesync_core::eligibility::EligibilityRequest;
use benesync_events::EventBus;
use benesync_jobs::memory::default_collaborators;
use benesync_jobs::pipeline::CompletionPipeline;
use benesync_jobs::poller::PollerConfig;
use benesync_jobs::registry::JobRegistry;
use tokio::sync::Mutex;

/// Build the full application router around the given agent double.
///
/// This goes through [`build_app_router`] so integration tests exercise
/// the same middleware stack (CORS, request ID, timeout, tracing, panic
/// recovery) that production uses.
pub fn build_test_app(agent: Arc<dyn AgentApi>) -> axum::Router {
    let state = test_state(agent);
    let config = test_config();
    benesync_api::router::build_app_router(state, &config)
}

/// Issue a GET request against the app and return the raw response.
pub async fn get(app: axum::Router, uri: &str) -> axum::response::Response {
    use tower::ServiceExt;

    let request = axum::http::Request::builder()
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should collect");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Agent double whose responses are fixed at construction time.
pub struct MockAgent {
    pub start_response: Mutex<Option<Result<StartSessionResponse, AgentError>>>,
    pub status_response: SessionStatusResponse,
    pub otp_response: Mutex<Option<Result<serde_json::Value, AgentError>>>,
}

impl MockAgent {
    /// Agent that starts sessions successfully and accepts OTPs.
    pub fn happy(session_id: &str) -> Arc<Self> {
        Arc::new(Self {
            start_response: Mutex::new(Some(Ok(StartSessionResponse {
                status: "started".into(),
                session_id: session_id.into(),
            }))),
            status_response: SessionStatusResponse {
                status: SessionStatus::Running,
                result: None,
                message: None,
            },
            otp_response: Mutex::new(Some(Ok(serde_json::json!({
                "status": "ok",
                "message": "otp accepted",
            })))),
        })
    }

    /// Agent whose start endpoint is unreachable.
    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            start_response: Mutex::new(Some(Err(AgentError::InvalidResponse(
                "connection refused".into(),
            )))),
            status_response: SessionStatusResponse {
                status: SessionStatus::Running,
                result: None,
                message: None,
            },
            otp_response: Mutex::new(Some(Err(AgentError::InvalidResponse(
                "connection refused".into(),
            )))),
        })
    }
}

#[async_trait]
impl AgentApi for MockAgent {
    async fn start_session(
        &self,
        _request: &EligibilityRequest,
    ) -> Result<StartSessionResponse, AgentError> {
        self.start_response
            .lock()
            .await
            .take()
            .unwrap_or(Err(AgentError::InvalidResponse("start exhausted".into())))
    }

    async fn get_status(&self, _session_id: &str) -> Result<SessionStatusResponse, AgentError> {
        Ok(self.status_response.clone())
    }

    async fn submit_otp(
        &self,
        _session_id: &str,
        _otp: &str,
    ) -> Result<serde_json::Value, AgentError> {
        self.otp_response
            .lock()
            .await
            .take()
            .unwrap_or(Err(AgentError::InvalidResponse("otp exhausted".into())))
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        agent_base_url: "http://localhost:8000".to_string(),
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Credential store with a single `MH` portal configured.
pub fn test_credentials() -> CredentialStore {
    let mut store = CredentialStore::new();
    store.insert(
        "MH",
        SiteCredentials {
            username: "provider@example.com".into(),
            password: "portal-pass".into(),
        },
    );
    store
}

/// Build an `AppState` around the given agent double.
///
/// Pollers spawned through this state tick every millisecond with a small
/// attempt budget so tests never wait on real polling cadence.
pub fn test_state(agent: Arc<dyn AgentApi>) -> AppState {
    let (patients, documents, extractor, cleaner) = default_collaborators();
    let pipeline = Arc::new(CompletionPipeline::new(
        patients, documents, extractor, cleaner,
    ));

    AppState {
        config: Arc::new(test_config()),
        credentials: Arc::new(test_credentials()),
        ws_manager: Arc::new(WsManager::new()),
        registry: Arc::new(JobRegistry::new()),
        agent,
        pipeline,
        event_bus: Arc::new(EventBus::default()),
        poller_config: PollerConfig {
            poll_interval: std::time::Duration::from_millis(10),
            max_attempts: 3,
        },
    }
}
