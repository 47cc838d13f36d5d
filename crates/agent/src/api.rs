//! REST client for the automation agent's HTTP endpoints.
//!
//! Wraps the agent service (session start, status polling, OTP
//! forwarding) using [`reqwest`]. The [`AgentApi`] trait is the seam
//! the orchestrator is written against; tests substitute scripted
//! implementations.

use async_trait::async_trait;
use benesync_core::eligibility::EligibilityRequest;

use crate::types::{SessionStatusResponse, StartSessionResponse};

/// Errors from the agent REST layer.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The agent returned a non-2xx status code.
    #[error("Agent API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The agent returned a 2xx response with an unusable body.
    #[error("Invalid agent response: {0}")]
    InvalidResponse(String),
}

/// The automation agent's three-operation contract.
#[async_trait]
pub trait AgentApi: Send + Sync {
    /// Ask the agent to start a new automation session.
    async fn start_session(
        &self,
        request: &EligibilityRequest,
    ) -> Result<StartSessionResponse, AgentError>;

    /// Fetch the current status of a session.
    async fn get_status(&self, session_id: &str) -> Result<SessionStatusResponse, AgentError>;

    /// Forward a one-time passcode to a session. Returns the agent's
    /// acknowledgment payload verbatim.
    async fn submit_otp(
        &self,
        session_id: &str,
        otp: &str,
    ) -> Result<serde_json::Value, AgentError>;
}

/// HTTP client for a single agent instance.
pub struct AgentHttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl AgentHttpClient {
    /// Create a new client for the agent at `base_url`
    /// (e.g. `http://localhost:8000`).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling).
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    // ---- private helpers ----

    fn start_url(&self) -> String {
        format!("{}/eligibility-check/start", self.base_url)
    }

    fn status_url(&self, session_id: &str) -> String {
        format!("{}/eligibility-check/status/{}", self.base_url, session_id)
    }

    fn otp_url(&self) -> String {
        format!("{}/eligibility-check/otp", self.base_url)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`AgentError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, AgentError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AgentError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AgentError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl AgentApi for AgentHttpClient {
    async fn start_session(
        &self,
        request: &EligibilityRequest,
    ) -> Result<StartSessionResponse, AgentError> {
        let response = self
            .client
            .post(self.start_url())
            .json(request)
            .send()
            .await?;

        let started: StartSessionResponse = Self::parse_response(response).await?;
        if started.session_id.is_empty() {
            return Err(AgentError::InvalidResponse(
                "agent acknowledged start without a session_id".into(),
            ));
        }
        Ok(started)
    }

    async fn get_status(&self, session_id: &str) -> Result<SessionStatusResponse, AgentError> {
        let response = self
            .client
            .get(self.status_url(session_id))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    async fn submit_otp(
        &self,
        session_id: &str,
        otp: &str,
    ) -> Result<serde_json::Value, AgentError> {
        let body = serde_json::json!({
            "session_id": session_id,
            "otp": otp,
        });

        let response = self
            .client
            .post(self.otp_url())
            .json(&body)
            .send()
            .await?;

        Self::parse_response(response).await
    }
}
