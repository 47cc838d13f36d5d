//! Wire types for the automation agent's HTTP contract.

use serde::{Deserialize, Serialize};

/// Session state as reported by the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    Started,
    Running,
    WaitingForOtp,
    OtpSubmitted,
    Completed,
    Error,
    NotFound,
    /// Any status string this client does not recognize. The agent is
    /// externally owned; an unknown status is treated as "still in
    /// progress" rather than an error.
    #[serde(other)]
    Unknown,
}

impl SessionStatus {
    /// True for states after which the agent will report nothing new.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Error | SessionStatus::NotFound
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Created => "created",
            SessionStatus::Started => "started",
            SessionStatus::Running => "running",
            SessionStatus::WaitingForOtp => "waiting_for_otp",
            SessionStatus::OtpSubmitted => "otp_submitted",
            SessionStatus::Completed => "completed",
            SessionStatus::Error => "error",
            SessionStatus::NotFound => "not_found",
            SessionStatus::Unknown => "unknown",
        }
    }
}

/// Response from the agent after successfully starting a session.
#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionResponse {
    pub status: String,
    pub session_id: String,
}

/// Response from the agent's status endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionStatusResponse {
    pub status: SessionStatus,
    /// Opaque result payload, present only for completed sessions.
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Result payload attached to a completed session.
///
/// The agent is externally owned, so every field is optional and
/// checked rather than assumed. The raw JSON is retained for the
/// client-facing `session_update` event.
#[derive(Debug, Clone, Default)]
pub struct AgentResult {
    pub raw: serde_json::Value,
    pub pdf_path: Option<String>,
    pub eligibility: Option<String>,
}

impl AgentResult {
    /// Extract the known optional fields from an untrusted result value.
    pub fn from_value(raw: serde_json::Value) -> Self {
        let field = |name: &str| -> Option<String> {
            raw.get(name)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            pdf_path: field("pdf_path"),
            eligibility: field("eligibility"),
            raw,
        }
    }

    /// Whether the result references a path that looks like a PDF.
    pub fn has_pdf(&self) -> bool {
        self.pdf_path
            .as_deref()
            .is_some_and(|p| p.to_ascii_lowercase().ends_with(".pdf"))
    }
}
