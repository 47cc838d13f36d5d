//! Eligibility-check handlers.
//!
//! `start_eligibility_check` kicks off an agent session and spawns a
//! background poller to drive it; `submit_otp` forwards a one-time
//! passcode to a stalled session and re-launches the poller.

use axum::extract::State;
use axum::Json;
use benesync_core::credentials::CredentialStore;
use benesync_core::eligibility::EligibilityRequest;
use benesync_events::JobEvent;
use benesync_jobs::poller::SessionPoller;
use benesync_jobs::registry::JobContext;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /api/v1/eligibility/check`.
#[derive(Debug, Deserialize)]
pub struct StartCheckRequest {
    pub member_id: String,
    pub date_of_birth: String,
    pub insurance_site_key: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    /// WebSocket connection id to push job events to, if the client has one.
    #[serde(default)]
    pub connection_id: Option<String>,
}

/// Response body for a successfully started check.
#[derive(Debug, Serialize)]
pub struct StartCheckResponse {
    pub status: &'static str,
    pub session_id: String,
}

/// Request body for `POST /api/v1/eligibility/otp`.
#[derive(Debug, Deserialize)]
pub struct SubmitOtpRequest {
    pub session_id: String,
    pub otp: String,
    #[serde(default)]
    pub connection_id: Option<String>,
}

/// POST /api/v1/eligibility/check -- start an eligibility check.
///
/// Validates the payload, enriches it with stored portal credentials,
/// asks the agent to start a session, registers the job, and spawns a
/// poller to drive it to completion. Returns immediately; progress is
/// delivered over the caller's WebSocket connection.
pub async fn start_eligibility_check(
    user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<StartCheckRequest>,
) -> AppResult<Json<StartCheckResponse>> {
    validate_start_request(&body)?;

    let request = enrich_request(&body, &state.credentials)?;

    let started = state.agent.start_session(&request).await.map_err(|e| {
        tracing::error!(error = %e, site = %request.insurance_site_key, "Agent refused to start session");
        AppError::BadGateway(format!("Failed to start eligibility check: {e}"))
    })?;

    if started.status != "started" {
        return Err(AppError::BadGateway(format!(
            "Agent returned unexpected start status '{}'",
            started.status
        )));
    }

    let session_id = started.session_id;
    tracing::info!(
        session_id = %session_id,
        user_id = user.user_id,
        site = %request.insurance_site_key,
        "Eligibility check started"
    );

    state
        .registry
        .put(JobContext {
            session_id: session_id.clone(),
            owner_user_id: user.user_id,
            request,
        })
        .await;

    spawn_poller(&state, &session_id, body.connection_id.clone());

    Ok(Json(StartCheckResponse {
        status: "started",
        session_id,
    }))
}

/// POST /api/v1/eligibility/otp -- forward a one-time passcode.
///
/// Relays the code to the agent, notifies the originating connection,
/// and re-launches a poller for the session (the original poller exited
/// when the session entered `waiting_for_otp`). Returns the agent's
/// acknowledgment verbatim.
pub async fn submit_otp(
    _user: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<SubmitOtpRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if body.session_id.trim().is_empty() {
        return Err(AppError::BadRequest("session_id is required".into()));
    }
    if body.otp.trim().is_empty() {
        return Err(AppError::BadRequest("otp is required".into()));
    }

    let ack = state
        .agent
        .submit_otp(&body.session_id, &body.otp)
        .await
        .map_err(|e| {
            tracing::error!(session_id = %body.session_id, error = %e, "OTP submission failed");
            AppError::InternalError(format!("Failed to submit OTP: {e}"))
        })?;

    tracing::info!(session_id = %body.session_id, "OTP submitted");

    if body.connection_id.is_some() {
        state.event_bus.publish(JobEvent::otp_submitted(
            body.session_id.clone(),
            body.connection_id.clone(),
            ack.clone(),
        ));
    }

    // The session resumes on the agent side; pick polling back up.
    spawn_poller(&state, &body.session_id, body.connection_id.clone());

    Ok(Json(ack))
}

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

fn validate_start_request(body: &StartCheckRequest) -> AppResult<()> {
    if body.member_id.trim().is_empty() {
        return Err(AppError::BadRequest("member_id is required".into()));
    }
    if body.date_of_birth.trim().is_empty() {
        return Err(AppError::BadRequest("date_of_birth is required".into()));
    }
    if body.insurance_site_key.trim().is_empty() {
        return Err(AppError::BadRequest("insurance_site_key is required".into()));
    }
    Ok(())
}

/// Combine caller fields with stored site credentials.
fn enrich_request(
    body: &StartCheckRequest,
    credentials: &CredentialStore,
) -> AppResult<EligibilityRequest> {
    let site_key = body.insurance_site_key.trim().to_uppercase();
    let creds = credentials.get(&site_key).ok_or_else(|| {
        AppError::NotFound(format!(
            "No credentials configured for insurance site '{site_key}'"
        ))
    })?;

    Ok(EligibilityRequest {
        member_id: body.member_id.trim().to_string(),
        date_of_birth: body.date_of_birth.trim().to_string(),
        insurance_site_key: site_key,
        username: creds.username.clone(),
        password: creds.password.clone(),
        first_name: body.first_name.clone(),
        last_name: body.last_name.clone(),
    })
}

/// Launch a background poller for the given session.
fn spawn_poller(state: &AppState, session_id: &str, connection_id: Option<String>) {
    SessionPoller::new(
        session_id,
        connection_id,
        state.agent.clone(),
        state.registry.clone(),
        state.pipeline.clone(),
        state.event_bus.clone(),
        state.poller_config,
    )
    .spawn();
}
