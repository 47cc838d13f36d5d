//! Per-session polling state machine.
//!
//! One poller task per agent session. The agent is polled, not pushed:
//! the loop queries session status on a fixed interval until it
//! observes a terminal state, the session starts waiting for an OTP,
//! or the attempt budget runs out. Terminal transitions remove the
//! session's registry entry; the `waiting_for_otp` transition leaves
//! it in place so the OTP handler can resume the session later.

use std::sync::Arc;
use std::time::Duration;

use benesync_agent::{AgentApi, AgentResult, SessionStatus};
use benesync_events::{EventBus, JobEvent};

use crate::pipeline::CompletionPipeline;
use crate::registry::JobRegistry;

/// Default interval between status queries.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Default cap on status queries per poller (~5 minutes wall-clock).
const DEFAULT_MAX_ATTEMPTS: u32 = 300;

/// Polling cadence and budget. Fixed interval, no backoff; the
/// automation's own duration dominates the wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct PollerConfig {
    pub poll_interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Drives one agent session to a terminal state.
pub struct SessionPoller {
    session_id: String,
    /// Where to push notifications; `None` means no one is listening.
    connection_id: Option<String>,
    agent: Arc<dyn AgentApi>,
    registry: Arc<JobRegistry>,
    pipeline: Arc<CompletionPipeline>,
    bus: Arc<EventBus>,
    config: PollerConfig,
}

impl SessionPoller {
    pub fn new(
        session_id: impl Into<String>,
        connection_id: Option<String>,
        agent: Arc<dyn AgentApi>,
        registry: Arc<JobRegistry>,
        pipeline: Arc<CompletionPipeline>,
        bus: Arc<EventBus>,
        config: PollerConfig,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            connection_id,
            agent,
            registry,
            pipeline,
            bus,
            config,
        }
    }

    /// Launch the poller as a supervised background task.
    ///
    /// The request handler never awaits the loop; the returned handle
    /// belongs to a watcher task that logs a panic inside the loop
    /// instead of letting it disappear silently.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        let session_id = self.session_id.clone();
        let inner = tokio::spawn(self.run());
        tokio::spawn(async move {
            if let Err(e) = inner.await {
                tracing::error!(
                    session_id = %session_id,
                    error = %e,
                    "Session poller task terminated abnormally",
                );
            }
        })
    }

    /// Run the polling loop to completion.
    ///
    /// Issues at most `max_attempts` status queries, sleeping
    /// `poll_interval` between them, and stops strictly after the
    /// first terminal observation. A transient agent error is logged
    /// and retried on the next tick; it is never surfaced and never
    /// consumes the session.
    pub async fn run(self) {
        tracing::info!(
            session_id = %self.session_id,
            max_attempts = self.config.max_attempts,
            "Session poller started",
        );

        for attempt in 1..=self.config.max_attempts {
            match self.agent.get_status(&self.session_id).await {
                Err(e) => {
                    tracing::warn!(
                        session_id = %self.session_id,
                        attempt,
                        error = %e,
                        "Transient error querying agent status",
                    );
                }
                Ok(response) => match response.status {
                    SessionStatus::WaitingForOtp => {
                        self.handle_waiting_for_otp(response.message).await;
                        return;
                    }
                    SessionStatus::Completed => {
                        self.handle_completed(response.result).await;
                        return;
                    }
                    SessionStatus::Error | SessionStatus::NotFound => {
                        self.handle_failed(response.status, response.message).await;
                        return;
                    }
                    status => {
                        tracing::debug!(
                            session_id = %self.session_id,
                            attempt,
                            status = status.as_str(),
                            "Session still in progress",
                        );
                    }
                },
            }

            // No sleep after the last attempt; the timeout is
            // synthesized immediately once the budget is spent.
            if attempt < self.config.max_attempts {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }

        self.handle_timeout().await;
    }

    /// The session needs human input. Notify the client and exit
    /// without touching the registry entry -- OTP submission re-launches
    /// a poller for this session id.
    async fn handle_waiting_for_otp(&self, message: Option<String>) {
        tracing::info!(session_id = %self.session_id, "Session waiting for OTP");
        self.bus.publish(JobEvent::otp_required(
            self.session_id.clone(),
            self.connection_id.clone(),
            message.unwrap_or_else(|| "OTP required for login".to_string()),
        ));
    }

    async fn handle_completed(&self, result: Option<serde_json::Value>) {
        let result = AgentResult::from_value(result.unwrap_or(serde_json::Value::Null));

        let final_summary = match self.registry.get(&self.session_id).await {
            Some(context) => {
                let summary = self
                    .pipeline
                    .run(&self.session_id, &context.request, &result)
                    .await;
                serde_json::to_value(&summary).ok()
            }
            None => {
                // Unknown session: the context was lost (should not
                // happen under the registry invariant). Report the raw
                // result without domain effects.
                tracing::warn!(
                    session_id = %self.session_id,
                    "Completed session has no registered context; skipping pipeline",
                );
                None
            }
        };

        tracing::info!(session_id = %self.session_id, "Session completed");
        self.bus.publish(JobEvent::session_update(
            self.session_id.clone(),
            self.connection_id.clone(),
            SessionStatus::Completed.as_str(),
            None,
            Some(result.raw),
            final_summary,
        ));
        self.registry.remove(&self.session_id).await;
    }

    async fn handle_failed(&self, status: SessionStatus, message: Option<String>) {
        tracing::warn!(
            session_id = %self.session_id,
            status = status.as_str(),
            message = message.as_deref().unwrap_or(""),
            "Session ended without result",
        );
        self.bus.publish(JobEvent::session_update(
            self.session_id.clone(),
            self.connection_id.clone(),
            status.as_str(),
            message,
            None,
            None,
        ));
        self.registry.remove(&self.session_id).await;
    }

    /// Attempt budget exhausted without a terminal status: synthesize
    /// a timeout, surfaced to the client as an error update.
    async fn handle_timeout(&self) {
        tracing::warn!(
            session_id = %self.session_id,
            attempts = self.config.max_attempts,
            "Polling timeout reached",
        );
        self.bus.publish(JobEvent::session_update(
            self.session_id.clone(),
            self.connection_id.clone(),
            "error",
            Some(format!(
                "Polling timeout: session did not reach a terminal state after {} attempts",
                self.config.max_attempts
            )),
            None,
            None,
        ));
        self.registry.remove(&self.session_id).await;
    }
}
