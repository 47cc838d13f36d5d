//! Shared application state threaded through every handler.

use std::sync::Arc;

use benesync_agent::api::AgentApi;
use benesync_core::credentials::CredentialStore;
use benesync_events::bus::EventBus;
use benesync_jobs::pipeline::CompletionPipeline;
use benesync_jobs::poller::PollerConfig;
use benesync_jobs::registry::JobRegistry;

use crate::config::ServerConfig;
use crate::ws::manager::WsManager;

/// Shared application state, cloned into each request handler.
///
/// All fields are `Arc`-wrapped so cloning the state is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (bind address, CORS, JWT, agent URL).
    pub config: Arc<ServerConfig>,
    /// Per-site portal credentials loaded at startup.
    pub credentials: Arc<CredentialStore>,
    /// Active WebSocket connections keyed by connection id.
    pub ws_manager: Arc<WsManager>,
    /// In-flight eligibility jobs keyed by session id.
    pub registry: Arc<JobRegistry>,
    /// HTTP client for the browser-automation agent.
    pub agent: Arc<dyn AgentApi>,
    /// Post-completion reconciliation pipeline.
    pub pipeline: Arc<CompletionPipeline>,
    /// Broadcast bus the pollers publish job events onto.
    pub event_bus: Arc<EventBus>,
    /// Poll interval / attempt budget for spawned session pollers.
    pub poller_config: PollerConfig,
}
