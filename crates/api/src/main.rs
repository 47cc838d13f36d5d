use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use benesync_agent::AgentHttpClient;
use benesync_api::config::ServerConfig;
use benesync_api::notifications::NotificationRouter;
use benesync_api::router::build_app_router;
use benesync_api::state::AppState;
use benesync_api::ws;
use benesync_core::credentials::CredentialStore;
use benesync_events::EventBus;
use benesync_jobs::memory::default_collaborators;
use benesync_jobs::pipeline::CompletionPipeline;
use benesync_jobs::poller::PollerConfig;
use benesync_jobs::registry::JobRegistry;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "benesync_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Portal credentials ---
    let credentials = Arc::new(CredentialStore::from_env());
    if credentials.is_empty() {
        tracing::warn!(
            "No portal credentials configured (SITE_<KEY>_USERNAME/_PASSWORD); \
             every eligibility request will be rejected"
        );
    } else {
        tracing::info!(sites = credentials.len(), "Loaded portal credentials");
    }

    // --- WebSocket manager ---
    let ws_manager = Arc::new(ws::WsManager::new());

    // --- Heartbeat ---
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));

    // --- Job registry ---
    let registry = Arc::new(JobRegistry::new());

    // --- Agent client ---
    let agent = Arc::new(AgentHttpClient::new(config.agent_base_url.clone()));
    tracing::info!(agent_base_url = %config.agent_base_url, "Agent client ready");

    // --- Completion pipeline ---
    let (patients, documents, extractor, cleaner) = default_collaborators();
    let pipeline = Arc::new(CompletionPipeline::new(
        patients, documents, extractor, cleaner,
    ));

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    tracing::info!("Event bus created");

    // Spawn notification router (routes job events to client connections).
    let notification_router = NotificationRouter::new(Arc::clone(&ws_manager));
    let router_handle = tokio::spawn(notification_router.run(event_bus.subscribe()));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        credentials,
        ws_manager: Arc::clone(&ws_manager),
        registry,
        agent,
        pipeline,
        event_bus: Arc::clone(&event_bus),
        poller_config: PollerConfig::default(),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    // Drop the event bus sender to close the broadcast channel.
    // This signals the notification router to shut down.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), router_handle).await;
    tracing::info!("Notification router shut down");

    heartbeat_handle.abort();
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
