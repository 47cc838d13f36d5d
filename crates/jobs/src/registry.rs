//! In-memory registry of in-flight automation sessions.
//!
//! The registry is the only durable memory of an active session: an
//! absent entry means "unknown session". At most one context exists per
//! session id; entries are removed exactly once, by the poller, on a
//! terminal transition.

use std::collections::HashMap;

use benesync_core::eligibility::EligibilityRequest;
use benesync_core::types::DbId;
use tokio::sync::RwLock;

/// Everything remembered about one in-flight session.
#[derive(Debug, Clone)]
pub struct JobContext {
    /// Opaque session id issued by the agent.
    pub session_id: String,
    /// The authenticated user who started the job.
    pub owner_user_id: DbId,
    /// Enriched request payload, immutable after creation.
    pub request: EligibilityRequest,
}

/// Process-wide mapping from session id to [`JobContext`].
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc`
/// and shared across the application. Registry mutation for a given
/// session id is owned by the poller that created the entry (the OTP
/// path only reads), so no cross-task write races occur.
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, JobContext>>,
}

impl JobRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a context, overwriting any stale entry with the same id.
    ///
    /// Under the one-entry-per-session invariant an overwrite should
    /// not occur; when it does the stale entry is logged and replaced.
    pub async fn put(&self, context: JobContext) {
        let session_id = context.session_id.clone();
        if let Some(stale) = self.jobs.write().await.insert(session_id.clone(), context) {
            tracing::warn!(
                session_id = %session_id,
                owner_user_id = stale.owner_user_id,
                "Replaced stale job context for session",
            );
        }
    }

    /// Look up the context for a session id.
    pub async fn get(&self, session_id: &str) -> Option<JobContext> {
        self.jobs.read().await.get(session_id).cloned()
    }

    /// Remove a context. Removing an absent key is a no-op.
    pub async fn remove(&self, session_id: &str) {
        self.jobs.write().await.remove(session_id);
    }

    /// Number of in-flight sessions.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}
