//! Route definitions.
//!
//! `/health` is mounted at root level; everything else lives under
//! `/api/v1`.

pub mod health;

use axum::routing::{any, post};
use axum::Router;

use crate::handlers::eligibility;
use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/eligibility/check",
            post(eligibility::start_eligibility_check),
        )
        .route("/eligibility/otp", post(eligibility::submit_otp))
        .route("/ws", any(ws::ws_handler))
}
