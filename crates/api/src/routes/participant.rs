//! Route definitions for session participants.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::participant;
use crate::state::AppState;

/// Participant routes mounted under `/sessions/{id}/participants`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions/{id}/participants", get(participant::list))
        .route("/sessions/{id}/participants/join", post(participant::join))
        .route(
            "/sessions/{id}/participants/leave",
            post(participant::leave),
        )
}
