//! Route definitions for sessions, team slots, and the WebSocket.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::session;
use crate::state::AppState;
use crate::ws;

/// Session routes mounted at `/sessions`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(session::create))
        .route("/sessions/{id}", get(session::get_by_id))
        .route("/sessions/{id}", put(session::update))
        .route("/sessions/{id}", delete(session::delete))
        .route("/sessions/token/{token}", get(session::get_by_token))
        .route("/sessions/{id}/end", post(session::end_session))
        .route("/sessions/{id}/cancel", post(session::cancel_session))
        .route("/sessions/{id}/extend", post(session::extend_series))
        .route(
            "/sessions/{id}/teams/{team}/claim",
            post(session::claim_team_slot),
        )
        .route(
            "/sessions/{id}/teams/{team}/release",
            post(session::release_team_slot),
        )
        .route(
            "/sessions/{id}/teams/{team}/side",
            post(session::select_side),
        )
        .route(
            "/sessions/{id}/teams/{team}/clear-side",
            post(session::clear_side),
        )
        .route("/sessions/{id}/teams/{team}/ready", post(session::set_ready))
        .route("/sessions/{id}/ws", get(ws::session_ws_handler))
}
