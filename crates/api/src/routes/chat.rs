//! Route definitions for session chat.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::chat;
use crate::state::AppState;

/// Chat routes mounted under `/sessions/{id}/messages`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions/{id}/messages", get(chat::list))
        .route("/sessions/{id}/messages", post(chat::send))
}
