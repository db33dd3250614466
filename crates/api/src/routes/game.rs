//! Route definitions for draft games.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::game;
use crate::state::AppState;

/// Game routes.
///
/// ```text
/// GET  /sessions/{id}/games      -> list_for_session
/// GET  /games/{id}               -> get_by_id
/// POST /games/{id}/actions       -> submit_action
/// POST /games/{id}/edit-pick     -> edit_pick
/// POST /games/{id}/fill-slot     -> fill_timed_out_slot
/// POST /games/{id}/reset         -> reset_game
/// POST /games/{id}/winner        -> set_winner
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions/{id}/games", get(game::list_for_session))
        .route("/games/{id}", get(game::get_by_id))
        .route("/games/{id}/actions", post(game::submit_action))
        .route("/games/{id}/edit-pick", post(game::edit_pick))
        .route("/games/{id}/fill-slot", post(game::fill_timed_out_slot))
        .route("/games/{id}/reset", post(game::reset_game))
        .route("/games/{id}/winner", post(game::set_winner))
}
