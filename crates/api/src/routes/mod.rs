pub mod chat;
pub mod game;
pub mod health;
pub mod ledger;
pub mod participant;
pub mod session;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /sessions                                   create
/// /sessions/{id}                              get, update, delete
/// /sessions/token/{token}                     invite-link resolution
/// /sessions/{id}/end                          finish series (POST)
/// /sessions/{id}/cancel                       cancel series (POST)
/// /sessions/{id}/extend                       raise planned games (POST)
/// /sessions/{id}/teams/{team}/claim           claim slot (POST)
/// /sessions/{id}/teams/{team}/release         vacate slot (POST)
/// /sessions/{id}/teams/{team}/side            select side (POST)
/// /sessions/{id}/teams/{team}/clear-side      clear side (POST)
/// /sessions/{id}/teams/{team}/ready           set/clear ready (POST)
///
/// /sessions/{id}/games                        list games
/// /games/{id}                                 get
/// /games/{id}/actions                         submit ban/pick (POST)
/// /games/{id}/edit-pick                       post-hoc correction (POST)
/// /games/{id}/fill-slot                       fill timed-out slot (POST)
/// /games/{id}/reset                           reset to step 0 (POST)
/// /games/{id}/winner                          record result (POST)
///
/// /sessions/{id}/participants                 list
/// /sessions/{id}/participants/join            join (POST)
/// /sessions/{id}/participants/leave           leave (POST)
///
/// /sessions/{id}/messages                     list, send
/// /sessions/{id}/ledger                       ledger read
/// /sessions/{id}/ws                           session WebSocket
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(session::router())
        .merge(game::router())
        .merge(participant::router())
        .merge(chat::router())
        .merge(ledger::router())
}
