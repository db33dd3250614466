//! Route definition for the champion ledger read.

use axum::routing::get;
use axum::Router;

use crate::handlers::ledger;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/sessions/{id}/ledger", get(ledger::list))
}
