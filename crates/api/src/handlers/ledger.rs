//! Handler for reading a session's unavailable-champion ledger.

use axum::extract::{Path, State};
use axum::Json;

use riftdraft_core::error::CoreError;
use riftdraft_core::types::DbId;
use riftdraft_db::models::ledger::LedgerEntry;
use riftdraft_db::repositories::{LedgerRepo, SessionRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/sessions/{id}/ledger
///
/// The append-only record of champions consumed by past games. Clients
/// use it to grey out unavailable champions; the server re-derives the
/// same restrictions on every submission, so this read is advisory.
pub async fn list(
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<LedgerEntry>>>> {
    SessionRepo::find_by_id(&state.pool, session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Session",
            id: session_id,
        }))?;
    let entries = LedgerRepo::list_for_session(&state.pool, session_id).await?;
    Ok(Json(DataResponse { data: entries }))
}
