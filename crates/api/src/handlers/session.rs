//! Handlers for the `/sessions` resource: CRUD, the team-slot claim /
//! side / ready handshake, and series lifecycle.
//!
//! Every state-changing endpoint returns the new authoritative session
//! snapshot (or a structured failure) — never a partial result. Slot and
//! side races are resolved by the repository's guarded UPDATEs; a `None`
//! from the repo means the caller lost and surfaces as 409.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use validator::Validate;

use riftdraft_core::draft::{DraftMode, SessionStatus, Side, TeamSlot};
use riftdraft_core::error::CoreError;
use riftdraft_core::identity::CaptainIdentity;
use riftdraft_core::session_rules::{
    validate_phase_seconds, validate_planned_games, validate_session_name, validate_transition,
};
use riftdraft_core::types::DbId;
use riftdraft_db::models::session::{DraftSession, NewSession, ReadyTransition, UpdateSession};
use riftdraft_db::repositories::SessionRepo;
use riftdraft_events::DraftEvent;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Length of generated invite tokens.
const INVITE_TOKEN_LENGTH: usize = 12;

fn generate_invite_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(INVITE_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
    /// One of `normal`, `fearless`, `ironman`. Defaults to `normal`.
    pub draft_mode: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub planned_games: Option<i32>,
    #[validate(range(min = 10, max = 300))]
    pub ban_seconds: Option<i32>,
    #[validate(range(min = 10, max = 300))]
    pub pick_seconds: Option<i32>,
}

/// Identity fields shared by every team-slot operation. Mutually
/// exclusive schemes: a stable user id or a claimed display name.
#[derive(Debug, Deserialize)]
pub struct IdentityRequest {
    pub user_id: Option<DbId>,
    pub display_name: Option<String>,
}

impl IdentityRequest {
    fn resolve(&self) -> Result<CaptainIdentity, CoreError> {
        CaptainIdentity::from_parts(self.user_id, self.display_name.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectSideRequest {
    #[serde(flatten)]
    pub identity: IdentityRequest,
    /// `blue` or `red`.
    pub side: String,
}

#[derive(Debug, Deserialize)]
pub struct SetReadyRequest {
    #[serde(flatten)]
    pub identity: IdentityRequest,
    pub ready: bool,
}

#[derive(Debug, Deserialize)]
pub struct ExtendSeriesRequest {
    pub planned_games: i32,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_team(team: i32) -> Result<TeamSlot, AppError> {
    TeamSlot::from_number(team)
        .ok_or_else(|| AppError::BadRequest(format!("Team must be 1 or 2, got {team}")))
}

async fn moderate(state: &AppState, texts: &[&str]) -> Result<(), AppError> {
    let verdict = state
        .moderation
        .check(texts)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    if verdict.flagged {
        return Err(AppError::Core(CoreError::Moderation(
            verdict
                .reason
                .unwrap_or_else(|| "Content was flagged by moderation".to_string()),
        )));
    }
    Ok(())
}

fn session_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Session",
        id,
    })
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/sessions
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateSessionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<DraftSession>>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    validate_session_name(&input.display_name).map_err(AppError::Core)?;

    let draft_mode = match &input.draft_mode {
        Some(raw) => DraftMode::parse(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown draft mode '{raw}'")))?,
        None => DraftMode::Normal,
    };

    moderate(&state, &[&input.display_name]).await?;

    let new_session = NewSession {
        invite_token: generate_invite_token(),
        display_name: input.display_name,
        draft_mode: draft_mode.as_str().to_string(),
        planned_games: input.planned_games.unwrap_or(1),
        ban_seconds: input.ban_seconds.unwrap_or(30),
        pick_seconds: input.pick_seconds.unwrap_or(30),
    };

    let session = SessionRepo::create(&state.pool, &new_session).await?;
    tracing::info!(session_id = session.id, mode = %session.draft_mode, "Session created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}

/// GET /api/v1/sessions/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DraftSession>>> {
    let session = SessionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| session_not_found(id))?;
    Ok(Json(DataResponse { data: session }))
}

/// GET /api/v1/sessions/token/{token}
///
/// Invite-link resolution for joining clients.
pub async fn get_by_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<DraftSession>>> {
    let session = SessionRepo::find_by_token(&state.pool, &token)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Session",
            id: 0,
        }))?;
    Ok(Json(DataResponse { data: session }))
}

/// PUT /api/v1/sessions/{id}
///
/// Patch session settings. Status changes are limited to the pause /
/// resume pair here; use the end/cancel endpoints to terminate. Mode and
/// timer changes are only accepted in the lobby.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSession>,
) -> AppResult<Json<DataResponse<DraftSession>>> {
    let session = SessionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| session_not_found(id))?;
    let current_status = session
        .session_status()
        .ok_or_else(|| AppError::InternalError("Session has invalid status".into()))?;

    if let Some(name) = &input.display_name {
        validate_session_name(name).map_err(AppError::Core)?;
        moderate(&state, &[name]).await?;
    }
    if let Some(raw) = &input.draft_mode {
        DraftMode::parse(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown draft mode '{raw}'")))?;
        if current_status != SessionStatus::Lobby {
            return Err(AppError::Core(CoreError::Precondition(
                "Draft mode can only change in the lobby".to_string(),
            )));
        }
    }
    if let Some(n) = input.planned_games {
        validate_planned_games(n).map_err(AppError::Core)?;
        if n < session.current_game_number {
            return Err(AppError::Core(CoreError::Precondition(format!(
                "Planned games cannot drop below the current game number ({})",
                session.current_game_number
            ))));
        }
    }
    for secs in [input.ban_seconds, input.pick_seconds].into_iter().flatten() {
        validate_phase_seconds(secs).map_err(AppError::Core)?;
        if current_status != SessionStatus::Lobby {
            return Err(AppError::Core(CoreError::Precondition(
                "Timer limits can only change in the lobby".to_string(),
            )));
        }
    }
    if let Some(raw) = &input.status {
        let target = SessionStatus::parse(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown status '{raw}'")))?;
        if target.is_terminal() {
            return Err(AppError::BadRequest(
                "Use the end or cancel endpoints to terminate a session".to_string(),
            ));
        }
        validate_transition(current_status, target).map_err(AppError::Core)?;
    }

    let updated = SessionRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::Conflict(
            "Session was terminated concurrently".to_string(),
        )))?;

    state
        .event_bus
        .publish(DraftEvent::new("session.updated", id));
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/sessions/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = SessionRepo::delete(&state.pool, id).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(id))
    }
}

// ---------------------------------------------------------------------------
// Series lifecycle
// ---------------------------------------------------------------------------

/// POST /api/v1/sessions/{id}/end
///
/// Finish a series. Pending games are discarded and the planned/current
/// game numbers freeze at the count of completed games, so history never
/// overstates the series.
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DraftSession>>> {
    finish_session(state, id, SessionStatus::Completed).await
}

/// POST /api/v1/sessions/{id}/cancel
pub async fn cancel_session(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DraftSession>>> {
    finish_session(state, id, SessionStatus::Cancelled).await
}

async fn finish_session(
    state: AppState,
    id: DbId,
    target: SessionStatus,
) -> AppResult<Json<DataResponse<DraftSession>>> {
    let session = SessionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| session_not_found(id))?;
    let current = session
        .session_status()
        .ok_or_else(|| AppError::InternalError("Session has invalid status".into()))?;
    validate_transition(current, target).map_err(AppError::Core)?;

    let finished = SessionRepo::finish(&state.pool, id, target.as_str())
        .await?
        .ok_or(AppError::Core(CoreError::Conflict(
            "Session was terminated concurrently".to_string(),
        )))?;

    tracing::info!(
        session_id = id,
        status = %finished.status,
        games = finished.current_game_number,
        "Session finished"
    );
    state
        .event_bus
        .publish(DraftEvent::new("session.updated", id));
    state.event_bus.publish(DraftEvent::new("game.updated", id));
    Ok(Json(DataResponse { data: finished }))
}

/// POST /api/v1/sessions/{id}/extend
///
/// Raise the planned game count (e.g. a best-of-3 extended to best-of-5).
pub async fn extend_series(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ExtendSeriesRequest>,
) -> AppResult<Json<DataResponse<DraftSession>>> {
    validate_planned_games(input.planned_games).map_err(AppError::Core)?;

    let session = SessionRepo::extend_series(&state.pool, id, input.planned_games)
        .await?
        .ok_or(AppError::Core(CoreError::Precondition(
            "Series can only be extended on an active session, to a larger game count".to_string(),
        )))?;

    state
        .event_bus
        .publish(DraftEvent::new("session.updated", id));
    Ok(Json(DataResponse { data: session }))
}

// ---------------------------------------------------------------------------
// Team slots
// ---------------------------------------------------------------------------

/// POST /api/v1/sessions/{id}/teams/{team}/claim
///
/// Claim a team slot. Idempotent for the same identity; 409 when the slot
/// is held by someone else.
pub async fn claim_team_slot(
    State(state): State<AppState>,
    Path((id, team)): Path<(DbId, i32)>,
    Json(input): Json<IdentityRequest>,
) -> AppResult<Json<DataResponse<DraftSession>>> {
    let slot = parse_team(team)?;
    let identity = input.resolve().map_err(AppError::Core)?;

    // Claimed display names become visible to the whole session.
    if let Some(name) = identity.display_name() {
        moderate(&state, &[name]).await?;
    }

    SessionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| session_not_found(id))?;

    let session = SessionRepo::claim_team_slot(&state.pool, id, slot, &identity)
        .await?
        .ok_or(AppError::Core(CoreError::Conflict(format!(
            "Team {} is already claimed",
            slot.number()
        ))))?;

    tracing::info!(session_id = id, team = slot.number(), "Team slot claimed");
    state
        .event_bus
        .publish(DraftEvent::new("session.updated", id));
    Ok(Json(DataResponse { data: session }))
}

/// POST /api/v1/sessions/{id}/teams/{team}/release
///
/// Vacate a team slot. Only succeeds when the caller's identity matches
/// what the slot records — a stale client cannot kick a newer captain.
pub async fn release_team_slot(
    State(state): State<AppState>,
    Path((id, team)): Path<(DbId, i32)>,
    Json(input): Json<IdentityRequest>,
) -> AppResult<Json<DataResponse<DraftSession>>> {
    let slot = parse_team(team)?;
    let identity = input.resolve().map_err(AppError::Core)?;

    SessionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| session_not_found(id))?;

    let session = SessionRepo::release_team_slot(&state.pool, id, slot, &identity)
        .await?
        .ok_or(AppError::Core(CoreError::Conflict(
            "Slot is not held by this identity".to_string(),
        )))?;

    state
        .event_bus
        .publish(DraftEvent::new("session.updated", id));
    Ok(Json(DataResponse { data: session }))
}

/// POST /api/v1/sessions/{id}/teams/{team}/side
///
/// Select a side. 409 when the other team already holds it.
pub async fn select_side(
    State(state): State<AppState>,
    Path((id, team)): Path<(DbId, i32)>,
    Json(input): Json<SelectSideRequest>,
) -> AppResult<Json<DataResponse<DraftSession>>> {
    let slot = parse_team(team)?;
    let identity = input.identity.resolve().map_err(AppError::Core)?;
    let side = Side::parse(&input.side)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown side '{}'", input.side)))?;

    SessionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| session_not_found(id))?;

    let session = SessionRepo::select_side(&state.pool, id, slot, side.as_str(), &identity)
        .await?
        .ok_or(AppError::Core(CoreError::Conflict(format!(
            "The {} side is already taken (or you do not captain team {})",
            side.as_str(),
            slot.number()
        ))))?;

    state
        .event_bus
        .publish(DraftEvent::new("session.updated", id));
    Ok(Json(DataResponse { data: session }))
}

/// POST /api/v1/sessions/{id}/teams/{team}/clear-side
pub async fn clear_side(
    State(state): State<AppState>,
    Path((id, team)): Path<(DbId, i32)>,
    Json(input): Json<IdentityRequest>,
) -> AppResult<Json<DataResponse<DraftSession>>> {
    let slot = parse_team(team)?;
    let identity = input.resolve().map_err(AppError::Core)?;

    SessionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| session_not_found(id))?;

    let session = SessionRepo::clear_side(&state.pool, id, slot, &identity)
        .await?
        .ok_or(AppError::Core(CoreError::Conflict(
            "Slot is not held by this identity".to_string(),
        )))?;

    state
        .event_bus
        .publish(DraftEvent::new("session.updated", id));
    Ok(Json(DataResponse { data: session }))
}

/// POST /api/v1/sessions/{id}/teams/{team}/ready
///
/// Set or clear the ready flag. When both teams have a captain, both have
/// differing sides, and both are ready, the session advances in the same
/// transaction: lobby -> in_progress with game 1 drafting, or (after a
/// completed game) the next game of the series starts drafting.
pub async fn set_ready(
    State(state): State<AppState>,
    Path((id, team)): Path<(DbId, i32)>,
    Json(input): Json<SetReadyRequest>,
) -> AppResult<Json<DataResponse<ReadyTransition>>> {
    let slot = parse_team(team)?;
    let identity = input.identity.resolve().map_err(AppError::Core)?;

    SessionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| session_not_found(id))?;

    let transition = SessionRepo::set_ready(&state.pool, id, slot, input.ready, &identity)
        .await?
        .ok_or(AppError::Core(CoreError::Conflict(
            "Slot is not held by this identity (or the session is not active)".to_string(),
        )))?;

    state
        .event_bus
        .publish(DraftEvent::new("session.updated", id));
    if transition.started_game.is_some() {
        state.event_bus.publish(DraftEvent::new("game.updated", id));
    }
    Ok(Json(DataResponse { data: transition }))
}
