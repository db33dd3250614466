//! Handlers for the `/games` resource: the turn sequencer and post-hoc
//! corrections.
//!
//! `submit_action` validates everything against a snapshot, then applies
//! through the repository's action-index guard. A stale snapshot can only
//! produce a guard miss (409), never a double apply — which is exactly
//! what a manual lock-in racing a timeout auto-submit needs.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use riftdraft_core::availability::{unavailable_champions, LedgerReason};
use riftdraft_core::draft::{
    validate_champion_id, ActionType, DraftMode, GameStatus, SessionStatus, Side, SlotRef,
    BLANK_CHAMPION,
};
use riftdraft_core::error::CoreError;
use riftdraft_core::identity::CaptainIdentity;
use riftdraft_core::{draft_order, types::DbId};
use riftdraft_db::models::game::{AppliedAction, DraftGame, SlotWrite};
use riftdraft_db::models::ledger::CreateLedgerEntry;
use riftdraft_db::models::session::DraftSession;
use riftdraft_db::repositories::{GameRepo, LedgerRepo, SessionRepo};
use riftdraft_events::DraftEvent;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SubmitActionRequest {
    pub user_id: Option<DbId>,
    pub display_name: Option<String>,
    /// `None` records the blank sentinel (timer expired with nothing
    /// selected).
    pub champion_id: Option<String>,
    /// Set by the client-side timeout fallback. An illegal champion hint
    /// then degrades to the blank sentinel instead of rejecting — the
    /// deadline has already passed and failing would stall the draft.
    #[serde(default)]
    pub auto: bool,
}

#[derive(Debug, Deserialize)]
pub struct SlotRequest {
    /// `blue` or `red`.
    pub side: String,
    /// `ban` or `pick`.
    pub action: String,
    /// 0-based position within the array.
    pub index: usize,
}

impl SlotRequest {
    fn resolve(&self) -> Result<SlotRef, AppError> {
        let side = Side::parse(&self.side)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown side '{}'", self.side)))?;
        let action = ActionType::parse(&self.action)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown action '{}'", self.action)))?;
        let slot = SlotRef::new(side, action, self.index);
        slot.validate().map_err(AppError::Core)?;
        Ok(slot)
    }
}

#[derive(Debug, Deserialize)]
pub struct SlotWriteRequest {
    #[serde(flatten)]
    pub slot: SlotRequest,
    pub champion_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SetWinnerRequest {
    /// `blue` or `red`.
    pub winner: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn game_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Game", id })
}

async fn load_game_and_session(
    state: &AppState,
    game_id: DbId,
) -> Result<(DraftGame, DraftSession), AppError> {
    let game = GameRepo::find_by_id(&state.pool, game_id)
        .await?
        .ok_or_else(|| game_not_found(game_id))?;
    let session = SessionRepo::find_by_id(&state.pool, game.session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Session",
            id: game.session_id,
        }))?;
    Ok((game, session))
}

/// Validate that a champion may be recorded for the acting team right
/// now: well-formed, known to the catalog, not on this game's board, and
/// not excluded by the series ledger under the session mode.
async fn check_champion_legal(
    state: &AppState,
    session: &DraftSession,
    game: &DraftGame,
    acting_team: riftdraft_core::draft::TeamSlot,
    champion_id: &str,
) -> Result<(), AppError> {
    validate_champion_id(champion_id).map_err(AppError::Core)?;

    if !state.catalog.is_valid(champion_id).await {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown champion '{champion_id}'"
        ))));
    }

    if game.board().contains_champion(champion_id) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Champion '{champion_id}' is already taken in this game"
        ))));
    }

    let mode = session
        .mode()
        .ok_or_else(|| AppError::InternalError("Session has invalid draft mode".into()))?;
    if mode != DraftMode::Normal {
        let history: Vec<_> =
            LedgerRepo::history_before(&state.pool, session.id, game.game_number)
                .await?
                .into_iter()
                .filter_map(|row| row.into_past_action())
                .collect();
        let excluded = unavailable_champions(mode, acting_team, game.game_number, &history);
        if excluded.contains(champion_id) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Champion '{champion_id}' is unavailable in this series ({} mode)",
                mode.as_str()
            ))));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /api/v1/games/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DraftGame>>> {
    let game = GameRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| game_not_found(id))?;
    Ok(Json(DataResponse { data: game }))
}

/// GET /api/v1/sessions/{id}/games
pub async fn list_for_session(
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<DraftGame>>>> {
    SessionRepo::find_by_id(&state.pool, session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Session",
            id: session_id,
        }))?;
    let games = GameRepo::list_for_session(&state.pool, session_id).await?;
    Ok(Json(DataResponse { data: games }))
}

// ---------------------------------------------------------------------------
// Turn sequencing
// ---------------------------------------------------------------------------

/// POST /api/v1/games/{id}/actions
///
/// Submit the current step's ban or pick. The whole transition —
/// validate, place, advance, maybe complete, maybe append to the ledger —
/// is atomic; the losing side of a same-step race receives 409 and should
/// simply refetch.
pub async fn submit_action(
    State(state): State<AppState>,
    Path(game_id): Path<DbId>,
    Json(input): Json<SubmitActionRequest>,
) -> AppResult<Json<DataResponse<DraftGame>>> {
    let (game, session) = load_game_and_session(&state, game_id).await?;

    match session.session_status() {
        Some(SessionStatus::InProgress) => {}
        Some(SessionStatus::Paused) => {
            return Err(AppError::Core(CoreError::Precondition(
                "Session is paused".to_string(),
            )))
        }
        _ => {
            return Err(AppError::Core(CoreError::Precondition(
                "Session is not in progress".to_string(),
            )))
        }
    }
    if game.game_status() != Some(GameStatus::Drafting) {
        return Err(AppError::Core(CoreError::Precondition(
            "Game is not drafting".to_string(),
        )));
    }

    let action_index = game
        .action_index
        .ok_or_else(|| AppError::InternalError("Drafting game has no action index".into()))?;
    let step = draft_order::step(action_index as usize)
        .ok_or_else(|| AppError::InternalError("Action index out of draft order range".into()))?;

    let acting_team = game
        .team_for_side(step.side)
        .ok_or_else(|| AppError::InternalError("Game has invalid blue_team".into()))?;

    let identity = CaptainIdentity::from_parts(input.user_id, input.display_name.as_deref())
        .map_err(AppError::Core)?;
    if session.captain_of(acting_team).as_ref() != Some(&identity) {
        return Err(AppError::Core(CoreError::Precondition(format!(
            "It is the {} side's turn and you do not captain that team",
            step.side.as_str()
        ))));
    }

    // Resolve the recorded value. The server re-validates legality even
    // for auto submissions carrying a client-side hover hint.
    let value = match &input.champion_id {
        None => BLANK_CHAMPION.to_string(),
        Some(champion_id) => {
            match check_champion_legal(&state, &session, &game, acting_team, champion_id).await {
                Ok(()) => champion_id.clone(),
                Err(AppError::Database(e)) => return Err(AppError::Database(e)),
                Err(_) if input.auto => BLANK_CHAMPION.to_string(),
                Err(e) => return Err(e),
            }
        }
    };

    let mut board = game.board();
    let slot = SlotRef::new(
        step.side,
        step.action,
        draft_order::slot_index(action_index as usize),
    );
    board.set(&slot, Some(value)).map_err(AppError::Core)?;

    let next_index = action_index + 1;
    let completed = next_index as usize >= draft_order::total_steps();

    let ledger = if completed {
        board
            .recorded_champions()
            .into_iter()
            .map(|(slot, champion_id)| CreateLedgerEntry {
                session_id: session.id,
                champion_id,
                game_number: game.game_number,
                reason: LedgerReason::for_action(slot.action).as_str().to_string(),
                side: slot.side.as_str().to_string(),
            })
            .collect()
    } else {
        Vec::new()
    };

    let applied = AppliedAction {
        board,
        next_action_index: (!completed).then_some(next_index),
        ledger,
    };

    let updated = GameRepo::apply_action(&state.pool, game_id, action_index, &applied)
        .await?
        .ok_or(AppError::Core(CoreError::Conflict(
            "This step was already submitted".to_string(),
        )))?;

    tracing::info!(
        game_id,
        session_id = session.id,
        action_index,
        auto = input.auto,
        completed,
        "Draft action applied"
    );

    state
        .event_bus
        .publish(DraftEvent::new("game.updated", session.id));
    if completed {
        state
            .event_bus
            .publish(DraftEvent::new("ledger.updated", session.id));
        // Ready flags were reset for the next game of the series.
        state
            .event_bus
            .publish(DraftEvent::new("session.updated", session.id));
    }

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Post-hoc corrections
// ---------------------------------------------------------------------------

/// POST /api/v1/games/{id}/edit-pick
///
/// Overwrite one board slot and append an audit entry. Allowed in any
/// game status; cosmetic record-keeping that never touches the ledger.
pub async fn edit_pick(
    State(state): State<AppState>,
    Path(game_id): Path<DbId>,
    Json(input): Json<SlotWriteRequest>,
) -> AppResult<Json<DataResponse<DraftGame>>> {
    let slot = input.slot.resolve()?;
    validate_champion_id(&input.champion_id).map_err(AppError::Core)?;
    if !state.catalog.is_valid(&input.champion_id).await {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown champion '{}'",
            input.champion_id
        ))));
    }

    let game = match GameRepo::edit_pick(&state.pool, game_id, slot, &input.champion_id).await? {
        SlotWrite::NotFound => return Err(game_not_found(game_id)),
        SlotWrite::InvalidSlot => {
            return Err(AppError::BadRequest("Slot is out of range".to_string()))
        }
        SlotWrite::NotBlank => {
            return Err(AppError::InternalError(
                "Unexpected slot state from edit".to_string(),
            ))
        }
        SlotWrite::Updated(game) => *game,
    };

    state
        .event_bus
        .publish(DraftEvent::new("game.updated", game.session_id));
    Ok(Json(DataResponse { data: game }))
}

/// POST /api/v1/games/{id}/fill-slot
///
/// Replace a blank-sentinel slot with a real champion (correcting an
/// accidental timeout). For completed games the ledger is updated so
/// Fearless/Ironman restrictions reflect the corrected value.
pub async fn fill_timed_out_slot(
    State(state): State<AppState>,
    Path(game_id): Path<DbId>,
    Json(input): Json<SlotWriteRequest>,
) -> AppResult<Json<DataResponse<DraftGame>>> {
    let slot = input.slot.resolve()?;
    validate_champion_id(&input.champion_id).map_err(AppError::Core)?;
    if !state.catalog.is_valid(&input.champion_id).await {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown champion '{}'",
            input.champion_id
        ))));
    }

    let game =
        match GameRepo::fill_timed_out_slot(&state.pool, game_id, slot, &input.champion_id).await? {
            SlotWrite::NotFound => return Err(game_not_found(game_id)),
            SlotWrite::InvalidSlot => {
                return Err(AppError::BadRequest("Slot is out of range".to_string()))
            }
            SlotWrite::NotBlank => {
                return Err(AppError::Core(CoreError::Precondition(
                    "Slot does not hold the blank sentinel".to_string(),
                )))
            }
            SlotWrite::Updated(game) => *game,
        };

    state
        .event_bus
        .publish(DraftEvent::new("game.updated", game.session_id));
    if game.game_status() == Some(GameStatus::Completed) {
        state
            .event_bus
            .publish(DraftEvent::new("ledger.updated", game.session_id));
    }
    Ok(Json(DataResponse { data: game }))
}

/// POST /api/v1/games/{id}/reset
///
/// Return a drafting game to its first step with a cleared board.
/// Operational escape hatch, not part of normal flow.
pub async fn reset_game(
    State(state): State<AppState>,
    Path(game_id): Path<DbId>,
) -> AppResult<Json<DataResponse<DraftGame>>> {
    GameRepo::find_by_id(&state.pool, game_id)
        .await?
        .ok_or_else(|| game_not_found(game_id))?;

    let game = GameRepo::reset_game(&state.pool, game_id)
        .await?
        .ok_or(AppError::Core(CoreError::Precondition(
            "Only a drafting game can be reset".to_string(),
        )))?;

    tracing::warn!(game_id, session_id = game.session_id, "Game reset to step 0");
    state
        .event_bus
        .publish(DraftEvent::new("game.updated", game.session_id));
    Ok(Json(DataResponse { data: game }))
}

/// POST /api/v1/games/{id}/winner
///
/// Record which side won a completed game (used to stop a best-of-N once
/// decided).
pub async fn set_winner(
    State(state): State<AppState>,
    Path(game_id): Path<DbId>,
    Json(input): Json<SetWinnerRequest>,
) -> AppResult<Json<DataResponse<DraftGame>>> {
    let side = Side::parse(&input.winner)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown side '{}'", input.winner)))?;

    GameRepo::find_by_id(&state.pool, game_id)
        .await?
        .ok_or_else(|| game_not_found(game_id))?;

    let game = GameRepo::set_winner(&state.pool, game_id, side.as_str())
        .await?
        .ok_or(AppError::Core(CoreError::Precondition(
            "Only a completed game can take a winner".to_string(),
        )))?;

    state
        .event_bus
        .publish(DraftEvent::new("game.updated", game.session_id));
    Ok(Json(DataResponse { data: game }))
}
