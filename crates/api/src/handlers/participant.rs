//! Handlers for session participants (captains and spectators).
//!
//! Joins are idempotent against a stable identity. Anonymous participants
//! receive an [`AnonymousIdentity`] record on first join which their
//! client persists locally; re-joining presents it back instead of
//! re-authenticating. The server treats that client-side store as
//! best-effort and mints a fresh identity when the presented id is
//! unknown or stale.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use riftdraft_core::chat::validate_author_name;
use riftdraft_core::error::CoreError;
use riftdraft_core::identity::{AnonymousIdentity, CaptainIdentity};
use riftdraft_core::types::DbId;
use riftdraft_db::models::participant::{roles, JoinSession, Participant};
use riftdraft_db::repositories::{ParticipantRepo, SessionRepo};
use riftdraft_events::DraftEvent;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Join result: the participant row plus, for a freshly minted anonymous
/// identity, the record the client must persist for reconnection.
#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub participant: Participant,
    pub identity: Option<AnonymousIdentity>,
}

#[derive(Debug, Deserialize)]
pub struct LeaveRequest {
    pub participant_id: Option<DbId>,
    pub user_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/sessions/{id}/participants/join
///
/// Idempotent join. Re-submitting with the same stable identity never
/// creates a second participant row.
pub async fn join(
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
    Json(input): Json<JoinSession>,
) -> AppResult<(StatusCode, Json<DataResponse<JoinResponse>>)> {
    if !roles::is_valid(&input.role) {
        return Err(AppError::BadRequest(format!(
            "Role must be '{}' or '{}'",
            roles::CAPTAIN,
            roles::SPECTATOR
        )));
    }
    validate_author_name(&input.display_name).map_err(AppError::Core)?;

    SessionRepo::find_by_id(&state.pool, session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Session",
            id: session_id,
        }))?;

    let verdict = state
        .moderation
        .check(&[&input.display_name])
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    if verdict.flagged {
        return Err(AppError::Core(CoreError::Moderation(
            verdict
                .reason
                .unwrap_or_else(|| "Display name was flagged by moderation".to_string()),
        )));
    }

    let response = match input.user_id {
        // Authenticated: upsert on (session, user).
        Some(user_id) => {
            let participant = ParticipantRepo::upsert_user(
                &state.pool,
                session_id,
                user_id,
                &input.display_name,
                &input.role,
            )
            .await?;
            JoinResponse {
                participant,
                identity: None,
            }
        }
        // Anonymous: reclaim the presented row, else mint a fresh one.
        None => {
            let reclaimed = match input.participant_id {
                Some(participant_id) => {
                    ParticipantRepo::reclaim_anonymous(
                        &state.pool,
                        session_id,
                        participant_id,
                        &input.display_name,
                        &input.role,
                    )
                    .await?
                }
                None => None,
            };

            match reclaimed {
                Some(participant) => JoinResponse {
                    participant,
                    identity: None,
                },
                None => {
                    let participant = ParticipantRepo::insert_anonymous(
                        &state.pool,
                        session_id,
                        &input.display_name,
                        &input.role,
                    )
                    .await?;
                    let identity = AnonymousIdentity {
                        session_id,
                        participant_id: participant.id,
                        display_name: participant.display_name.clone(),
                    };
                    JoinResponse {
                        participant,
                        identity: Some(identity),
                    }
                }
            }
        }
    };

    tracing::info!(
        session_id,
        participant_id = response.participant.id,
        role = %response.participant.role,
        "Participant joined"
    );
    state
        .event_bus
        .publish(DraftEvent::new("participants.updated", session_id));

    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// POST /api/v1/sessions/{id}/participants/leave
///
/// Mark the participant disconnected. A leaving captain vacates their
/// team slot only when their identity matches what the slot records.
pub async fn leave(
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
    Json(input): Json<LeaveRequest>,
) -> AppResult<Json<DataResponse<Participant>>> {
    let participant = match (input.participant_id, input.user_id) {
        (Some(id), _) => ParticipantRepo::find_by_id(&state.pool, id)
            .await?
            .filter(|p| p.session_id == session_id),
        (None, Some(user_id)) => {
            ParticipantRepo::find_by_user(&state.pool, session_id, user_id).await?
        }
        (None, None) => {
            return Err(AppError::BadRequest(
                "Either participant_id or user_id is required".to_string(),
            ))
        }
    };
    let Some(participant) = participant else {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Participant",
            id: input.participant_id.unwrap_or_default(),
        }));
    };

    let updated = ParticipantRepo::mark_disconnected(&state.pool, participant.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Participant",
            id: participant.id,
        }))?;

    // Vacate a captained slot, guarded by identity so a stale client
    // cannot clear a slot someone else now holds.
    if updated.role == roles::CAPTAIN {
        if let Ok(identity) =
            CaptainIdentity::from_parts(updated.user_id, Some(updated.display_name.as_str()))
        {
            if let Some(session) = SessionRepo::find_by_id(&state.pool, session_id).await? {
                if let Some(slot) = session.slot_of(&identity) {
                    let released =
                        SessionRepo::release_team_slot(&state.pool, session_id, slot, &identity)
                            .await?;
                    if released.is_some() {
                        state
                            .event_bus
                            .publish(DraftEvent::new("session.updated", session_id));
                    }
                }
            }
        }
    }

    state
        .event_bus
        .publish(DraftEvent::new("participants.updated", session_id));
    Ok(Json(DataResponse { data: updated }))
}

/// GET /api/v1/sessions/{id}/participants
pub async fn list(
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Participant>>>> {
    SessionRepo::find_by_id(&state.pool, session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Session",
            id: session_id,
        }))?;
    let participants = ParticipantRepo::list_for_session(&state.pool, session_id).await?;
    Ok(Json(DataResponse { data: participants }))
}
