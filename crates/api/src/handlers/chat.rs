//! Handlers for session chat.
//!
//! Every outgoing message passes the moderation collaborator before
//! acceptance; a flagged verdict surfaces its reason to the sender. The
//! 50-message cap is a hard ceiling enforced in the repository — at-cap
//! sends are rejected, old messages are never evicted.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use riftdraft_core::chat::{validate_author_name, validate_message_content, MAX_MESSAGES_PER_SESSION};
use riftdraft_core::error::CoreError;
use riftdraft_core::types::DbId;
use riftdraft_db::models::message::{CreateMessage, SessionMessage};
use riftdraft_db::repositories::{MessageRepo, SessionRepo};
use riftdraft_events::DraftEvent;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/sessions/{id}/messages
pub async fn send(
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
    Json(input): Json<CreateMessage>,
) -> AppResult<(StatusCode, Json<DataResponse<SessionMessage>>)> {
    validate_message_content(&input.content).map_err(AppError::Core)?;
    validate_author_name(&input.author_name).map_err(AppError::Core)?;

    SessionRepo::find_by_id(&state.pool, session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Session",
            id: session_id,
        }))?;

    let verdict = state
        .moderation
        .check(&[&input.content])
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    if verdict.flagged {
        return Err(AppError::Core(CoreError::Moderation(
            verdict
                .reason
                .unwrap_or_else(|| "Message was flagged by moderation".to_string()),
        )));
    }

    let message = MessageRepo::create_capped(&state.pool, session_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::Conflict(format!(
            "Chat is full ({MAX_MESSAGES_PER_SESSION} messages)"
        ))))?;

    state
        .event_bus
        .publish(DraftEvent::new("chat.message_sent", session_id));
    Ok((StatusCode::CREATED, Json(DataResponse { data: message })))
}

/// GET /api/v1/sessions/{id}/messages
pub async fn list(
    State(state): State<AppState>,
    Path(session_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<SessionMessage>>>> {
    SessionRepo::find_by_id(&state.pool, session_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Session",
            id: session_id,
        }))?;
    let messages = MessageRepo::list_for_session(&state.pool, session_id).await?;
    Ok(Json(DataResponse { data: messages }))
}
