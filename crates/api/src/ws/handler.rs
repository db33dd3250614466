use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use riftdraft_core::protocol::{ClientMessage, ServerMessage};
use riftdraft_core::types::DbId;
use riftdraft_db::repositories::ParticipantRepo;

use crate::state::AppState;

/// GET /api/v1/sessions/{id}/ws — upgrade to the session socket.
///
/// After the upgrade the connection is registered with `WsManager` under
/// the session id and managed by two tasks (sender + receiver).
pub async fn session_ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<DbId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, session_id, state))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Processes inbound messages on the current task.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, session_id: DbId, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, session_id, "WebSocket connected");

    // Register and get the receiver for outbound messages.
    let mut rx = state.ws_manager.add(conn_id.clone(), session_id).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Receiver loop: process inbound messages.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => {
                handle_client_message(&state, session_id, &text).await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: remove connection and abort sender task.
    state.ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, session_id, "WebSocket disconnected");
}

/// Dispatch one inbound text frame.
///
/// Hover previews are rebroadcast to the session verbatim — ephemeral,
/// never persisted, never treated as intent. Presence pings refresh the
/// participant's last-seen marker best-effort.
async fn handle_client_message(state: &AppState, session_id: DbId, text: &str) {
    let parsed: Result<ClientMessage, _> = serde_json::from_str(text);
    match parsed {
        Ok(ClientMessage::Hover { champion_id }) => {
            state
                .ws_manager
                .push_to_session(session_id, &ServerMessage::Hover { champion_id })
                .await;
        }
        Ok(ClientMessage::PresencePing { participant_id }) => {
            if let Some(id) = participant_id {
                if let Err(e) = ParticipantRepo::touch(&state.pool, id).await {
                    tracing::debug!(error = %e, participant_id = id, "Presence touch failed");
                }
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring malformed WebSocket message");
        }
    }
}
