//! Event-to-WebSocket sync broadcasting.
//!
//! [`SyncBroadcaster`] subscribes to the event bus and fans each event out
//! to every connection watching the event's session, as a coarse
//! `{type: "sync", scope}` signal. Clients reconcile by re-fetching the
//! authoritative snapshot for the scope; deltas are never pushed.

use std::sync::Arc;

use tokio::sync::broadcast;

use riftdraft_core::protocol::{ServerMessage, SyncScope};
use riftdraft_events::DraftEvent;

use crate::ws::WsManager;

/// Routes draft events to session WebSocket connections.
pub struct SyncBroadcaster {
    ws_manager: Arc<WsManager>,
}

impl SyncBroadcaster {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run the main broadcast loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](riftdraft_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<DraftEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.broadcast(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Sync broadcaster lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, sync broadcaster shutting down");
                    break;
                }
            }
        }
    }

    async fn broadcast(&self, event: &DraftEvent) {
        let Some(scope) = scope_for(&event.event_type) else {
            tracing::debug!(event_type = %event.event_type, "Event has no sync scope, skipping");
            return;
        };

        let sent = self
            .ws_manager
            .push_to_session(
                event.session_id,
                &ServerMessage::Sync {
                    scope,
                    session_id: event.session_id,
                },
            )
            .await;

        tracing::debug!(
            event_type = %event.event_type,
            session_id = event.session_id,
            connections = sent,
            "Sync signal broadcast"
        );
    }
}

/// Map an event type to the authoritative scope clients should refetch.
///
/// Event names are dot-separated with the scope as the first segment
/// (`"game.action_submitted"` -> [`SyncScope::Game`]).
pub fn scope_for(event_type: &str) -> Option<SyncScope> {
    let prefix = event_type.split('.').next()?;
    match prefix {
        "session" => Some(SyncScope::Session),
        "game" => Some(SyncScope::Game),
        "participants" => Some(SyncScope::Participants),
        "chat" => Some(SyncScope::Chat),
        "ledger" => Some(SyncScope::Ledger),
        _ => None,
    }
}
