//! Session WebSocket message protocol.
//!
//! Serialized as JSON with an internally-tagged `"type"` discriminator so
//! clients can route messages by type string. Two signal families exist:
//! coarse sync notifications ("something changed, refetch") and ephemeral
//! hover previews that are never persisted or treated as intent.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Sync scopes
// ---------------------------------------------------------------------------

/// Which authoritative collection changed. Clients re-fetch the full
/// snapshot for the scope; they never apply deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncScope {
    Session,
    Game,
    Participants,
    Chat,
    Ledger,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Messages a client may send over the session socket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// The acting captain is considering a champion. UI feedback only.
    #[serde(rename = "hover")]
    Hover { champion_id: String },

    /// Keep-alive that also refreshes the participant's last-seen marker.
    #[serde(rename = "presence.ping")]
    PresencePing {
        #[serde(default)]
        participant_id: Option<DbId>,
    },
}

/// Messages the server pushes to session sockets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Authoritative state changed; re-fetch the named scope.
    #[serde(rename = "sync")]
    Sync {
        scope: SyncScope,
        session_id: DbId,
    },

    /// Rebroadcast hover preview. Non-authoritative, never persisted.
    #[serde(rename = "hover")]
    Hover { champion_id: String },
}
