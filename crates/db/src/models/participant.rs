//! Participant (captain/spectator presence) model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use riftdraft_core::types::{DbId, Timestamp};

/// A row from the `participants` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Participant {
    pub id: DbId,
    pub session_id: DbId,
    /// NULL for anonymous participants.
    pub user_id: Option<DbId>,
    pub display_name: String,
    pub role: String,
    pub is_connected: bool,
    pub last_seen_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

pub mod roles {
    pub const CAPTAIN: &str = "captain";
    pub const SPECTATOR: &str = "spectator";

    pub fn is_valid(role: &str) -> bool {
        role == CAPTAIN || role == SPECTATOR
    }
}

/// DTO for joining a session.
///
/// Authenticated callers set `user_id`; anonymous callers may present the
/// `participant_id` minted on a previous join to reclaim their row.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinSession {
    pub user_id: Option<DbId>,
    pub participant_id: Option<DbId>,
    pub display_name: String,
    pub role: String,
}
