//! Session chat message model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use riftdraft_core::types::{DbId, Timestamp};

/// A row from the `session_messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionMessage {
    pub id: DbId,
    pub session_id: DbId,
    pub author_name: String,
    pub author_user_id: Option<DbId>,
    pub content: String,
    pub created_at: Timestamp,
}

/// DTO for sending a message.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMessage {
    pub author_name: String,
    pub author_user_id: Option<DbId>,
    pub content: String,
}
