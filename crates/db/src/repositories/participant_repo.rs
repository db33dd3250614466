//! Repository for the `participants` table.
//!
//! Joins are idempotent with respect to a stable identity: authenticated
//! users upsert on (session_id, user_id); anonymous participants reclaim
//! the row id they persisted client-side, degrading to a fresh row when
//! it is unknown or stale.

use sqlx::PgPool;

use riftdraft_core::types::DbId;

use crate::models::participant::Participant;

const COLUMNS: &str = "id, session_id, user_id, display_name, role, is_connected, \
                        last_seen_at, created_at, updated_at";

/// Provides presence operations for session participants.
pub struct ParticipantRepo;

impl ParticipantRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Participant>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM participants WHERE id = $1");
        sqlx::query_as::<_, Participant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_user(
        pool: &PgPool,
        session_id: DbId,
        user_id: DbId,
    ) -> Result<Option<Participant>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM participants WHERE session_id = $1 AND user_id = $2");
        sqlx::query_as::<_, Participant>(&query)
            .bind(session_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<Participant>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM participants
             WHERE session_id = $1
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    /// Join (or re-join) as an authenticated user. Re-joining updates the
    /// existing row in place — never a second row for the same user.
    pub async fn upsert_user(
        pool: &PgPool,
        session_id: DbId,
        user_id: DbId,
        display_name: &str,
        role: &str,
    ) -> Result<Participant, sqlx::Error> {
        let query = format!(
            "INSERT INTO participants (session_id, user_id, display_name, role)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (session_id, user_id) WHERE user_id IS NOT NULL
             DO UPDATE SET display_name = EXCLUDED.display_name,
                           role = EXCLUDED.role,
                           is_connected = TRUE,
                           last_seen_at = NOW(),
                           updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(session_id)
            .bind(user_id)
            .bind(display_name)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    /// Re-join as an anonymous participant using a previously minted row
    /// id. Returns `None` when the id is unknown for this session (the
    /// caller then mints a fresh identity).
    pub async fn reclaim_anonymous(
        pool: &PgPool,
        session_id: DbId,
        participant_id: DbId,
        display_name: &str,
        role: &str,
    ) -> Result<Option<Participant>, sqlx::Error> {
        let query = format!(
            "UPDATE participants
             SET display_name = $3, role = $4, is_connected = TRUE,
                 last_seen_at = NOW(), updated_at = NOW()
             WHERE id = $2 AND session_id = $1 AND user_id IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(session_id)
            .bind(participant_id)
            .bind(display_name)
            .bind(role)
            .fetch_optional(pool)
            .await
    }

    /// First-time anonymous join: mint a fresh row. The caller must hand
    /// the returned id back to the client for persistence.
    pub async fn insert_anonymous(
        pool: &PgPool,
        session_id: DbId,
        display_name: &str,
        role: &str,
    ) -> Result<Participant, sqlx::Error> {
        let query = format!(
            "INSERT INTO participants (session_id, display_name, role)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(session_id)
            .bind(display_name)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    /// Mark a participant disconnected. Returns the updated row.
    pub async fn mark_disconnected(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Participant>, sqlx::Error> {
        let query = format!(
            "UPDATE participants
             SET is_connected = FALSE, last_seen_at = NOW(), updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Refresh the last-seen marker (presence pings). Best-effort.
    pub async fn touch(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE participants
             SET is_connected = TRUE, last_seen_at = NOW(), updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
