//! Repository for the `session_messages` table.

use sqlx::PgPool;

use riftdraft_core::chat::MAX_MESSAGES_PER_SESSION;
use riftdraft_core::types::DbId;

use crate::models::message::{CreateMessage, SessionMessage};

const COLUMNS: &str = "id, session_id, author_name, author_user_id, content, created_at";

/// Provides append and read operations for session chat.
pub struct MessageRepo;

impl MessageRepo {
    /// Append a message unless the session is at the hard cap.
    ///
    /// The session row is locked first so two sends racing at 49 messages
    /// cannot both pass the count check. Returns `None` at the cap (the
    /// log is a hard ceiling, not a sliding window) — and also when the
    /// session does not exist, which callers have already ruled out.
    pub async fn create_capped(
        pool: &PgPool,
        session_id: DbId,
        input: &CreateMessage,
    ) -> Result<Option<SessionMessage>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM draft_sessions WHERE id = $1 FOR UPDATE")
                .bind(session_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM session_messages WHERE session_id = $1")
                .bind(session_id)
                .fetch_one(&mut *tx)
                .await?;
        if count >= MAX_MESSAGES_PER_SESSION {
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO session_messages (session_id, author_name, author_user_id, content)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let message = sqlx::query_as::<_, SessionMessage>(&query)
            .bind(session_id)
            .bind(&input.author_name)
            .bind(input.author_user_id)
            .bind(&input.content)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(message))
    }

    /// All messages for a session, oldest first.
    pub async fn list_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<SessionMessage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM session_messages
             WHERE session_id = $1
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, SessionMessage>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_session(pool: &PgPool, session_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM session_messages WHERE session_id = $1")
            .bind(session_id)
            .fetch_one(pool)
            .await
    }
}
