//! Repository for the `champion_ledger` table.

use sqlx::PgPool;

use riftdraft_core::types::DbId;

use crate::models::ledger::{CreateLedgerEntry, LedgerEntry, LedgerHistoryRow};

const COLUMNS: &str = "id, session_id, champion_id, game_number, reason, side, created_at";

/// Provides append and read operations for the unavailable-champion
/// ledger. The table is append-only; duplicate entries are idempotent
/// no-ops via the unique constraint.
pub struct LedgerRepo;

impl LedgerRepo {
    /// Append one entry within an existing transaction. Returns `false`
    /// when the entry already existed (idempotent duplicate).
    pub async fn insert_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        entry: &CreateLedgerEntry,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO champion_ledger (session_id, champion_id, game_number, reason, side)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT ON CONSTRAINT uq_champion_ledger_entry DO NOTHING",
        )
        .bind(entry.session_id)
        .bind(&entry.champion_id)
        .bind(entry.game_number)
        .bind(&entry.reason)
        .bind(&entry.side)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append one entry outside a transaction.
    pub async fn insert(pool: &PgPool, entry: &CreateLedgerEntry) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let inserted = Self::insert_in_tx(&mut tx, entry).await?;
        tx.commit().await?;
        Ok(inserted)
    }

    /// All entries for a session, oldest game first.
    pub async fn list_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<LedgerEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM champion_ledger
             WHERE session_id = $1
             ORDER BY game_number, id"
        );
        sqlx::query_as::<_, LedgerEntry>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    /// Entries from games strictly before `game_number`, each joined to
    /// its own game's blue/red-to-team mapping. This is the input to the
    /// core availability computation — resolution must go through the
    /// historical game's side assignment, not the current one.
    pub async fn history_before(
        pool: &PgPool,
        session_id: DbId,
        game_number: i32,
    ) -> Result<Vec<LedgerHistoryRow>, sqlx::Error> {
        sqlx::query_as::<_, LedgerHistoryRow>(
            "SELECT l.champion_id, l.reason, l.side, l.game_number, g.blue_team
             FROM champion_ledger l
             JOIN draft_games g
               ON g.session_id = l.session_id AND g.game_number = l.game_number
             WHERE l.session_id = $1 AND l.game_number < $2",
        )
        .bind(session_id)
        .bind(game_number)
        .fetch_all(pool)
        .await
    }
}
