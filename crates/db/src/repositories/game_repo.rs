//! Repository for the `draft_games` table.
//!
//! `apply_action` is the heart of the turn sequencer: the UPDATE is
//! guarded on `status = 'drafting' AND action_index = $expected`, so of
//! two near-simultaneous submissions for the same step (a manual lock-in
//! racing a timeout auto-submit) exactly one advances the game and the
//! other observes zero rows — a conflict, not a double apply.

use sqlx::types::Json;
use sqlx::PgPool;

use riftdraft_core::draft::{is_blank, DraftBoard, GameStatus, PickEdit, SlotRef};
use riftdraft_core::types::DbId;

use crate::models::game::{AppliedAction, DraftGame, SlotWrite};
use crate::models::ledger::CreateLedgerEntry;
use crate::repositories::ledger_repo::LedgerRepo;

/// Column list shared across queries (and with the session repo's
/// handshake transaction).
pub const GAME_COLUMNS: &str = "id, session_id, game_number, status, blue_team, \
                                 blue_bans, red_bans, blue_picks, red_picks, \
                                 action_index, turn_started_at, pick_edits, winner, \
                                 completed_at, created_at, updated_at";

/// Provides persistence operations for draft games.
pub struct GameRepo;

impl GameRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DraftGame>, sqlx::Error> {
        let query = format!("SELECT {GAME_COLUMNS} FROM draft_games WHERE id = $1");
        sqlx::query_as::<_, DraftGame>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<DraftGame>, sqlx::Error> {
        let query = format!(
            "SELECT {GAME_COLUMNS} FROM draft_games
             WHERE session_id = $1
             ORDER BY game_number"
        );
        sqlx::query_as::<_, DraftGame>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Turn sequencing
    // -----------------------------------------------------------------------

    /// Write one submitted action under the at-most-once guard.
    ///
    /// Returns `None` when the game has already advanced past
    /// `expected_index` (or left `drafting`) — the caller lost the race
    /// and should refetch. On completion the ledger entries are appended
    /// (idempotently) and both captains' ready flags reset, all in the
    /// same transaction; no intermediate state is externally observable.
    pub async fn apply_action(
        pool: &PgPool,
        game_id: DbId,
        expected_index: i32,
        applied: &AppliedAction,
    ) -> Result<Option<DraftGame>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let game = if applied.completed() {
            let query = format!(
                "UPDATE draft_games
                 SET blue_bans = $3, red_bans = $4, blue_picks = $5, red_picks = $6,
                     status = 'completed', action_index = NULL, turn_started_at = NULL,
                     completed_at = NOW(), updated_at = NOW()
                 WHERE id = $1 AND status = 'drafting' AND action_index = $2
                 RETURNING {GAME_COLUMNS}"
            );
            sqlx::query_as::<_, DraftGame>(&query)
                .bind(game_id)
                .bind(expected_index)
                .bind(Json(&applied.board.blue_bans))
                .bind(Json(&applied.board.red_bans))
                .bind(Json(&applied.board.blue_picks))
                .bind(Json(&applied.board.red_picks))
                .fetch_optional(&mut *tx)
                .await?
        } else {
            let query = format!(
                "UPDATE draft_games
                 SET blue_bans = $3, red_bans = $4, blue_picks = $5, red_picks = $6,
                     action_index = $7, turn_started_at = NOW(), updated_at = NOW()
                 WHERE id = $1 AND status = 'drafting' AND action_index = $2
                 RETURNING {GAME_COLUMNS}"
            );
            sqlx::query_as::<_, DraftGame>(&query)
                .bind(game_id)
                .bind(expected_index)
                .bind(Json(&applied.board.blue_bans))
                .bind(Json(&applied.board.red_bans))
                .bind(Json(&applied.board.blue_picks))
                .bind(Json(&applied.board.red_picks))
                .bind(applied.next_action_index)
                .fetch_optional(&mut *tx)
                .await?
        };

        let Some(game) = game else {
            // Lost the race: the step was already taken.
            return Ok(None);
        };

        if applied.completed() {
            for entry in &applied.ledger {
                LedgerRepo::insert_in_tx(&mut tx, entry).await?;
            }
            // The next game requires a fresh ready-up from both captains.
            sqlx::query(
                "UPDATE draft_sessions
                 SET team1_ready = FALSE, team2_ready = FALSE, updated_at = NOW()
                 WHERE id = $1",
            )
            .bind(game.session_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(game))
    }

    // -----------------------------------------------------------------------
    // Post-hoc corrections
    // -----------------------------------------------------------------------

    /// Overwrite one board slot and append an audit entry. Allowed in any
    /// game status; never touches the ledger.
    pub async fn edit_pick(
        pool: &PgPool,
        game_id: DbId,
        slot: SlotRef,
        champion_id: &str,
    ) -> Result<SlotWrite, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {GAME_COLUMNS} FROM draft_games WHERE id = $1 FOR UPDATE");
        let Some(game) = sqlx::query_as::<_, DraftGame>(&query)
            .bind(game_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(SlotWrite::NotFound);
        };

        let mut board = game.board();
        let Ok(original) = board.get(&slot) else {
            return Ok(SlotWrite::InvalidSlot);
        };
        if board.set(&slot, Some(champion_id.to_string())).is_err() {
            return Ok(SlotWrite::InvalidSlot);
        }

        let mut edits = game.pick_edits.0.clone();
        edits.push(PickEdit {
            slot,
            original,
            replacement: champion_id.to_string(),
            at: chrono::Utc::now(),
        });

        let updated = Self::write_board(&mut tx, game_id, &board, Some(&edits)).await?;
        tx.commit().await?;
        Ok(SlotWrite::Updated(Box::new(updated)))
    }

    /// Replace a blank-sentinel slot with a real champion (correcting an
    /// accidental timeout). For completed games the corresponding ledger
    /// entry is appended so Fearless/Ironman restrictions reflect the
    /// corrected value.
    pub async fn fill_timed_out_slot(
        pool: &PgPool,
        game_id: DbId,
        slot: SlotRef,
        champion_id: &str,
    ) -> Result<SlotWrite, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {GAME_COLUMNS} FROM draft_games WHERE id = $1 FOR UPDATE");
        let Some(game) = sqlx::query_as::<_, DraftGame>(&query)
            .bind(game_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(SlotWrite::NotFound);
        };

        let mut board = game.board();
        let original = match board.get(&slot) {
            Ok(v) => v,
            Err(_) => return Ok(SlotWrite::InvalidSlot),
        };
        match original.as_deref() {
            Some(value) if is_blank(value) => {}
            _ => return Ok(SlotWrite::NotBlank),
        }
        if board.set(&slot, Some(champion_id.to_string())).is_err() {
            return Ok(SlotWrite::InvalidSlot);
        }

        let updated = Self::write_board(&mut tx, game_id, &board, None).await?;

        if updated.game_status() == Some(GameStatus::Completed) {
            let entry = CreateLedgerEntry {
                session_id: updated.session_id,
                champion_id: champion_id.to_string(),
                game_number: updated.game_number,
                reason: riftdraft_core::availability::LedgerReason::for_action(slot.action)
                    .as_str()
                    .to_string(),
                side: slot.side.as_str().to_string(),
            };
            LedgerRepo::insert_in_tx(&mut tx, &entry).await?;
        }

        tx.commit().await?;
        Ok(SlotWrite::Updated(Box::new(updated)))
    }

    /// Return a drafting game to its first step with a cleared board and
    /// a fresh timer anchor. Operational escape hatch, not normal flow.
    pub async fn reset_game(pool: &PgPool, id: DbId) -> Result<Option<DraftGame>, sqlx::Error> {
        let empty = DraftBoard::empty();
        let query = format!(
            "UPDATE draft_games
             SET blue_bans = $2, red_bans = $2, blue_picks = $2, red_picks = $2,
                 action_index = 0, turn_started_at = NOW(), pick_edits = '[]',
                 updated_at = NOW()
             WHERE id = $1 AND status = 'drafting'
             RETURNING {GAME_COLUMNS}"
        );
        sqlx::query_as::<_, DraftGame>(&query)
            .bind(id)
            .bind(Json(&empty.blue_bans))
            .fetch_optional(pool)
            .await
    }

    /// Record the game result. Only completed games take a winner.
    pub async fn set_winner(
        pool: &PgPool,
        id: DbId,
        winner: &str,
    ) -> Result<Option<DraftGame>, sqlx::Error> {
        let query = format!(
            "UPDATE draft_games
             SET winner = $2, updated_at = NOW()
             WHERE id = $1 AND status = 'completed'
             RETURNING {GAME_COLUMNS}"
        );
        sqlx::query_as::<_, DraftGame>(&query)
            .bind(id)
            .bind(winner)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Write the four board arrays (and optionally the edit log) within an
    /// existing transaction.
    async fn write_board(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        game_id: DbId,
        board: &DraftBoard,
        edits: Option<&[PickEdit]>,
    ) -> Result<DraftGame, sqlx::Error> {
        let query = format!(
            "UPDATE draft_games
             SET blue_bans = $2, red_bans = $3, blue_picks = $4, red_picks = $5,
                 pick_edits = COALESCE($6, pick_edits), updated_at = NOW()
             WHERE id = $1
             RETURNING {GAME_COLUMNS}"
        );
        sqlx::query_as::<_, DraftGame>(&query)
            .bind(game_id)
            .bind(Json(&board.blue_bans))
            .bind(Json(&board.red_bans))
            .bind(Json(&board.blue_picks))
            .bind(Json(&board.red_picks))
            .bind(edits.map(Json))
            .fetch_one(&mut **tx)
            .await
    }
}
