//! Repository for the `draft_sessions` table.
//!
//! Team-slot mutations (claim, release, side, ready) are single UPDATEs
//! whose WHERE clause carries both the identity guard and the conflict
//! guard, so a racing claim or side pick resolves to exactly one winner.
//! The ready handshake runs in a transaction: the initial guarded UPDATE
//! takes the session row lock, which serializes every game-starting path.

use sqlx::PgPool;

use riftdraft_core::draft::{GameStatus, SessionStatus, TeamSlot};
use riftdraft_core::identity::CaptainIdentity;
use riftdraft_core::session_rules::{blue_team, handshake_complete};
use riftdraft_core::types::DbId;

use crate::models::game::DraftGame;
use crate::models::session::{DraftSession, NewSession, ReadyTransition, UpdateSession};
use crate::repositories::game_repo::GAME_COLUMNS;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, invite_token, display_name, draft_mode, planned_games, \
                        ban_seconds, pick_seconds, \
                        team1_captain_user_id, team1_captain_name, team1_side, team1_ready, \
                        team2_captain_user_id, team2_captain_name, team2_side, team2_ready, \
                        status, current_game_number, created_at, updated_at";

/// Provides persistence operations for draft sessions and their team slots.
pub struct SessionRepo;

impl SessionRepo {
    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    /// Insert a new session together with its pending game 1.
    pub async fn create(pool: &PgPool, input: &NewSession) -> Result<DraftSession, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO draft_sessions
                 (invite_token, display_name, draft_mode, planned_games, ban_seconds, pick_seconds)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, DraftSession>(&query)
            .bind(&input.invite_token)
            .bind(&input.display_name)
            .bind(&input.draft_mode)
            .bind(input.planned_games)
            .bind(input.ban_seconds)
            .bind(input.pick_seconds)
            .fetch_one(&mut *tx)
            .await?;

        // Game 1 exists from the start but stays pending until both
        // captains have sides and have readied up.
        sqlx::query("INSERT INTO draft_games (session_id, game_number) VALUES ($1, 1)")
            .bind(session.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(session)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DraftSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM draft_sessions WHERE id = $1");
        sqlx::query_as::<_, DraftSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_token(
        pool: &PgPool,
        invite_token: &str,
    ) -> Result<Option<DraftSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM draft_sessions WHERE invite_token = $1");
        sqlx::query_as::<_, DraftSession>(&query)
            .bind(invite_token)
            .fetch_optional(pool)
            .await
    }

    /// Patch session settings. Status changes must be pre-validated by the
    /// caller; the guard here only keeps terminal sessions immutable.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSession,
    ) -> Result<Option<DraftSession>, sqlx::Error> {
        let query = format!(
            "UPDATE draft_sessions
             SET display_name = COALESCE($2, display_name),
                 draft_mode = COALESCE($3, draft_mode),
                 planned_games = COALESCE($4, planned_games),
                 ban_seconds = COALESCE($5, ban_seconds),
                 pick_seconds = COALESCE($6, pick_seconds),
                 status = COALESCE($7, status),
                 updated_at = NOW()
             WHERE id = $1 AND status NOT IN ('completed', 'cancelled')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DraftSession>(&query)
            .bind(id)
            .bind(&input.display_name)
            .bind(&input.draft_mode)
            .bind(input.planned_games)
            .bind(input.ban_seconds)
            .bind(input.pick_seconds)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a session and (via cascade) its games, ledger, participants,
    /// and messages. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM draft_sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Team slots
    // -----------------------------------------------------------------------

    /// Claim a team slot for `identity`.
    ///
    /// Succeeds when the slot is empty or already held by the same
    /// identity (idempotent re-claim). Returns `None` when the slot is
    /// held by someone else.
    pub async fn claim_team_slot(
        pool: &PgPool,
        id: DbId,
        slot: TeamSlot,
        identity: &CaptainIdentity,
    ) -> Result<Option<DraftSession>, sqlx::Error> {
        let (user_id, name) = identity.as_columns();
        let t = slot.column_prefix();
        let query = format!(
            "UPDATE draft_sessions
             SET {t}_captain_user_id = $2, {t}_captain_name = $3, updated_at = NOW()
             WHERE id = $1
               AND status NOT IN ('completed', 'cancelled')
               AND (({t}_captain_user_id IS NULL AND {t}_captain_name IS NULL)
                    OR ({t}_captain_user_id IS NOT DISTINCT FROM $2
                        AND {t}_captain_name IS NOT DISTINCT FROM $3))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DraftSession>(&query)
            .bind(id)
            .bind(user_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Vacate a team slot, but only if `identity` is what the slot
    /// records — a stale client cannot kick a newer captain. Side and
    /// ready flag clear with it.
    pub async fn release_team_slot(
        pool: &PgPool,
        id: DbId,
        slot: TeamSlot,
        identity: &CaptainIdentity,
    ) -> Result<Option<DraftSession>, sqlx::Error> {
        let (user_id, name) = identity.as_columns();
        let t = slot.column_prefix();
        let query = format!(
            "UPDATE draft_sessions
             SET {t}_captain_user_id = NULL, {t}_captain_name = NULL,
                 {t}_side = NULL, {t}_ready = FALSE, updated_at = NOW()
             WHERE id = $1
               AND {t}_captain_user_id IS NOT DISTINCT FROM $2
               AND {t}_captain_name IS NOT DISTINCT FROM $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DraftSession>(&query)
            .bind(id)
            .bind(user_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Select a side for a team. Fails (returns `None`) when the caller
    /// is not that team's captain or the other team already holds the
    /// side.
    pub async fn select_side(
        pool: &PgPool,
        id: DbId,
        slot: TeamSlot,
        side: &str,
        identity: &CaptainIdentity,
    ) -> Result<Option<DraftSession>, sqlx::Error> {
        let (user_id, name) = identity.as_columns();
        let t = slot.column_prefix();
        let o = slot.other().column_prefix();
        let query = format!(
            "UPDATE draft_sessions
             SET {t}_side = $2, updated_at = NOW()
             WHERE id = $1
               AND status IN ('lobby', 'in_progress')
               AND {t}_captain_user_id IS NOT DISTINCT FROM $3
               AND {t}_captain_name IS NOT DISTINCT FROM $4
               AND ({o}_side IS NULL OR {o}_side <> $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DraftSession>(&query)
            .bind(id)
            .bind(side)
            .bind(user_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Clear a team's side (and its ready flag — readiness presumes a
    /// side).
    pub async fn clear_side(
        pool: &PgPool,
        id: DbId,
        slot: TeamSlot,
        identity: &CaptainIdentity,
    ) -> Result<Option<DraftSession>, sqlx::Error> {
        let (user_id, name) = identity.as_columns();
        let t = slot.column_prefix();
        let query = format!(
            "UPDATE draft_sessions
             SET {t}_side = NULL, {t}_ready = FALSE, updated_at = NOW()
             WHERE id = $1
               AND status IN ('lobby', 'in_progress')
               AND {t}_captain_user_id IS NOT DISTINCT FROM $2
               AND {t}_captain_name IS NOT DISTINCT FROM $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DraftSession>(&query)
            .bind(id)
            .bind(user_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Ready handshake
    // -----------------------------------------------------------------------

    /// Set or clear a team's ready flag and, when the both-ready condition
    /// holds, advance the series in the same transaction:
    ///
    /// - in `lobby`: session -> `in_progress`, game 1 -> `drafting`;
    /// - in `in_progress` with the current game `completed`: the next game
    ///   is created directly in `drafting` (if the series has games left).
    ///
    /// The initial guarded UPDATE takes the session row lock, so
    /// concurrent ready-ups serialize and the advance fires exactly once.
    /// Returns `None` when the caller is not the slot's captain or the
    /// session is not in an active state.
    pub async fn set_ready(
        pool: &PgPool,
        id: DbId,
        slot: TeamSlot,
        ready: bool,
        identity: &CaptainIdentity,
    ) -> Result<Option<ReadyTransition>, sqlx::Error> {
        let (user_id, name) = identity.as_columns();
        let t = slot.column_prefix();

        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE draft_sessions
             SET {t}_ready = $2, updated_at = NOW()
             WHERE id = $1
               AND status IN ('lobby', 'in_progress')
               AND {t}_captain_user_id IS NOT DISTINCT FROM $3
               AND {t}_captain_name IS NOT DISTINCT FROM $4
             RETURNING {COLUMNS}"
        );
        let Some(mut session) = sqlx::query_as::<_, DraftSession>(&query)
            .bind(id)
            .bind(ready)
            .bind(user_id)
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let mut started_game = None;

        let team1 = session.team_state(TeamSlot::One);
        let team2 = session.team_state(TeamSlot::Two);
        if ready && handshake_complete(&team1, &team2) {
            // Sides are guaranteed set and differing by the handshake check.
            if let (Some(s1), Some(s2)) = (
                session.side_of(TeamSlot::One),
                session.side_of(TeamSlot::Two),
            ) {
                let blue = blue_team(s1, s2).number();

                match session.session_status() {
                    Some(SessionStatus::Lobby) => {
                        let query = format!(
                            "UPDATE draft_sessions
                             SET status = 'in_progress', updated_at = NOW()
                             WHERE id = $1
                             RETURNING {COLUMNS}"
                        );
                        session = sqlx::query_as::<_, DraftSession>(&query)
                            .bind(id)
                            .fetch_one(&mut *tx)
                            .await?;

                        let query = format!(
                            "UPDATE draft_games
                             SET status = 'drafting', blue_team = $2, action_index = 0,
                                 turn_started_at = NOW(), updated_at = NOW()
                             WHERE session_id = $1 AND game_number = 1 AND status = 'pending'
                             RETURNING {GAME_COLUMNS}"
                        );
                        started_game = sqlx::query_as::<_, DraftGame>(&query)
                            .bind(id)
                            .bind(blue)
                            .fetch_optional(&mut *tx)
                            .await?;
                    }
                    Some(SessionStatus::InProgress) => {
                        let query = format!(
                            "SELECT {GAME_COLUMNS} FROM draft_games
                             WHERE session_id = $1 AND game_number = $2"
                        );
                        let current = sqlx::query_as::<_, DraftGame>(&query)
                            .bind(id)
                            .bind(session.current_game_number)
                            .fetch_optional(&mut *tx)
                            .await?;

                        let predecessor_done = current
                            .as_ref()
                            .is_some_and(|g| g.game_status() == Some(GameStatus::Completed));

                        if predecessor_done && session.current_game_number < session.planned_games {
                            let next = session.current_game_number + 1;
                            let query = format!(
                                "INSERT INTO draft_games
                                     (session_id, game_number, status, blue_team,
                                      action_index, turn_started_at)
                                 VALUES ($1, $2, 'drafting', $3, 0, NOW())
                                 RETURNING {GAME_COLUMNS}"
                            );
                            started_game = Some(
                                sqlx::query_as::<_, DraftGame>(&query)
                                    .bind(id)
                                    .bind(next)
                                    .bind(blue)
                                    .fetch_one(&mut *tx)
                                    .await?,
                            );

                            let query = format!(
                                "UPDATE draft_sessions
                                 SET current_game_number = $2, updated_at = NOW()
                                 WHERE id = $1
                                 RETURNING {COLUMNS}"
                            );
                            session = sqlx::query_as::<_, DraftSession>(&query)
                                .bind(id)
                                .bind(next)
                                .fetch_one(&mut *tx)
                                .await?;
                        }
                    }
                    _ => {}
                }
            }
        }

        tx.commit().await?;

        if let Some(game) = &started_game {
            tracing::info!(
                session_id = id,
                game_number = game.game_number,
                "Both captains ready, game started drafting"
            );
        }

        Ok(Some(ReadyTransition {
            session,
            started_game,
        }))
    }

    // -----------------------------------------------------------------------
    // Series lifecycle
    // -----------------------------------------------------------------------

    /// Raise the planned game count (e.g. best-of-3 extended to
    /// best-of-5). The guard rejects shrinking and terminal sessions.
    pub async fn extend_series(
        pool: &PgPool,
        id: DbId,
        planned_games: i32,
    ) -> Result<Option<DraftSession>, sqlx::Error> {
        let query = format!(
            "UPDATE draft_sessions
             SET planned_games = $2, updated_at = NOW()
             WHERE id = $1
               AND planned_games < $2
               AND status NOT IN ('completed', 'cancelled')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DraftSession>(&query)
            .bind(id)
            .bind(planned_games)
            .fetch_optional(pool)
            .await
    }

    /// Terminate a session (`completed` or `cancelled`): discard games
    /// that never started and freeze planned/current game numbers at the
    /// count of games that actually finished, so a best-of-5 stopped after
    /// 3 decisive games reads back as 3/3.
    pub async fn finish(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<DraftSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let completed: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM draft_games WHERE session_id = $1 AND status = 'completed'",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM draft_games WHERE session_id = $1 AND status = 'pending'")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        // planned_games has a CHECK >= 1, so an all-lobby session freezes
        // at 1/1 rather than 0/0.
        let frozen = (completed as i32).max(1);
        let query = format!(
            "UPDATE draft_sessions
             SET status = $2, planned_games = $3, current_game_number = $3,
                 team1_ready = FALSE, team2_ready = FALSE, updated_at = NOW()
             WHERE id = $1 AND status NOT IN ('completed', 'cancelled')
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, DraftSession>(&query)
            .bind(id)
            .bind(status)
            .bind(frozen)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(session)
    }
}
