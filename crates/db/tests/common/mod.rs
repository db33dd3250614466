#![allow(dead_code)]

//! Shared builders for driving a session from lobby to drafting and a
//! drafting game through its 20 steps, mirroring what the API layer does
//! on top of the repositories.

use sqlx::PgPool;

use riftdraft_core::availability::LedgerReason;
use riftdraft_core::draft::{SlotRef, TeamSlot, BLANK_CHAMPION};
use riftdraft_core::draft_order;
use riftdraft_core::identity::CaptainIdentity;
use riftdraft_db::models::game::{AppliedAction, DraftGame};
use riftdraft_db::models::ledger::CreateLedgerEntry;
use riftdraft_db::models::session::{DraftSession, NewSession};
use riftdraft_db::repositories::{GameRepo, SessionRepo};

pub fn captain(name: &str) -> CaptainIdentity {
    CaptainIdentity::from_parts(None, Some(name)).unwrap()
}

pub fn user(id: i64) -> CaptainIdentity {
    CaptainIdentity::from_parts(Some(id), None).unwrap()
}

pub async fn create_session(
    pool: &PgPool,
    name: &str,
    mode: &str,
    planned_games: i32,
) -> DraftSession {
    let input = NewSession {
        invite_token: format!("tok-{name}"),
        display_name: name.to_string(),
        draft_mode: mode.to_string(),
        planned_games,
        ban_seconds: 30,
        pick_seconds: 30,
    };
    SessionRepo::create(pool, &input).await.unwrap()
}

/// Claim both slots (alice/bob), pick the given sides, and ready both
/// captains. Returns the game that started drafting.
pub async fn ready_up_with_sides(
    pool: &PgPool,
    session_id: i64,
    team1_side: &str,
    team2_side: &str,
) -> DraftGame {
    let alice = captain("alice");
    let bob = captain("bob");

    // Claims are idempotent, so re-running between games is harmless.
    SessionRepo::claim_team_slot(pool, session_id, TeamSlot::One, &alice)
        .await
        .unwrap();
    SessionRepo::claim_team_slot(pool, session_id, TeamSlot::Two, &bob)
        .await
        .unwrap();

    SessionRepo::select_side(pool, session_id, TeamSlot::One, team1_side, &alice)
        .await
        .unwrap()
        .expect("team 1 side selection must succeed");
    SessionRepo::select_side(pool, session_id, TeamSlot::Two, team2_side, &bob)
        .await
        .unwrap()
        .expect("team 2 side selection must succeed");

    SessionRepo::set_ready(pool, session_id, TeamSlot::One, true, &alice)
        .await
        .unwrap()
        .expect("team 1 ready must succeed");
    let transition = SessionRepo::set_ready(pool, session_id, TeamSlot::Two, true, &bob)
        .await
        .unwrap()
        .expect("team 2 ready must succeed");

    transition
        .started_game
        .expect("both-ready must start a game")
}

pub async fn ready_up(pool: &PgPool, session_id: i64) -> DraftGame {
    ready_up_with_sides(pool, session_id, "blue", "red").await
}

/// Build the [`AppliedAction`] for the game's current step, the way the
/// submit handler does: place the value, advance, and (on the final step)
/// collect the ledger entries.
pub fn applied_for(game: &DraftGame, champion: Option<&str>) -> (i32, AppliedAction) {
    let index = game.action_index.expect("game must be drafting");
    let step = draft_order::step(index as usize).unwrap();
    let slot = SlotRef::new(
        step.side,
        step.action,
        draft_order::slot_index(index as usize),
    );

    let mut board = game.board();
    let value = champion.unwrap_or(BLANK_CHAMPION).to_string();
    board.set(&slot, Some(value)).unwrap();

    let next = index + 1;
    let completed = next as usize >= draft_order::total_steps();
    let ledger = if completed {
        board
            .recorded_champions()
            .into_iter()
            .map(|(slot, champion_id)| CreateLedgerEntry {
                session_id: game.session_id,
                champion_id,
                game_number: game.game_number,
                reason: LedgerReason::for_action(slot.action).as_str().to_string(),
                side: slot.side.as_str().to_string(),
            })
            .collect()
    } else {
        Vec::new()
    };

    (
        index,
        AppliedAction {
            board,
            next_action_index: (!completed).then_some(next),
            ledger,
        },
    )
}

/// An action payload carrying a stale index for a game that has already
/// completed (used to assert the guard rejects stragglers).
pub fn applied_for_stale(game: &DraftGame) -> AppliedAction {
    AppliedAction {
        board: game.board(),
        next_action_index: None,
        ledger: Vec::new(),
    }
}

/// Submit the current step. Returns `None` when the guard rejects.
pub async fn submit_step(
    pool: &PgPool,
    game_id: i64,
    champion: Option<&str>,
) -> Option<DraftGame> {
    let game = GameRepo::find_by_id(pool, game_id).await.unwrap().unwrap();
    let (index, applied) = applied_for(&game, champion);
    GameRepo::apply_action(pool, game_id, index, &applied)
        .await
        .unwrap()
}

/// Drive a drafting game through all 20 steps with champions named
/// `{prefix}-{step}`. Returns the completed game.
pub async fn run_full_draft(pool: &PgPool, game_id: i64, prefix: &str) -> DraftGame {
    let mut last = None;
    for i in 0..draft_order::total_steps() {
        let champion = format!("{prefix}-{i}");
        last = submit_step(pool, game_id, Some(&champion)).await;
        assert!(last.is_some(), "step {i} must apply");
    }
    last.unwrap()
}
