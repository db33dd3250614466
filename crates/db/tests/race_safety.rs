//! Integration tests for concurrent-write resolution: the action-index
//! guard, slot/side claim races, ledger idempotence, the one-drafting
//! invariant, and the chat cap.

mod common;

use sqlx::PgPool;

use common::{applied_for, captain, create_session, ready_up, run_full_draft, submit_step, user};
use riftdraft_core::draft::{ActionType, SlotRef, TeamSlot, BLANK_CHAMPION};
use riftdraft_core::draft::Side;
use riftdraft_db::models::game::SlotWrite;
use riftdraft_db::models::ledger::CreateLedgerEntry;
use riftdraft_db::models::message::CreateMessage;
use riftdraft_db::repositories::{GameRepo, LedgerRepo, MessageRepo, SessionRepo};

// ---------------------------------------------------------------------------
// Action index guard
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn second_submission_for_same_step_is_rejected(pool: PgPool) {
    let session = create_session(&pool, "s1", "normal", 1).await;
    let game = ready_up(&pool, session.id).await;

    // Two submissions computed from the same snapshot: a manual lock-in
    // and a timeout auto-submit racing on action index 0.
    let snapshot = GameRepo::find_by_id(&pool, game.id).await.unwrap().unwrap();
    let (index, manual) = applied_for(&snapshot, Some("zed"));
    let (_, auto) = applied_for(&snapshot, None);

    let first = GameRepo::apply_action(&pool, game.id, index, &manual)
        .await
        .unwrap();
    assert!(first.is_some(), "first submission must apply");

    let second = GameRepo::apply_action(&pool, game.id, index, &auto)
        .await
        .unwrap();
    assert!(second.is_none(), "second submission must lose the race");

    // Exactly one effect: the manual pick, with the index advanced once.
    let refreshed = GameRepo::find_by_id(&pool, game.id).await.unwrap().unwrap();
    assert_eq!(refreshed.action_index, Some(1));
    assert_eq!(refreshed.board().blue_bans[0].as_deref(), Some("zed"));
}

#[sqlx::test]
async fn concurrent_submissions_resolve_to_exactly_one_write(pool: PgPool) {
    let session = create_session(&pool, "s1", "normal", 1).await;
    let game = ready_up(&pool, session.id).await;

    let snapshot = GameRepo::find_by_id(&pool, game.id).await.unwrap().unwrap();
    let (index, a) = applied_for(&snapshot, Some("ahri"));
    let (_, b) = applied_for(&snapshot, Some("zed"));

    let (ra, rb) = tokio::join!(
        GameRepo::apply_action(&pool, game.id, index, &a),
        GameRepo::apply_action(&pool, game.id, index, &b),
    );
    let applied = [ra.unwrap(), rb.unwrap()]
        .into_iter()
        .flatten()
        .count();
    assert_eq!(applied, 1, "exactly one racer may win");

    let refreshed = GameRepo::find_by_id(&pool, game.id).await.unwrap().unwrap();
    assert_eq!(refreshed.action_index, Some(1));
}

#[sqlx::test]
async fn submission_against_completed_game_is_rejected(pool: PgPool) {
    let session = create_session(&pool, "s1", "normal", 1).await;
    let game = ready_up(&pool, session.id).await;
    run_full_draft(&pool, game.id, "champ").await;

    let done = GameRepo::find_by_id(&pool, game.id).await.unwrap().unwrap();
    assert!(done.action_index.is_none());

    // A straggler still carrying index 19 gets the guard, not a write.
    let stale = common::applied_for_stale(&done);
    let result = GameRepo::apply_action(&pool, game.id, 19, &stale)
        .await
        .unwrap();
    assert!(result.is_none());
}

// ---------------------------------------------------------------------------
// Slot and side claims
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn slot_claim_is_idempotent_for_same_identity_only(pool: PgPool) {
    let session = create_session(&pool, "s1", "normal", 1).await;
    let alice = captain("alice");

    SessionRepo::claim_team_slot(&pool, session.id, TeamSlot::One, &alice)
        .await
        .unwrap()
        .expect("first claim must succeed");

    // Same identity: no-op success.
    let again = SessionRepo::claim_team_slot(&pool, session.id, TeamSlot::One, &alice)
        .await
        .unwrap();
    assert!(again.is_some());

    // Different identity: conflict.
    let mallory = captain("mallory");
    let stolen = SessionRepo::claim_team_slot(&pool, session.id, TeamSlot::One, &mallory)
        .await
        .unwrap();
    assert!(stolen.is_none());

    // An authenticated user is a different identity from an anonymous
    // name, even a matching one.
    let authed = user(42);
    let stolen = SessionRepo::claim_team_slot(&pool, session.id, TeamSlot::One, &authed)
        .await
        .unwrap();
    assert!(stolen.is_none());
}

#[sqlx::test]
async fn release_requires_matching_identity(pool: PgPool) {
    let session = create_session(&pool, "s1", "normal", 1).await;
    let alice = captain("alice");
    SessionRepo::claim_team_slot(&pool, session.id, TeamSlot::One, &alice)
        .await
        .unwrap()
        .unwrap();

    // A stale client with someone else's identity cannot vacate the slot.
    let stale = captain("old-alice");
    let released = SessionRepo::release_team_slot(&pool, session.id, TeamSlot::One, &stale)
        .await
        .unwrap();
    assert!(released.is_none());

    let released = SessionRepo::release_team_slot(&pool, session.id, TeamSlot::One, &alice)
        .await
        .unwrap()
        .expect("owner release must succeed");
    assert!(released.captain_of(TeamSlot::One).is_none());
    assert!(released.side_of(TeamSlot::One).is_none());
    assert!(!released.ready_of(TeamSlot::One));
}

// ---------------------------------------------------------------------------
// One drafting game per session
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn second_drafting_game_violates_unique_index(pool: PgPool) {
    let session = create_session(&pool, "s1", "normal", 3).await;
    ready_up(&pool, session.id).await;

    // Game 1 is drafting; forcing a second drafting row must hit the
    // partial unique index.
    let result = sqlx::query(
        "INSERT INTO draft_games (session_id, game_number, status, blue_team, action_index)
         VALUES ($1, 2, 'drafting', 1, 0)",
    )
    .bind(session.id)
    .execute(&pool)
    .await;

    let err = result.expect_err("second drafting game must be rejected");
    let db_err = err.as_database_error().expect("must be a database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
}

// ---------------------------------------------------------------------------
// Ledger idempotence
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn duplicate_ledger_insert_is_a_no_op(pool: PgPool) {
    let session = create_session(&pool, "s1", "ironman", 2).await;
    let game = ready_up(&pool, session.id).await;
    run_full_draft(&pool, game.id, "g1").await;

    let before = LedgerRepo::list_for_session(&pool, session.id).await.unwrap();
    assert_eq!(before.len(), 20);

    let entry = CreateLedgerEntry {
        session_id: session.id,
        champion_id: "g1-0".to_string(),
        game_number: 1,
        reason: "banned".to_string(),
        side: "blue".to_string(),
    };
    let inserted = LedgerRepo::insert(&pool, &entry).await.unwrap();
    assert!(!inserted, "duplicate insert must be a no-op");

    let after = LedgerRepo::list_for_session(&pool, session.id).await.unwrap();
    assert_eq!(after.len(), 20);
}

// ---------------------------------------------------------------------------
// Post-hoc corrections
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn edit_pick_overwrites_and_audits(pool: PgPool) {
    let session = create_session(&pool, "s1", "normal", 1).await;
    let game = ready_up(&pool, session.id).await;
    run_full_draft(&pool, game.id, "champ").await;

    let slot = SlotRef::new(Side::Blue, ActionType::Pick, 0);
    let result = GameRepo::edit_pick(&pool, game.id, slot, "corrected")
        .await
        .unwrap();
    let SlotWrite::Updated(updated) = result else {
        panic!("edit must succeed");
    };

    assert_eq!(updated.board().blue_picks[0].as_deref(), Some("corrected"));
    let edits = &updated.pick_edits.0;
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].replacement, "corrected");
    assert_eq!(edits[0].original.as_deref(), Some("champ-6"));

    // The ledger still records the original draft: edits are cosmetic.
    let entries = LedgerRepo::list_for_session(&pool, session.id).await.unwrap();
    assert!(entries.iter().any(|e| e.champion_id == "champ-6"));
    assert!(!entries.iter().any(|e| e.champion_id == "corrected"));
}

#[sqlx::test]
async fn fill_timed_out_slot_requires_blank_and_updates_ledger(pool: PgPool) {
    let session = create_session(&pool, "s1", "fearless", 2).await;
    let game = ready_up(&pool, session.id).await;

    // Time out the first ban, then draft the rest normally.
    submit_step(&pool, game.id, None).await.unwrap();
    for i in 1..20 {
        submit_step(&pool, game.id, Some(&format!("champ-{i}")))
            .await
            .unwrap();
    }

    // A filled slot is rejected.
    let taken = SlotRef::new(Side::Red, ActionType::Ban, 0);
    let result = GameRepo::fill_timed_out_slot(&pool, game.id, taken, "late").await.unwrap();
    assert!(matches!(result, SlotWrite::NotBlank));

    // The blank slot accepts the correction.
    let blank = SlotRef::new(Side::Blue, ActionType::Ban, 0);
    let result = GameRepo::fill_timed_out_slot(&pool, game.id, blank, "late")
        .await
        .unwrap();
    let SlotWrite::Updated(updated) = result else {
        panic!("fill must succeed");
    };
    assert_eq!(updated.board().blue_bans[0].as_deref(), Some("late"));
    assert_ne!(updated.board().blue_bans[0].as_deref(), Some(BLANK_CHAMPION));

    // The correction reached the ledger.
    let entries = LedgerRepo::list_for_session(&pool, session.id).await.unwrap();
    assert!(entries
        .iter()
        .any(|e| e.champion_id == "late" && e.reason == "banned" && e.side == "blue"));
}

#[sqlx::test]
async fn reset_game_clears_board_and_returns_to_step_zero(pool: PgPool) {
    let session = create_session(&pool, "s1", "normal", 1).await;
    let game = ready_up(&pool, session.id).await;
    submit_step(&pool, game.id, Some("zed")).await.unwrap();
    submit_step(&pool, game.id, Some("ahri")).await.unwrap();

    let reset = GameRepo::reset_game(&pool, game.id)
        .await
        .unwrap()
        .expect("drafting game must reset");
    assert_eq!(reset.action_index, Some(0));
    assert_eq!(reset.board(), riftdraft_core::draft::DraftBoard::empty());

    // Completed games cannot reset.
    run_full_draft(&pool, game.id, "champ").await;
    let denied = GameRepo::reset_game(&pool, game.id).await.unwrap();
    assert!(denied.is_none());
}

// ---------------------------------------------------------------------------
// Chat cap
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn chat_rejects_the_fifty_first_message(pool: PgPool) {
    let session = create_session(&pool, "s1", "normal", 1).await;

    for i in 0..50 {
        let message = CreateMessage {
            author_name: "alice".to_string(),
            author_user_id: None,
            content: format!("message {i}"),
        };
        let sent = MessageRepo::create_capped(&pool, session.id, &message)
            .await
            .unwrap();
        assert!(sent.is_some(), "message {i} must be accepted");
    }

    let overflow = CreateMessage {
        author_name: "alice".to_string(),
        author_user_id: None,
        content: "one too many".to_string(),
    };
    let rejected = MessageRepo::create_capped(&pool, session.id, &overflow)
        .await
        .unwrap();
    assert!(rejected.is_none(), "the 51st send must be rejected");

    let count = MessageRepo::count_for_session(&pool, session.id).await.unwrap();
    assert_eq!(count, 50);

    // No eviction happened: the first message is still there.
    let messages = MessageRepo::list_for_session(&pool, session.id).await.unwrap();
    assert_eq!(messages[0].content, "message 0");
}
