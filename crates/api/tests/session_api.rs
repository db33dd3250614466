//! Integration tests for the session lifecycle over HTTP: creation, the
//! side/ready handshake, turn submission, the chat cap, and the error
//! envelope.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_session(pool: &PgPool, mode: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/sessions",
        json!({
            "display_name": "Finals",
            "draft_mode": mode,
            "planned_games": 3,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    body["data"]["id"].as_i64().unwrap()
}

/// Drive the full handshake: claim both slots, pick sides, ready both.
/// Returns the id of the game that started drafting.
async fn ready_up(pool: &PgPool, session_id: i64) -> i64 {
    for (team, name, side) in [(1, "alice", "blue"), (2, "bob", "red")] {
        let response = post_json(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/sessions/{session_id}/teams/{team}/claim"),
            json!({ "display_name": name }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = post_json(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/sessions/{session_id}/teams/{team}/side"),
            json!({ "display_name": name, "side": side }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let mut game_id = None;
    for (team, name) in [(1, "alice"), (2, "bob")] {
        let response = post_json(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/sessions/{session_id}/teams/{team}/ready"),
            json!({ "display_name": name, "ready": true }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        if let Some(id) = body["data"]["started_game"]["id"].as_i64() {
            game_id = Some(id);
        }
    }
    game_id.expect("both-ready must start a game")
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_session_returns_snapshot_with_invite_token(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/sessions",
        json!({ "display_name": "Finals", "draft_mode": "fearless" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let data = &body["data"];
    assert_eq!(data["display_name"], "Finals");
    assert_eq!(data["draft_mode"], "fearless");
    assert_eq!(data["status"], "lobby");
    assert_eq!(data["current_game_number"], 1);
    assert!(data["invite_token"].as_str().unwrap().len() >= 8);

    // The invite token resolves the session.
    let token = data["invite_token"].as_str().unwrap();
    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/sessions/token/{token}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_session_rejects_bad_input(pool: PgPool) {
    // Unknown mode.
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/sessions",
        json!({ "display_name": "Finals", "draft_mode": "blind" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Out-of-range series length.
    let response = post_json(
        common::build_test_app(pool.clone()),
        "/api/v1/sessions",
        json!({ "display_name": "Finals", "planned_games": 7 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Error envelope
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn missing_session_yields_structured_404(pool: PgPool) {
    let response = get(common::build_test_app(pool.clone()), "/api/v1/sessions/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["code"], "NOT_FOUND");
    assert!(body["error"].as_str().unwrap().contains("Session"));
}

// ---------------------------------------------------------------------------
// Handshake over HTTP
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn side_conflict_surfaces_as_409_then_draft_starts(pool: PgPool) {
    let session_id = create_session(&pool, "normal").await;

    for (team, name) in [(1, "alice"), (2, "bob")] {
        let response = post_json(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/sessions/{session_id}/teams/{team}/claim"),
            json!({ "display_name": name }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Alice takes blue; Bob's blue attempt conflicts; red succeeds.
    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/sessions/{session_id}/teams/1/side"),
        json!({ "display_name": "alice", "side": "blue" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/sessions/{session_id}/teams/2/side"),
        json!({ "display_name": "bob", "side": "blue" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/sessions/{session_id}/teams/2/side"),
        json!({ "display_name": "bob", "side": "red" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Ready both: session in_progress, game 1 drafting, team 1 blue.
    for (team, name) in [(1, "alice"), (2, "bob")] {
        let response = post_json(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/sessions/{session_id}/teams/{team}/ready"),
            json!({ "display_name": name, "ready": true }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/sessions/{session_id}"),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "in_progress");

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/sessions/{session_id}/games"),
    )
    .await;
    let body = body_json(response).await;
    let game = &body["data"][0];
    assert_eq!(game["status"], "drafting");
    assert_eq!(game["blue_team"], 1);
    assert_eq!(game["action_index"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn claimed_slot_rejects_other_identities(pool: PgPool) {
    let session_id = create_session(&pool, "normal").await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/sessions/{session_id}/teams/1/claim"),
        json!({ "display_name": "alice" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/sessions/{session_id}/teams/1/claim"),
        json!({ "display_name": "mallory" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// ---------------------------------------------------------------------------
// Turn submission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_validates_turn_and_advances(pool: PgPool) {
    let session_id = create_session(&pool, "normal").await;
    let game_id = ready_up(&pool, session_id).await;

    // Step 0 is a blue ban: Bob (red) is out of turn.
    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/games/{game_id}/actions"),
        json!({ "display_name": "bob", "champion_id": "zed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Alice bans.
    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/games/{game_id}/actions"),
        json!({ "display_name": "alice", "champion_id": "zed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["action_index"], 1);
    assert_eq!(body["data"]["blue_bans"][0], "zed");

    // Bob cannot reuse the same champion in this game.
    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/games/{game_id}/actions"),
        json!({ "display_name": "bob", "champion_id": "zed" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // An auto submission with an illegal hint degrades to the blank
    // sentinel instead of erroring.
    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/games/{game_id}/actions"),
        json!({ "display_name": "bob", "champion_id": "zed", "auto": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["red_bans"][0], "none");
    assert_eq!(body["data"]["action_index"], 2);
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn chat_send_list_and_cap(pool: PgPool) {
    let session_id = create_session(&pool, "normal").await;

    for i in 0..50 {
        let response = post_json(
            common::build_test_app(pool.clone()),
            &format!("/api/v1/sessions/{session_id}/messages"),
            json!({ "author_name": "alice", "content": format!("message {i}") }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED, "message {i}");
    }

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/sessions/{session_id}/messages"),
        json!({ "author_name": "alice", "content": "one too many" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/sessions/{session_id}/messages"),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 50);
}

// ---------------------------------------------------------------------------
// Participants
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn anonymous_join_mints_identity_and_rejoin_reuses_it(pool: PgPool) {
    let session_id = create_session(&pool, "normal").await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/sessions/{session_id}/participants/join"),
        json!({ "display_name": "ghost", "role": "spectator" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let identity = &body["data"]["identity"];
    assert_eq!(identity["session_id"].as_i64().unwrap(), session_id);
    let participant_id = identity["participant_id"].as_i64().unwrap();

    // Re-join with the persisted identity: same row, no new identity.
    let response = post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/sessions/{session_id}/participants/join"),
        json!({
            "display_name": "ghost",
            "role": "spectator",
            "participant_id": participant_id,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["data"]["participant"]["id"].as_i64().unwrap(), participant_id);
    assert!(body["data"]["identity"].is_null());

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/sessions/{session_id}/participants"),
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
