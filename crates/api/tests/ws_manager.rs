//! Unit tests for `WsManager`.
//!
//! These tests exercise the WebSocket connection manager directly, without
//! performing any HTTP upgrades. They verify add/remove semantics,
//! session-scoped broadcast delivery, and graceful shutdown behaviour.

use axum::extract::ws::Message;

use riftdraft_api::ws::WsManager;
use riftdraft_core::protocol::{ServerMessage, SyncScope};

// ---------------------------------------------------------------------------
// Test: new manager starts with zero connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_manager_has_zero_connections() {
    let manager = WsManager::new();

    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: add() and remove() update the counts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_and_remove_update_counts() {
    let manager = WsManager::new();

    let _rx = manager.add("conn-1".to_string(), 7).await;
    assert_eq!(manager.connection_count().await, 1);
    assert_eq!(manager.session_connection_count(7).await, 1);
    assert_eq!(manager.session_connection_count(8).await, 0);

    manager.remove("conn-1").await;
    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: remove() with unknown ID is a no-op
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_unknown_connection_is_noop() {
    let manager = WsManager::new();
    manager.remove("ghost").await;
    assert_eq!(manager.connection_count().await, 0);
}

// ---------------------------------------------------------------------------
// Test: broadcast reaches only the target session
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broadcast_is_scoped_to_the_session() {
    let manager = WsManager::new();

    let mut in_session = manager.add("conn-1".to_string(), 7).await;
    let mut other_session = manager.add("conn-2".to_string(), 8).await;

    let sent = manager
        .broadcast_to_session(7, Message::Text("hello".into()))
        .await;
    assert_eq!(sent, 1);

    assert!(matches!(
        in_session.recv().await,
        Some(Message::Text(text)) if text.as_str() == "hello"
    ));
    assert!(other_session.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: push_to_session serializes the protocol message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn push_to_session_sends_sync_json() {
    let manager = WsManager::new();
    let mut rx = manager.add("conn-1".to_string(), 7).await;

    let sent = manager
        .push_to_session(
            7,
            &ServerMessage::Sync {
                scope: SyncScope::Game,
                session_id: 7,
            },
        )
        .await;
    assert_eq!(sent, 1);

    let Some(Message::Text(text)) = rx.recv().await else {
        panic!("expected a text frame");
    };
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["type"], "sync");
    assert_eq!(json["scope"], "game");
    assert_eq!(json["session_id"], 7);
}

// ---------------------------------------------------------------------------
// Test: dropped receivers are skipped without error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn closed_channels_are_skipped() {
    let manager = WsManager::new();

    let rx = manager.add("conn-1".to_string(), 7).await;
    drop(rx);

    // Send must not fail even though the receiver is gone.
    let sent = manager
        .broadcast_to_session(7, Message::Text("hello".into()))
        .await;
    assert_eq!(sent, 1);
}

// ---------------------------------------------------------------------------
// Test: shutdown_all closes and clears every connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_closes_and_clears_connections() {
    let manager = WsManager::new();

    let mut a = manager.add("conn-1".to_string(), 7).await;
    let mut b = manager.add("conn-2".to_string(), 8).await;

    manager.shutdown_all().await;

    assert!(matches!(a.recv().await, Some(Message::Close(_))));
    assert!(matches!(b.recv().await, Some(Message::Close(_))));
    assert_eq!(manager.connection_count().await, 0);
}
