//! Pure domain logic for the riftdraft engine.
//!
//! This crate has no I/O: it owns the draft order table, the champion
//! availability rules, session/game lifecycle validation, captain identity
//! matching, chat limits, and the WebSocket message protocol. The `db` and
//! `api` crates depend on it; it depends on nothing but serde/chrono.

pub mod availability;
pub mod chat;
pub mod draft;
pub mod draft_order;
pub mod error;
pub mod identity;
pub mod protocol;
pub mod session_rules;
pub mod types;
