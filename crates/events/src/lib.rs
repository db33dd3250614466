//! Riftdraft event bus.
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DraftEvent`] — the canonical domain event envelope published by the
//!   API handlers after every accepted mutation and consumed by the sync
//!   broadcaster for WebSocket fan-out.

pub mod bus;

pub use bus::{DraftEvent, EventBus};
