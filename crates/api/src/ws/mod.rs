//! WebSocket infrastructure for real-time session synchronization.
//!
//! Provides session-scoped connection management, heartbeat monitoring,
//! and the HTTP upgrade handler used by Axum routes. Connections carry no
//! authority: everything pushed here is either a coarse "refetch" signal
//! or an ephemeral hover preview.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::session_ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
