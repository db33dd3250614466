//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Every mutation is either a
//! single guarded statement or an explicit transaction, so concurrent
//! callers racing on the same row resolve to exactly one accepted write
//! (losers observe zero affected rows, surfaced as `None`).

pub mod game_repo;
pub mod ledger_repo;
pub mod message_repo;
pub mod participant_repo;
pub mod session_repo;

pub use game_repo::GameRepo;
pub use ledger_repo::LedgerRepo;
pub use message_repo::MessageRepo;
pub use participant_repo::ParticipantRepo;
pub use session_repo::SessionRepo;
