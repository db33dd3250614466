//! Unavailable-champion ledger models.

use serde::Serialize;
use sqlx::FromRow;

use riftdraft_core::availability::{LedgerReason, PastAction};
use riftdraft_core::draft::{Side, TeamSlot};
use riftdraft_core::types::{DbId, Timestamp};

/// A row from the `champion_ledger` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LedgerEntry {
    pub id: DbId,
    pub session_id: DbId,
    pub champion_id: String,
    pub game_number: i32,
    pub reason: String,
    pub side: String,
    pub created_at: Timestamp,
}

/// Insert values for one ledger entry.
#[derive(Debug, Clone)]
pub struct CreateLedgerEntry {
    pub session_id: DbId,
    pub champion_id: String,
    pub game_number: i32,
    pub reason: String,
    pub side: String,
}

/// A ledger entry joined to its game's side-to-team mapping, as fetched
/// for availability checks.
#[derive(Debug, Clone, FromRow)]
pub struct LedgerHistoryRow {
    pub champion_id: String,
    pub reason: String,
    pub side: String,
    pub game_number: i32,
    pub blue_team: i32,
}

impl LedgerHistoryRow {
    /// Convert to the core availability input. `None` if the row carries
    /// values outside the CHECK-constrained vocabulary.
    pub fn into_past_action(self) -> Option<PastAction> {
        Some(PastAction {
            reason: LedgerReason::parse(&self.reason)?,
            side: Side::parse(&self.side)?,
            blue_team: TeamSlot::from_number(self.blue_team)?,
            champion_id: self.champion_id,
            game_number: self.game_number,
        })
    }
}
