//! Draft game model: one game's board, turn pointer, and audit log.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

use riftdraft_core::draft::{DraftBoard, GameStatus, PickEdit, Side, TeamSlot};
use riftdraft_core::types::{DbId, Timestamp};

use crate::models::ledger::CreateLedgerEntry;

/// A row from the `draft_games` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DraftGame {
    pub id: DbId,
    pub session_id: DbId,
    pub game_number: i32,
    pub status: String,
    /// Which session team slot (1 or 2) is blue for this game.
    pub blue_team: i32,
    pub blue_bans: Json<Vec<Option<String>>>,
    pub red_bans: Json<Vec<Option<String>>>,
    pub blue_picks: Json<Vec<Option<String>>>,
    pub red_picks: Json<Vec<Option<String>>>,
    /// Index into the draft order table; NULL unless drafting.
    pub action_index: Option<i32>,
    /// Timer anchor for the current step.
    pub turn_started_at: Option<Timestamp>,
    pub pick_edits: Json<Vec<PickEdit>>,
    pub winner: Option<String>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DraftGame {
    pub fn game_status(&self) -> Option<GameStatus> {
        GameStatus::parse(&self.status)
    }

    /// The four arrays as a board value the core rules operate on.
    pub fn board(&self) -> DraftBoard {
        DraftBoard {
            blue_bans: self.blue_bans.0.clone(),
            red_bans: self.red_bans.0.clone(),
            blue_picks: self.blue_picks.0.clone(),
            red_picks: self.red_picks.0.clone(),
        }
    }

    pub fn blue_slot(&self) -> Option<TeamSlot> {
        TeamSlot::from_number(self.blue_team)
    }

    /// Which session team slot occupies `side` in this game.
    pub fn team_for_side(&self, side: Side) -> Option<TeamSlot> {
        self.blue_slot().map(|blue| match side {
            Side::Blue => blue,
            Side::Red => blue.other(),
        })
    }
}

/// The computed outcome of one submitted action, written atomically by
/// `GameRepo::apply_action` under the action-index guard.
#[derive(Debug, Clone)]
pub struct AppliedAction {
    /// The board after placing the value.
    pub board: DraftBoard,
    /// The advanced action index; `None` when this action completed the
    /// draft.
    pub next_action_index: Option<i32>,
    /// Ledger entries to append on completion (empty otherwise).
    pub ledger: Vec<CreateLedgerEntry>,
}

impl AppliedAction {
    pub fn completed(&self) -> bool {
        self.next_action_index.is_none()
    }
}

/// Outcome of a direct slot write (`edit_pick` / `fill_timed_out_slot`).
#[derive(Debug, Clone)]
pub enum SlotWrite {
    /// No game with that id.
    NotFound,
    /// The slot address is out of range.
    InvalidSlot,
    /// `fill_timed_out_slot` only: the slot does not hold the blank
    /// sentinel.
    NotBlank,
    Updated(Box<DraftGame>),
}
