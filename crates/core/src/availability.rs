//! Cross-game champion availability (Fearless / Ironman).
//!
//! Availability is computed, never stored. The repository layer fetches
//! ledger entries for strictly-earlier games joined to each entry's own
//! game row (for that game's blue/red-to-team mapping); this module folds
//! them into the set of champions a team may not use.
//!
//! Side-to-team resolution always goes through the mapping recorded on the
//! game that produced the entry — sides can swap between games, so the
//! current game's assignment is irrelevant here.

use std::collections::HashSet;

use crate::draft::{DraftMode, Side, TeamSlot};

// ---------------------------------------------------------------------------
// Ledger reasons
// ---------------------------------------------------------------------------

/// Why a champion entered the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerReason {
    Picked,
    Banned,
}

impl LedgerReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerReason::Picked => "picked",
            LedgerReason::Banned => "banned",
        }
    }

    pub fn parse(s: &str) -> Option<LedgerReason> {
        match s {
            "picked" => Some(LedgerReason::Picked),
            "banned" => Some(LedgerReason::Banned),
            _ => None,
        }
    }

    /// The reason a slot of the given action type records under.
    pub fn for_action(action: crate::draft::ActionType) -> LedgerReason {
        match action {
            crate::draft::ActionType::Ban => LedgerReason::Banned,
            crate::draft::ActionType::Pick => LedgerReason::Picked,
        }
    }
}

// ---------------------------------------------------------------------------
// Past actions
// ---------------------------------------------------------------------------

/// One ledger entry enriched with its game's side-to-team mapping.
#[derive(Debug, Clone)]
pub struct PastAction {
    pub champion_id: String,
    pub reason: LedgerReason,
    /// The side that performed the action, in the game that produced it.
    pub side: Side,
    pub game_number: i32,
    /// Which team slot was blue in that game.
    pub blue_team: TeamSlot,
}

impl PastAction {
    /// The team slot that performed this action, resolved through the
    /// historical game's own side assignment.
    pub fn acting_team(&self) -> TeamSlot {
        match self.side {
            Side::Blue => self.blue_team,
            Side::Red => self.blue_team.other(),
        }
    }
}

// ---------------------------------------------------------------------------
// Availability computation
// ---------------------------------------------------------------------------

/// Champions `team` may not use in game `game_number`, given the session
/// mode and the series history. Entries from `game_number` or later are
/// ignored (the restriction is strictly backward-looking).
pub fn unavailable_champions(
    mode: DraftMode,
    team: TeamSlot,
    game_number: i32,
    history: &[PastAction],
) -> HashSet<String> {
    let earlier = history.iter().filter(|h| h.game_number < game_number);

    match mode {
        DraftMode::Normal => HashSet::new(),
        DraftMode::Ironman => earlier.map(|h| h.champion_id.clone()).collect(),
        DraftMode::Fearless => earlier
            .filter(|h| h.reason == LedgerReason::Picked && h.acting_team() == team)
            .map(|h| h.champion_id.clone())
            .collect(),
    }
}

/// Whether a single champion is excluded for `team` in `game_number`.
pub fn is_unavailable(
    mode: DraftMode,
    team: TeamSlot,
    game_number: i32,
    champion_id: &str,
    history: &[PastAction],
) -> bool {
    unavailable_champions(mode, team, game_number, history).contains(champion_id)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
