//! Draft session model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use riftdraft_core::draft::{DraftMode, SessionStatus, Side, TeamSlot};
use riftdraft_core::identity::CaptainIdentity;
use riftdraft_core::session_rules::TeamState;
use riftdraft_core::types::{DbId, Timestamp};

use crate::models::game::DraftGame;

/// A row from the `draft_sessions` table.
///
/// The two team slots are embedded as column pairs; use
/// [`captain_of`](DraftSession::captain_of) / [`team_state`](DraftSession::team_state)
/// instead of reading the nullable columns directly.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DraftSession {
    pub id: DbId,
    pub invite_token: String,
    pub display_name: String,
    pub draft_mode: String,
    pub planned_games: i32,
    pub ban_seconds: i32,
    pub pick_seconds: i32,
    pub team1_captain_user_id: Option<DbId>,
    pub team1_captain_name: Option<String>,
    pub team1_side: Option<String>,
    pub team1_ready: bool,
    pub team2_captain_user_id: Option<DbId>,
    pub team2_captain_name: Option<String>,
    pub team2_side: Option<String>,
    pub team2_ready: bool,
    pub status: String,
    pub current_game_number: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DraftSession {
    pub fn session_status(&self) -> Option<SessionStatus> {
        SessionStatus::parse(&self.status)
    }

    pub fn mode(&self) -> Option<DraftMode> {
        DraftMode::parse(&self.draft_mode)
    }

    /// The identity holding a team slot, if claimed.
    pub fn captain_of(&self, slot: TeamSlot) -> Option<CaptainIdentity> {
        match slot {
            TeamSlot::One => CaptainIdentity::from_columns(
                self.team1_captain_user_id,
                self.team1_captain_name.as_deref(),
            ),
            TeamSlot::Two => CaptainIdentity::from_columns(
                self.team2_captain_user_id,
                self.team2_captain_name.as_deref(),
            ),
        }
    }

    pub fn side_of(&self, slot: TeamSlot) -> Option<Side> {
        let raw = match slot {
            TeamSlot::One => self.team1_side.as_deref(),
            TeamSlot::Two => self.team2_side.as_deref(),
        };
        raw.and_then(Side::parse)
    }

    pub fn ready_of(&self, slot: TeamSlot) -> bool {
        match slot {
            TeamSlot::One => self.team1_ready,
            TeamSlot::Two => self.team2_ready,
        }
    }

    /// Snapshot of one slot for the handshake rules.
    pub fn team_state(&self, slot: TeamSlot) -> TeamState {
        TeamState {
            captain: self.captain_of(slot),
            side: self.side_of(slot),
            ready: self.ready_of(slot),
        }
    }

    /// The slot a given identity captains, if any.
    pub fn slot_of(&self, identity: &CaptainIdentity) -> Option<TeamSlot> {
        for slot in [TeamSlot::One, TeamSlot::Two] {
            if self.captain_of(slot).as_ref() == Some(identity) {
                return Some(slot);
            }
        }
        None
    }

    /// The per-step time limit for an action type, in seconds.
    pub fn phase_seconds(&self, action: riftdraft_core::draft::ActionType) -> i32 {
        match action {
            riftdraft_core::draft::ActionType::Ban => self.ban_seconds,
            riftdraft_core::draft::ActionType::Pick => self.pick_seconds,
        }
    }
}

/// Fully-resolved insert values for a new session. Built by the handler
/// after validation and moderation.
pub struct NewSession {
    pub invite_token: String,
    pub display_name: String,
    pub draft_mode: String,
    pub planned_games: i32,
    pub ban_seconds: i32,
    pub pick_seconds: i32,
}

/// DTO for updating session settings. All fields optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSession {
    pub display_name: Option<String>,
    pub draft_mode: Option<String>,
    pub planned_games: Option<i32>,
    pub ban_seconds: Option<i32>,
    pub pick_seconds: Option<i32>,
    pub status: Option<String>,
}

/// Result of a ready-flag change: the updated session and, when the
/// both-ready condition fired, the game that started drafting.
#[derive(Debug, Clone, Serialize)]
pub struct ReadyTransition {
    pub session: DraftSession,
    pub started_game: Option<DraftGame>,
}
