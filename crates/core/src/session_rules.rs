//! Session lifecycle rules: status transitions, the side/ready handshake,
//! and field validation for session creation and updates.

use crate::draft::{Side, SessionStatus, TeamSlot};
use crate::error::CoreError;
use crate::identity::CaptainIdentity;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum allowed length for a session display name.
pub const MAX_SESSION_NAME_LENGTH: usize = 100;

/// Planned game count bounds for a series.
pub const MIN_PLANNED_GAMES: i32 = 1;
pub const MAX_PLANNED_GAMES: i32 = 5;

/// Per-phase time limit bounds, in seconds.
pub const MIN_PHASE_SECONDS: i32 = 10;
pub const MAX_PHASE_SECONDS: i32 = 300;

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Validate a session display name: non-empty, trimmed, bounded.
pub fn validate_session_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Session name must not be empty".to_string(),
        ));
    }
    if trimmed.len() != name.len() {
        return Err(CoreError::Validation(
            "Session name must not have leading or trailing whitespace".to_string(),
        ));
    }
    if name.len() > MAX_SESSION_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Session name must not exceed {MAX_SESSION_NAME_LENGTH} characters, got {}",
            name.len()
        )));
    }
    Ok(())
}

/// Validate a planned game count.
pub fn validate_planned_games(n: i32) -> Result<(), CoreError> {
    if !(MIN_PLANNED_GAMES..=MAX_PLANNED_GAMES).contains(&n) {
        return Err(CoreError::Validation(format!(
            "Planned games must be between {MIN_PLANNED_GAMES} and {MAX_PLANNED_GAMES}, got {n}"
        )));
    }
    Ok(())
}

/// Validate a per-phase time limit.
pub fn validate_phase_seconds(secs: i32) -> Result<(), CoreError> {
    if !(MIN_PHASE_SECONDS..=MAX_PHASE_SECONDS).contains(&secs) {
        return Err(CoreError::Validation(format!(
            "Phase time limit must be between {MIN_PHASE_SECONDS} and {MAX_PHASE_SECONDS} seconds, got {secs}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// Whether a session may move from `from` to `to`.
///
/// `lobby -> in_progress`, `in_progress <-> paused`, and any active state
/// may end in `completed` or `cancelled`. Terminal states accept nothing.
pub fn can_transition(from: SessionStatus, to: SessionStatus) -> bool {
    use SessionStatus::*;
    match (from, to) {
        (Lobby, InProgress) => true,
        (InProgress, Paused) | (Paused, InProgress) => true,
        (Lobby | InProgress | Paused, Completed | Cancelled) => true,
        _ => false,
    }
}

/// [`can_transition`] as a `Result`, for handler use.
pub fn validate_transition(from: SessionStatus, to: SessionStatus) -> Result<(), CoreError> {
    if from == to {
        return Ok(());
    }
    if !can_transition(from, to) {
        return Err(CoreError::Precondition(format!(
            "Cannot transition session from {} to {}",
            from.as_str(),
            to.as_str()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Side / ready handshake
// ---------------------------------------------------------------------------

/// Snapshot of one team slot, as read from the session row.
#[derive(Debug, Clone)]
pub struct TeamState {
    pub captain: Option<CaptainIdentity>,
    pub side: Option<Side>,
    pub ready: bool,
}

impl TeamState {
    pub fn empty() -> TeamState {
        TeamState {
            captain: None,
            side: None,
            ready: false,
        }
    }
}

/// Whether both teams have a captain, both have chosen differing sides,
/// and both have signaled ready — the condition that starts (or resumes)
/// drafting.
pub fn handshake_complete(team1: &TeamState, team2: &TeamState) -> bool {
    let sides_set = matches!(
        (team1.side, team2.side),
        (Some(a), Some(b)) if a != b
    );
    team1.captain.is_some() && team2.captain.is_some() && sides_set && team1.ready && team2.ready
}

/// Which team slot is blue, given two differing assigned sides.
pub fn blue_team(team1_side: Side, _team2_side: Side) -> TeamSlot {
    match team1_side {
        Side::Blue => TeamSlot::One,
        Side::Red => TeamSlot::Two,
    }
}

/// Validate a side choice against the other team's current side.
pub fn validate_side_choice(chosen: Side, other_side: Option<Side>) -> Result<(), CoreError> {
    if other_side == Some(chosen) {
        return Err(CoreError::Conflict(format!(
            "The {} side is already taken",
            chosen.as_str()
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
