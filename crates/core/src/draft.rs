//! Draft vocabulary: sides, modes, statuses, the blank sentinel, timer
//! math, and the ban/pick board with its slot addressing.
//!
//! Everything here is shared by the repository layer, the HTTP handlers,
//! and the WebSocket protocol, so it lives in `core` with no I/O deps.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Recorded value for a slot that was intentionally left empty (timer
/// expired with no selection). Distinct from `None`, which means "not yet
/// decided". No real champion id may collide with it.
pub const BLANK_CHAMPION: &str = "none";

/// Fixed grace window added to every phase time limit before a client may
/// auto-submit on behalf of the acting captain.
pub const TIMER_GRACE_SECS: i64 = 3;

/// Ban slots per side per game.
pub const BANS_PER_SIDE: usize = 5;

/// Pick slots per side per game.
pub const PICKS_PER_SIDE: usize = 5;

/// Maximum length accepted for a champion identifier.
pub const MAX_CHAMPION_ID_LENGTH: usize = 64;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Blue or red. Determines turn order priority within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Blue,
    Red,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Blue => "blue",
            Side::Red => "red",
        }
    }

    pub fn parse(s: &str) -> Option<Side> {
        match s {
            "blue" => Some(Side::Blue),
            "red" => Some(Side::Red),
            _ => None,
        }
    }

    pub fn opposite(&self) -> Side {
        match self {
            Side::Blue => Side::Red,
            Side::Red => Side::Blue,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Team slots
// ---------------------------------------------------------------------------

/// One of the session's two team slots. Slots are stable across a series;
/// which slot is blue can change game to game (`blue_team` on each game).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSlot {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
}

impl TeamSlot {
    pub fn number(&self) -> i32 {
        match self {
            TeamSlot::One => 1,
            TeamSlot::Two => 2,
        }
    }

    pub fn from_number(n: i32) -> Option<TeamSlot> {
        match n {
            1 => Some(TeamSlot::One),
            2 => Some(TeamSlot::Two),
            _ => None,
        }
    }

    pub fn other(&self) -> TeamSlot {
        match self {
            TeamSlot::One => TeamSlot::Two,
            TeamSlot::Two => TeamSlot::One,
        }
    }

    /// Column prefix for the embedded slot columns on `draft_sessions`.
    pub fn column_prefix(&self) -> &'static str {
        match self {
            TeamSlot::One => "team1",
            TeamSlot::Two => "team2",
        }
    }
}

// ---------------------------------------------------------------------------
// Draft mode
// ---------------------------------------------------------------------------

/// Cross-game champion restriction mode for a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftMode {
    /// No cross-game restriction; only within-game uniqueness applies.
    Normal,
    /// Champions picked by a team in earlier games are unavailable to that
    /// same team. Bans do not carry over.
    Fearless,
    /// Every champion picked or banned in an earlier game is unavailable
    /// to both teams.
    Ironman,
}

impl DraftMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftMode::Normal => "normal",
            DraftMode::Fearless => "fearless",
            DraftMode::Ironman => "ironman",
        }
    }

    pub fn parse(s: &str) -> Option<DraftMode> {
        match s {
            "normal" => Some(DraftMode::Normal),
            "fearless" => Some(DraftMode::Fearless),
            "ironman" => Some(DraftMode::Ironman),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Statuses
// ---------------------------------------------------------------------------

/// Session lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Lobby,
    InProgress,
    Paused,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Lobby => "lobby",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<SessionStatus> {
        match s {
            "lobby" => Some(SessionStatus::Lobby),
            "in_progress" => Some(SessionStatus::InProgress),
            "paused" => Some(SessionStatus::Paused),
            "completed" => Some(SessionStatus::Completed),
            "cancelled" => Some(SessionStatus::Cancelled),
            _ => None,
        }
    }

    /// Completed and cancelled sessions accept no further mutations.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }
}

/// Game lifecycle status. At most one game per session is `drafting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Pending,
    Drafting,
    Completed,
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Pending => "pending",
            GameStatus::Drafting => "drafting",
            GameStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<GameStatus> {
        match s {
            "pending" => Some(GameStatus::Pending),
            "drafting" => Some(GameStatus::Drafting),
            "completed" => Some(GameStatus::Completed),
            _ => None,
        }
    }
}

/// Ban or pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Ban,
    Pick,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Ban => "ban",
            ActionType::Pick => "pick",
        }
    }

    pub fn parse(s: &str) -> Option<ActionType> {
        match s {
            "ban" => Some(ActionType::Ban),
            "pick" => Some(ActionType::Pick),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Slot addressing and the board
// ---------------------------------------------------------------------------

/// Addresses one array slot on a game's board: which side, ban or pick,
/// and the 0-based position within that array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRef {
    pub side: Side,
    pub action: ActionType,
    pub index: usize,
}

impl SlotRef {
    pub fn new(side: Side, action: ActionType, index: usize) -> SlotRef {
        SlotRef {
            side,
            action,
            index,
        }
    }

    /// Bounds check against the per-side array sizes.
    pub fn validate(&self) -> Result<(), CoreError> {
        let max = match self.action {
            ActionType::Ban => BANS_PER_SIDE,
            ActionType::Pick => PICKS_PER_SIDE,
        };
        if self.index >= max {
            return Err(CoreError::Validation(format!(
                "Slot index {} out of range for {} array (max {})",
                self.index,
                self.action.as_str(),
                max - 1
            )));
        }
        Ok(())
    }
}

/// One post-hoc correction of a board slot, appended to the game's audit
/// log. Edits are record-keeping only and never re-open the draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickEdit {
    pub slot: SlotRef,
    pub original: Option<String>,
    pub replacement: String,
    pub at: Timestamp,
}

/// The four ban/pick arrays of one game.
///
/// Slot values: `None` = not yet decided, [`BLANK_CHAMPION`] = intentionally
/// left empty, anything else = a champion id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftBoard {
    pub blue_bans: Vec<Option<String>>,
    pub red_bans: Vec<Option<String>>,
    pub blue_picks: Vec<Option<String>>,
    pub red_picks: Vec<Option<String>>,
}

impl DraftBoard {
    /// A fresh board with every slot unfilled.
    pub fn empty() -> DraftBoard {
        DraftBoard {
            blue_bans: vec![None; BANS_PER_SIDE],
            red_bans: vec![None; BANS_PER_SIDE],
            blue_picks: vec![None; PICKS_PER_SIDE],
            red_picks: vec![None; PICKS_PER_SIDE],
        }
    }

    fn array(&self, side: Side, action: ActionType) -> &Vec<Option<String>> {
        match (side, action) {
            (Side::Blue, ActionType::Ban) => &self.blue_bans,
            (Side::Red, ActionType::Ban) => &self.red_bans,
            (Side::Blue, ActionType::Pick) => &self.blue_picks,
            (Side::Red, ActionType::Pick) => &self.red_picks,
        }
    }

    fn array_mut(&mut self, side: Side, action: ActionType) -> &mut Vec<Option<String>> {
        match (side, action) {
            (Side::Blue, ActionType::Ban) => &mut self.blue_bans,
            (Side::Red, ActionType::Ban) => &mut self.red_bans,
            (Side::Blue, ActionType::Pick) => &mut self.blue_picks,
            (Side::Red, ActionType::Pick) => &mut self.red_picks,
        }
    }

    /// Read one slot.
    pub fn get(&self, slot: &SlotRef) -> Result<Option<String>, CoreError> {
        slot.validate()?;
        Ok(self.array(slot.side, slot.action)[slot.index].clone())
    }

    /// Write one slot.
    pub fn set(&mut self, slot: &SlotRef, value: Option<String>) -> Result<(), CoreError> {
        slot.validate()?;
        self.array_mut(slot.side, slot.action)[slot.index] = value;
        Ok(())
    }

    /// Whether a champion already appears anywhere on this board. Blank
    /// sentinel slots never count (blanks may repeat).
    pub fn contains_champion(&self, champion_id: &str) -> bool {
        if is_blank(champion_id) {
            return false;
        }
        [
            &self.blue_bans,
            &self.red_bans,
            &self.blue_picks,
            &self.red_picks,
        ]
        .iter()
        .any(|arr| arr.iter().flatten().any(|c| c == champion_id))
    }

    /// Count of non-null, non-blank entries across both arrays of the
    /// given action type.
    pub fn filled_count(&self, action: ActionType) -> usize {
        let (a, b) = match action {
            ActionType::Ban => (&self.blue_bans, &self.red_bans),
            ActionType::Pick => (&self.blue_picks, &self.red_picks),
        };
        a.iter()
            .chain(b.iter())
            .flatten()
            .filter(|c| !is_blank(c))
            .count()
    }

    /// Every (slot, champion) pair holding a real champion, for ledger
    /// appends on completion.
    pub fn recorded_champions(&self) -> Vec<(SlotRef, String)> {
        let mut out = Vec::new();
        for side in [Side::Blue, Side::Red] {
            for action in [ActionType::Ban, ActionType::Pick] {
                for (i, value) in self.array(side, action).iter().enumerate() {
                    if let Some(c) = value {
                        if !is_blank(c) {
                            out.push((SlotRef::new(side, action, i), c.clone()));
                        }
                    }
                }
            }
        }
        out
    }
}

/// Whether a recorded slot value is the blank sentinel.
pub fn is_blank(value: &str) -> bool {
    value == BLANK_CHAMPION
}

/// Validate a champion id submitted by a client: non-empty, bounded, no
/// whitespace, and not the reserved blank sentinel.
pub fn validate_champion_id(id: &str) -> Result<(), CoreError> {
    if id.is_empty() {
        return Err(CoreError::Validation(
            "Champion id must not be empty".to_string(),
        ));
    }
    if id.len() > MAX_CHAMPION_ID_LENGTH {
        return Err(CoreError::Validation(format!(
            "Champion id must not exceed {MAX_CHAMPION_ID_LENGTH} characters"
        )));
    }
    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(CoreError::Validation(
            "Champion id must not contain whitespace".to_string(),
        ));
    }
    if is_blank(id) {
        return Err(CoreError::Validation(format!(
            "'{BLANK_CHAMPION}' is reserved for skipped slots"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Timer math
// ---------------------------------------------------------------------------

/// The instant after which the acting captain's client may auto-submit:
/// anchor + phase limit + the fixed grace window.
pub fn turn_deadline(anchor: Timestamp, limit_secs: i64) -> Timestamp {
    anchor + chrono::Duration::seconds(limit_secs + TIMER_GRACE_SECS)
}

/// Whether the turn that started at `anchor` has expired as of `now`.
pub fn turn_expired(anchor: Timestamp, limit_secs: i64, now: Timestamp) -> bool {
    now >= turn_deadline(anchor, limit_secs)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- parsing round trips -------------------------------------------------

    #[test]
    fn side_parse_and_as_str() {
        assert_eq!(Side::parse("blue"), Some(Side::Blue));
        assert_eq!(Side::parse("red"), Some(Side::Red));
        assert_eq!(Side::parse("BLUE"), None);
        assert_eq!(Side::Blue.as_str(), "blue");
        assert_eq!(Side::Blue.opposite(), Side::Red);
    }

    #[test]
    fn draft_mode_parse() {
        assert_eq!(DraftMode::parse("normal"), Some(DraftMode::Normal));
        assert_eq!(DraftMode::parse("fearless"), Some(DraftMode::Fearless));
        assert_eq!(DraftMode::parse("ironman"), Some(DraftMode::Ironman));
        assert_eq!(DraftMode::parse("blind"), None);
    }

    #[test]
    fn team_slot_numbers() {
        assert_eq!(TeamSlot::from_number(1), Some(TeamSlot::One));
        assert_eq!(TeamSlot::from_number(2), Some(TeamSlot::Two));
        assert_eq!(TeamSlot::from_number(3), None);
        assert_eq!(TeamSlot::One.other(), TeamSlot::Two);
        assert_eq!(TeamSlot::Two.column_prefix(), "team2");
    }

    #[test]
    fn terminal_statuses() {
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Cancelled.is_terminal());
        assert!(!SessionStatus::Lobby.is_terminal());
        assert!(!SessionStatus::Paused.is_terminal());
    }

    // -- board ---------------------------------------------------------------

    #[test]
    fn empty_board_has_five_slots_per_array() {
        let board = DraftBoard::empty();
        assert_eq!(board.blue_bans.len(), 5);
        assert_eq!(board.red_picks.len(), 5);
        assert_eq!(board.filled_count(ActionType::Ban), 0);
        assert_eq!(board.filled_count(ActionType::Pick), 0);
    }

    #[test]
    fn set_and_get_round_trip() {
        let mut board = DraftBoard::empty();
        let slot = SlotRef::new(Side::Blue, ActionType::Pick, 2);
        board.set(&slot, Some("ahri".to_string())).unwrap();
        assert_eq!(board.get(&slot).unwrap(), Some("ahri".to_string()));
        assert!(board.contains_champion("ahri"));
        assert!(!board.contains_champion("zed"));
    }

    #[test]
    fn out_of_range_slot_is_rejected() {
        let board = DraftBoard::empty();
        let slot = SlotRef::new(Side::Blue, ActionType::Ban, 5);
        assert!(board.get(&slot).is_err());
    }

    #[test]
    fn blank_sentinel_never_counts_as_present() {
        let mut board = DraftBoard::empty();
        let a = SlotRef::new(Side::Blue, ActionType::Ban, 0);
        let b = SlotRef::new(Side::Red, ActionType::Ban, 0);
        board.set(&a, Some(BLANK_CHAMPION.to_string())).unwrap();
        board.set(&b, Some(BLANK_CHAMPION.to_string())).unwrap();
        assert!(!board.contains_champion(BLANK_CHAMPION));
        assert_eq!(board.filled_count(ActionType::Ban), 0);
    }

    #[test]
    fn recorded_champions_skips_nulls_and_blanks() {
        let mut board = DraftBoard::empty();
        board
            .set(&SlotRef::new(Side::Blue, ActionType::Ban, 0), Some("zed".into()))
            .unwrap();
        board
            .set(
                &SlotRef::new(Side::Red, ActionType::Pick, 1),
                Some(BLANK_CHAMPION.to_string()),
            )
            .unwrap();
        board
            .set(&SlotRef::new(Side::Red, ActionType::Pick, 0), Some("ahri".into()))
            .unwrap();

        let recorded = board.recorded_champions();
        assert_eq!(recorded.len(), 2);
        assert!(recorded.iter().any(|(_, c)| c == "zed"));
        assert!(recorded.iter().any(|(_, c)| c == "ahri"));
    }

    // -- champion id validation ---------------------------------------------

    #[test]
    fn valid_champion_ids() {
        assert!(validate_champion_id("ahri").is_ok());
        assert!(validate_champion_id("MonkeyKing").is_ok());
        assert!(validate_champion_id("kog-maw").is_ok());
    }

    #[test]
    fn rejects_empty_and_blank_and_whitespace_ids() {
        assert!(validate_champion_id("").is_err());
        assert!(validate_champion_id(BLANK_CHAMPION).is_err());
        assert!(validate_champion_id("twisted fate").is_err());
        assert!(validate_champion_id(&"a".repeat(65)).is_err());
    }

    // -- timer math ----------------------------------------------------------

    #[test]
    fn deadline_includes_grace_window() {
        let anchor = chrono::Utc::now();
        let deadline = turn_deadline(anchor, 30);
        assert_eq!(
            (deadline - anchor).num_seconds(),
            30 + TIMER_GRACE_SECS
        );
    }

    #[test]
    fn turn_expiry_boundary() {
        let anchor = chrono::Utc::now();
        let before = anchor + chrono::Duration::seconds(30);
        let after = anchor + chrono::Duration::seconds(30 + TIMER_GRACE_SECS);
        assert!(!turn_expired(anchor, 30, before));
        assert!(turn_expired(anchor, 30, after));
    }
}
