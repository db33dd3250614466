//! The canonical ordered sequence of ban/pick actions for one game.
//!
//! Pure data: the same 20-step tournament order applies to every game in
//! every mode. The game state machine only ever reads `step(i)`.

use crate::draft::{ActionType, Side};

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Named segment of the draft order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Ban1,
    Pick1,
    Ban2,
    Pick2,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Ban1 => "ban_1",
            Phase::Pick1 => "pick_1",
            Phase::Ban2 => "ban_2",
            Phase::Pick2 => "pick_2",
        }
    }
}

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// One entry in the draft order: whose turn it is and what they do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct DraftStep {
    pub phase: Phase,
    pub side: Side,
    pub action: ActionType,
}

const fn step_of(phase: Phase, side: Side, action: ActionType) -> DraftStep {
    DraftStep {
        phase,
        side,
        action,
    }
}

/// The standard tournament draft order.
///
/// ```text
/// ban_1 : B R B R B R
/// pick_1: B R R B B R
/// ban_2 : R B R B
/// pick_2: R B B R
/// ```
pub const DRAFT_ORDER: [DraftStep; 20] = [
    // -- ban phase 1 --
    step_of(Phase::Ban1, Side::Blue, ActionType::Ban),
    step_of(Phase::Ban1, Side::Red, ActionType::Ban),
    step_of(Phase::Ban1, Side::Blue, ActionType::Ban),
    step_of(Phase::Ban1, Side::Red, ActionType::Ban),
    step_of(Phase::Ban1, Side::Blue, ActionType::Ban),
    step_of(Phase::Ban1, Side::Red, ActionType::Ban),
    // -- pick phase 1 --
    step_of(Phase::Pick1, Side::Blue, ActionType::Pick),
    step_of(Phase::Pick1, Side::Red, ActionType::Pick),
    step_of(Phase::Pick1, Side::Red, ActionType::Pick),
    step_of(Phase::Pick1, Side::Blue, ActionType::Pick),
    step_of(Phase::Pick1, Side::Blue, ActionType::Pick),
    step_of(Phase::Pick1, Side::Red, ActionType::Pick),
    // -- ban phase 2 --
    step_of(Phase::Ban2, Side::Red, ActionType::Ban),
    step_of(Phase::Ban2, Side::Blue, ActionType::Ban),
    step_of(Phase::Ban2, Side::Red, ActionType::Ban),
    step_of(Phase::Ban2, Side::Blue, ActionType::Ban),
    // -- pick phase 2 --
    step_of(Phase::Pick2, Side::Red, ActionType::Pick),
    step_of(Phase::Pick2, Side::Blue, ActionType::Pick),
    step_of(Phase::Pick2, Side::Blue, ActionType::Pick),
    step_of(Phase::Pick2, Side::Red, ActionType::Pick),
];

/// Number of steps in one game's draft.
pub fn total_steps() -> usize {
    DRAFT_ORDER.len()
}

/// The step at `index`, or `None` once the draft is complete.
pub fn step(index: usize) -> Option<&'static DraftStep> {
    DRAFT_ORDER.get(index)
}

/// The array slot the step at `index` writes: how many earlier steps share
/// its side and action type.
pub fn slot_index(index: usize) -> usize {
    let current = &DRAFT_ORDER[index];
    DRAFT_ORDER[..index]
        .iter()
        .filter(|s| s.side == current.side && s.action == current.action)
        .count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
