//! Clue locking and reveal bookkeeping.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use super::{Clue, ClueId, Difficulty};

/// Chance that a lockable clue is locked on a hard case.
pub const HARD_LOCK_PROBABILITY: f64 = 0.6;

/// Chance that a lockable clue is locked on easy and medium cases.
pub const DEFAULT_LOCK_PROBABILITY: f64 = 0.4;

/// Per-case reveal state.
///
/// `locked` and `revealed` are always disjoint. A clue in neither set is
/// hidden but can be revealed freely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueVisibility {
    locked: BTreeSet<ClueId>,
    revealed: BTreeSet<ClueId>,
}

impl ClueVisibility {
    /// Start a case with the given locks and nothing revealed.
    pub fn with_locks(locked: BTreeSet<ClueId>) -> Self {
        Self {
            locked,
            revealed: BTreeSet::new(),
        }
    }

    /// Clues that need a puzzle before they can be revealed.
    pub fn locked(&self) -> &BTreeSet<ClueId> {
        &self.locked
    }

    /// Clues the player has uncovered.
    pub fn revealed(&self) -> &BTreeSet<ClueId> {
        &self.revealed
    }

    /// Whether the clue is locked
    pub fn is_locked(&self, id: ClueId) -> bool {
        self.locked.contains(&id)
    }

    /// Whether the clue has been revealed
    pub fn is_revealed(&self, id: ClueId) -> bool {
        self.revealed.contains(&id)
    }
}

/// What the board should do when a clue is clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealAction {
    /// The clue is now (or already was) revealed.
    Reveal,
    /// The clue is locked; open its puzzle.
    RequiresPuzzle,
}

/// Probability that a lockable clue is locked at this difficulty.
pub fn lock_probability(difficulty: Difficulty) -> f64 {
    match difficulty {
        Difficulty::Hard => HARD_LOCK_PROBABILITY,
        Difficulty::Easy | Difficulty::Medium => DEFAULT_LOCK_PROBABILITY,
    }
}

/// Decide which clues start locked.
///
/// Each testimony or physical-object clue is locked independently with
/// [`lock_probability`]; observations and context are never locked.
pub fn compute_initial_locks<R: Rng + ?Sized>(
    clues: &[Clue],
    difficulty: Difficulty,
    rng: &mut R,
) -> BTreeSet<ClueId> {
    let p = lock_probability(difficulty);
    let locked: BTreeSet<ClueId> = clues
        .iter()
        .filter(|clue| clue.kind.is_lockable())
        .filter(|_| rng.random_bool(p))
        .map(|clue| clue.id)
        .collect();

    debug!(
        difficulty = %difficulty,
        clues = clues.len(),
        locked = locked.len(),
        "Computed initial clue locks"
    );
    locked
}

/// Ask to reveal a clue.
///
/// Locked clues stay hidden and ask for a puzzle. Anything else is added to
/// the revealed set; revealing twice changes nothing.
pub fn request_reveal(id: ClueId, state: &mut ClueVisibility) -> RevealAction {
    if state.locked.contains(&id) {
        return RevealAction::RequiresPuzzle;
    }
    state.revealed.insert(id);
    RevealAction::Reveal
}

/// Unlock and reveal a clue after its puzzle was solved.
///
/// Returns whether anything changed. A clue that was not locked is left alone.
pub fn resolve_puzzle_success(id: ClueId, state: &mut ClueVisibility) -> bool {
    if !state.locked.remove(&id) {
        return false;
    }
    state.revealed.insert(id);
    true
}
