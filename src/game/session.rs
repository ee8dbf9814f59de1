use std::collections::BTreeSet;

use super::clue_gate::{self, ClueVisibility, RevealAction};
use super::{Clue, ClueId, LockPuzzle, MysteryCase, Outcome};
use crate::error::{GameError, GameResult};

/// The active case plus everything the player has done on it.
///
/// Created when a case finishes loading and dropped when the player leaves
/// for the dashboard or starts another case.
#[derive(Debug, Clone)]
pub struct CaseSession {
    case: MysteryCase,
    visibility: ClueVisibility,
    selected_suspect: Option<String>,
    hint: Option<String>,
    puzzle: Option<LockPuzzle>,
}

impl CaseSession {
    /// Start a session on `case` with the given initial locks.
    ///
    /// Lock ids that are not clues of the case are dropped.
    pub fn new(case: MysteryCase, locked: BTreeSet<ClueId>) -> Self {
        let locked = locked
            .into_iter()
            .filter(|id| case.clue(*id).is_some())
            .collect();
        Self {
            case,
            visibility: ClueVisibility::with_locks(locked),
            selected_suspect: None,
            hint: None,
            puzzle: None,
        }
    }

    /// The case being played
    pub fn case(&self) -> &MysteryCase {
        &self.case
    }

    /// Lock and reveal state
    pub fn visibility(&self) -> &ClueVisibility {
        &self.visibility
    }

    /// Number of clues uncovered so far
    pub fn revealed_count(&self) -> usize {
        self.visibility.revealed().len()
    }

    /// Whether every clue on the board is uncovered
    pub fn all_clues_revealed(&self) -> bool {
        self.revealed_count() == self.case.clues.len()
    }

    /// Uncovered clues in board order
    pub fn revealed_clues(&self) -> Vec<&Clue> {
        self.case
            .clues
            .iter()
            .filter(|c| self.visibility.is_revealed(c.id))
            .collect()
    }

    /// Ask to reveal a clue of this case.
    pub fn request_reveal(&mut self, id: ClueId) -> GameResult<RevealAction> {
        self.ensure_clue(id)?;
        Ok(clue_gate::request_reveal(id, &mut self.visibility))
    }

    /// Unlock a clue whose puzzle was solved. No-op if it was not locked.
    pub fn resolve_puzzle_success(&mut self, id: ClueId) -> bool {
        clue_gate::resolve_puzzle_success(id, &mut self.visibility)
    }

    /// The puzzle currently open, if any
    pub fn puzzle(&self) -> Option<&LockPuzzle> {
        self.puzzle.as_ref()
    }

    pub(crate) fn puzzle_mut(&mut self) -> Option<&mut LockPuzzle> {
        self.puzzle.as_mut()
    }

    pub(crate) fn open_puzzle(&mut self, puzzle: LockPuzzle) {
        self.puzzle = Some(puzzle);
    }

    pub(crate) fn close_puzzle(&mut self) -> Option<LockPuzzle> {
        self.puzzle.take()
    }

    /// Pick a suspect. Ids that are not suspects of this case are rejected.
    pub fn select_suspect(&mut self, option_id: &str) -> GameResult<()> {
        if self.case.suspect(option_id).is_none() {
            return Err(GameError::UnknownSuspect {
                option_id: option_id.to_string(),
            });
        }
        self.selected_suspect = Some(option_id.to_string());
        Ok(())
    }

    /// Forget the current selection
    pub fn clear_selection(&mut self) {
        self.selected_suspect = None;
    }

    /// Currently selected suspect id
    pub fn selected_suspect(&self) -> Option<&str> {
        self.selected_suspect.as_deref()
    }

    /// Compare the selected suspect with the answer.
    pub fn evaluate(&self) -> GameResult<Outcome> {
        let selected = self
            .selected_suspect
            .as_deref()
            .ok_or(GameError::NoSuspectSelected)?;

        if selected == self.case.correct_option_id {
            Ok(Outcome::Correct)
        } else {
            Ok(Outcome::Incorrect)
        }
    }

    /// Latest hint, if one was fetched
    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Replace the hint with the latest fetch
    pub fn set_hint(&mut self, hint: impl Into<String>) {
        self.hint = Some(hint.into());
    }

    fn ensure_clue(&self, id: ClueId) -> GameResult<()> {
        match self.case.clue(id) {
            Some(_) => Ok(()),
            None => Err(GameError::UnknownClue { clue_id: id }),
        }
    }
}
