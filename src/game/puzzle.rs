//! Digit-code puzzle guarding a locked clue.

use rand::Rng;

use super::ClueId;

/// A code lock on one clue.
///
/// The code is drawn once when the puzzle opens; the player may try as often
/// as they like until they solve it or give up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockPuzzle {
    clue_id: ClueId,
    code: String,
    attempts: u32,
}

impl LockPuzzle {
    /// Open a puzzle for `clue_id` with a `length`-digit code.
    pub fn generate<R: Rng + ?Sized>(clue_id: ClueId, length: usize, rng: &mut R) -> Self {
        let code = (0..length.max(1))
            .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
            .collect();
        Self {
            clue_id,
            code,
            attempts: 0,
        }
    }

    /// Clue this puzzle unlocks
    pub fn clue_id(&self) -> ClueId {
        self.clue_id
    }

    /// The code, shown to the player as the puzzle prompt
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Number of attempts made so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Try an answer; surrounding whitespace is ignored.
    pub fn attempt(&mut self, input: &str) -> bool {
        self.attempts += 1;
        input.trim() == self.code
    }
}
