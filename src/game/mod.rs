//! The game core.
//!
//! - [`progression`]: XP rewards and the level curve
//! - [`clue_gate`]: which clues start locked, reveal bookkeeping
//! - [`LockPuzzle`]: the code lock opened on a locked clue
//! - [`CaseSession`]: the active case and the player's progress on it
//! - [`GameStateMachine`]: phases and transitions
//!
//! The core talks to case generation, hints and player progress only through
//! the traits in [`ports`].

pub mod clue_gate;
mod machine;
pub mod ports;
pub mod progression;
mod puzzle;
mod session;
mod types;

pub use clue_gate::{ClueVisibility, RevealAction};
pub use machine::*;
pub use ports::{CaseGenerator, Collaborators, HintProvider, ProgressStore};
pub use puzzle::LockPuzzle;
pub use session::CaseSession;
pub use types::*;
