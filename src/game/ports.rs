//! Collaborator traits the game core calls out to.
//!
//! Case generation, hints and player progress live outside the core. The
//! state machine only ever sees success or a [`CollaboratorError`].

use async_trait::async_trait;
use std::sync::Arc;

use super::{ClueId, Difficulty, MysteryCase};
use crate::error::CollaboratorResult;
use crate::storage::{CaseRecord, PlayerProfile, XpAward};

/// Produces new mystery cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaseGenerator: Send + Sync {
    /// Generate a case at the given difficulty.
    async fn generate_case(&self, difficulty: Difficulty) -> CollaboratorResult<MysteryCase>;
}

/// Produces hints for a case in progress.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HintProvider: Send + Sync {
    /// Hint based only on the clues the player has uncovered.
    async fn get_hint(&self, case: &MysteryCase, revealed: &[ClueId])
        -> CollaboratorResult<String>;
}

/// Authenticated session and authoritative XP bookkeeping.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Profile of the logged-in player, if any.
    async fn current_session(&self) -> CollaboratorResult<Option<PlayerProfile>>;

    /// Log a player in, creating their profile on first login.
    async fn login(&self, username: &str) -> CollaboratorResult<PlayerProfile>;

    /// End the current session.
    async fn logout(&self) -> CollaboratorResult<()>;

    /// Award XP to the current player and return the updated profile.
    async fn add_xp(&self, amount: u32) -> CollaboratorResult<XpAward>;

    /// Append a finished case to the player's history.
    async fn record_case(&self, record: &CaseRecord) -> CollaboratorResult<()>;
}

/// Everything the state machine needs from the outside world.
#[derive(Clone)]
pub struct Collaborators {
    /// Case source.
    pub generator: Arc<dyn CaseGenerator>,
    /// Hint source.
    pub hints: Arc<dyn HintProvider>,
    /// Session and XP store.
    pub progress: Arc<dyn ProgressStore>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
