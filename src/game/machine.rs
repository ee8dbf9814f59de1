//! Top-level game controller.
//!
//! The current phase and the active case are one value, `GameState`, so a
//! phase that needs a case always has one. Every transition goes through
//! `GameStateMachine::advance`, which also records a
//! [`GameEvent::PhaseChanged`] for the driver.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::clue_gate::{self, RevealAction};
use super::progression::reward_for;
use super::{
    CaseSession, ClueId, Collaborators, Difficulty, LockPuzzle, Outcome, SessionPhase,
};
use crate::config::GameConfig;
use crate::error::{CollaboratorError, GameError, GameResult};
use crate::prompts::HINT_FALLBACK;
use crate::storage::{CaseOutcome, CaseRecord, PlayerProfile};

/// Phase plus the data that phase owns.
#[derive(Debug)]
enum GameState {
    Auth,
    Idle,
    Loading { difficulty: Difficulty },
    Playing(CaseSession),
    Solving(CaseSession),
    /// Correct answer, waiting out the celebration. Reported as `Playing`.
    Celebrating(CaseSession),
    Success {
        session: CaseSession,
        reward: Option<u32>,
    },
    Failure(CaseSession),
    Error { message: String },
}

impl GameState {
    fn phase(&self) -> SessionPhase {
        match self {
            GameState::Auth => SessionPhase::Auth,
            GameState::Idle => SessionPhase::Idle,
            GameState::Loading { .. } => SessionPhase::Loading,
            GameState::Playing(_) | GameState::Celebrating(_) => SessionPhase::Playing,
            GameState::Solving(_) => SessionPhase::Solving,
            GameState::Success { .. } => SessionPhase::Success,
            GameState::Failure(_) => SessionPhase::Failure,
            GameState::Error { .. } => SessionPhase::Error,
        }
    }

    fn session(&self) -> Option<&CaseSession> {
        match self {
            GameState::Playing(s)
            | GameState::Solving(s)
            | GameState::Celebrating(s)
            | GameState::Failure(s)
            | GameState::Success { session: s, .. } => Some(s),
            _ => None,
        }
    }
}

/// Something the driver should show the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// The phase changed.
    PhaseChanged {
        /// Phase before the transition
        from: SessionPhase,
        /// Phase after the transition
        to: SessionPhase,
    },
    /// The player reached a new level. Emitted after the success screen is up.
    LevelUp {
        /// The new level
        level: u32,
    },
    /// A transient, dismissable message.
    Banner {
        /// Text to show
        message: String,
    },
}

/// Drives one player's sessions from login to logout.
pub struct GameStateMachine {
    state: GameState,
    collaborators: Collaborators,
    config: GameConfig,
    profile: Option<PlayerProfile>,
    last_difficulty: Difficulty,
    banner: Option<String>,
    events: Vec<GameEvent>,
    rng: Box<dyn RngCore + Send>,
}

impl std::fmt::Debug for GameStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameStateMachine")
            .field("state", &self.state)
            .field("profile", &self.profile)
            .field("last_difficulty", &self.last_difficulty)
            .field("banner", &self.banner)
            .finish_non_exhaustive()
    }
}

impl GameStateMachine {
    /// Create a machine in the `Auth` phase with an entropy-seeded RNG.
    pub fn new(collaborators: Collaborators, config: GameConfig) -> Self {
        Self::with_rng(collaborators, config, Box::new(StdRng::from_os_rng()))
    }

    /// Create a machine with a caller-supplied RNG for clue locks and puzzle codes.
    pub fn with_rng(
        collaborators: Collaborators,
        config: GameConfig,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        Self {
            state: GameState::Auth,
            collaborators,
            config,
            profile: None,
            last_difficulty: Difficulty::default(),
            banner: None,
            events: Vec::new(),
            rng,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Current phase
    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    /// Whether the celebration interlude is running
    pub fn is_celebrating(&self) -> bool {
        matches!(self.state, GameState::Celebrating(_))
    }

    /// The active case session, if the phase has one
    pub fn session(&self) -> Option<&CaseSession> {
        self.state.session()
    }

    /// Last profile copy received from the progress store
    pub fn profile(&self) -> Option<&PlayerProfile> {
        self.profile.as_ref()
    }

    /// Difficulty of the most recent start
    pub fn last_difficulty(&self) -> Difficulty {
        self.last_difficulty
    }

    /// Transient error message, if any
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Message of the blocking error screen
    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            GameState::Error { message } => Some(message),
            _ => None,
        }
    }

    /// XP granted for the case on the success screen.
    ///
    /// `None` outside Success and when the answer was revealed after a failure.
    pub fn success_reward(&self) -> Option<u32> {
        match &self.state {
            GameState::Success { reward, .. } => *reward,
            _ => None,
        }
    }

    /// The puzzle currently open, if any
    pub fn active_puzzle(&self) -> Option<&LockPuzzle> {
        self.session().and_then(|s| s.puzzle())
    }

    /// Take all events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Look up an existing session once at startup.
    ///
    /// With a logged-in player the machine moves to Idle, otherwise it stays in Auth.
    pub async fn boot(&mut self) -> GameResult<()> {
        self.ensure_phase(SessionPhase::Auth, "boot")?;

        match self.collaborators.progress.current_session().await {
            Ok(Some(profile)) => {
                info!(username = %profile.username, level = profile.level, "Resumed session");
                self.profile = Some(profile);
                self.advance(|_| GameState::Idle);
            }
            Ok(None) => debug!("No stored session"),
            Err(e) => warn!(error = %e, "Session lookup failed"),
        }
        Ok(())
    }

    /// Log in from the Auth phase. Returns whether the login succeeded.
    pub async fn login(&mut self, username: &str) -> GameResult<bool> {
        self.ensure_phase(SessionPhase::Auth, "login")?;

        match self.collaborators.progress.login(username).await {
            Ok(profile) => {
                info!(username = %profile.username, "Player logged in");
                self.profile = Some(profile);
                self.banner = None;
                self.advance(|_| GameState::Idle);
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.raise_banner(format!("Login failed: {}", e));
                Ok(false)
            }
        }
    }

    /// End the session from any phase and return to Auth.
    pub async fn logout(&mut self) {
        if let Err(e) = self.collaborators.progress.logout().await {
            warn!(error = %e, "Logout failed, clearing local session anyway");
        }
        self.profile = None;
        self.banner = None;
        self.advance(|_| GameState::Auth);
    }

    /// Start a new case from Idle.
    pub async fn start(&mut self, difficulty: Difficulty) -> GameResult<()> {
        self.ensure_phase(SessionPhase::Idle, "start")?;
        self.load_case(difficulty).await;
        Ok(())
    }

    /// Start another case at the last difficulty from Success.
    pub async fn next_case(&mut self) -> GameResult<()> {
        self.ensure_phase(SessionPhase::Success, "next case")?;
        let difficulty = self.last_difficulty;
        self.load_case(difficulty).await;
        Ok(())
    }

    /// Leave the success screen for the dashboard, discarding the case.
    pub fn go_to_dashboard(&mut self) -> GameResult<()> {
        self.ensure_phase(SessionPhase::Success, "dashboard")?;
        self.advance(|_| GameState::Idle);
        Ok(())
    }

    /// Leave the blocking error screen.
    pub fn dismiss_error(&mut self) -> GameResult<()> {
        self.ensure_phase(SessionPhase::Error, "dismiss error")?;
        self.advance(|_| GameState::Idle);
        Ok(())
    }

    /// Clear the transient banner
    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// Loading → Playing on success, Idle or Error on failure.
    ///
    /// Locks and the new session are built before the single transition to
    /// Playing, so a failure never leaves a half-initialized board behind.
    async fn load_case(&mut self, difficulty: Difficulty) {
        self.last_difficulty = difficulty;
        self.banner = None;
        self.advance(|_| GameState::Loading { difficulty });

        let generated = self
            .collaborators
            .generator
            .generate_case(difficulty)
            .await
            .and_then(|mut case| {
                if case.difficulty != difficulty {
                    warn!(
                        requested = %difficulty,
                        generated = %case.difficulty,
                        "Generated case has a different difficulty, using the requested one"
                    );
                    case.difficulty = difficulty;
                }
                case.validate()
                    .map(|_| case)
                    .map_err(CollaboratorError::unavailable)
            });

        match generated {
            Ok(case) => {
                let locks = clue_gate::compute_initial_locks(&case.clues, difficulty, &mut *self.rng);
                info!(
                    title = %case.title,
                    difficulty = %difficulty,
                    clues = case.clues.len(),
                    locked = locks.len(),
                    "Case ready"
                );
                let session = CaseSession::new(case, locks);
                self.advance(|_| GameState::Playing(session));
            }
            Err(CollaboratorError::Configuration { message }) => {
                warn!(error = %message, "Case generation is misconfigured");
                self.advance(|_| GameState::Error { message });
            }
            Err(e) => {
                warn!(error = %e, "Case generation failed");
                self.advance(|_| GameState::Idle);
                self.raise_banner(format!("Could not generate a case: {}", e));
            }
        }
    }

    // ------------------------------------------------------------------
    // Investigation
    // ------------------------------------------------------------------

    /// Click a clue on the board.
    ///
    /// A locked clue opens its puzzle and stays hidden.
    pub fn request_reveal(&mut self, clue_id: ClueId) -> GameResult<RevealAction> {
        let puzzle_length = self.config.puzzle_length;
        let phase = self.state.phase();
        let GameState::Playing(session) = &mut self.state else {
            return Err(invalid_transition(phase, "reveal clue"));
        };

        let action = session.request_reveal(clue_id)?;
        if action == RevealAction::RequiresPuzzle {
            debug!(clue_id, "Clue is locked, opening puzzle");
            session.open_puzzle(LockPuzzle::generate(clue_id, puzzle_length, &mut *self.rng));
        }
        Ok(action)
    }

    /// Enter a code for the open puzzle.
    ///
    /// A correct code unlocks and reveals the clue and closes the puzzle. A
    /// wrong code keeps the puzzle open.
    pub fn submit_puzzle(&mut self, input: &str) -> GameResult<bool> {
        let session = self.playing_mut("solve puzzle")?;
        let puzzle = session.puzzle_mut().ok_or(GameError::NoActivePuzzle)?;

        if !puzzle.attempt(input) {
            return Ok(false);
        }

        if let Some(solved) = session.close_puzzle() {
            session.resolve_puzzle_success(solved.clue_id());
            info!(clue_id = solved.clue_id(), attempts = solved.attempts(), "Clue unlocked");
        }
        Ok(true)
    }

    /// Close the open puzzle without solving it. The clue stays locked.
    pub fn abandon_puzzle(&mut self) -> GameResult<()> {
        let session = self.playing_mut("abandon puzzle")?;
        session.close_puzzle();
        Ok(())
    }

    /// Fetch a hint for the clues uncovered so far.
    ///
    /// Never changes phase. A failed fetch stores and returns the fallback text.
    pub async fn request_hint(&mut self) -> GameResult<String> {
        let hints = self.collaborators.hints.clone();
        let phase = self.state.phase();
        let GameState::Playing(session) = &self.state else {
            return Err(invalid_transition(phase, "hint"));
        };

        let revealed: Vec<ClueId> = session.visibility().revealed().iter().copied().collect();
        let hint = match hints.get_hint(session.case(), &revealed).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!("Hint service returned an empty hint, using fallback");
                HINT_FALLBACK.to_string()
            }
            Err(e) => {
                warn!(error = %e, "Hint request failed, using fallback");
                HINT_FALLBACK.to_string()
            }
        };

        self.playing_mut("hint")?.set_hint(hint.clone());
        Ok(hint)
    }

    // ------------------------------------------------------------------
    // Accusation
    // ------------------------------------------------------------------

    /// Open the suspect list. Needs at least one revealed clue.
    pub fn request_solve(&mut self) -> GameResult<()> {
        let session = self.playing_mut("solve")?;
        if session.revealed_count() == 0 {
            return Err(GameError::NoCluesRevealed);
        }
        session.close_puzzle();
        self.advance(|state| match state {
            GameState::Playing(s) => GameState::Solving(s),
            other => other,
        });
        Ok(())
    }

    /// Close the suspect list and go back to the board.
    pub fn cancel_solve(&mut self) -> GameResult<()> {
        self.solving_mut("cancel solve")?.clear_selection();
        self.advance(|state| match state {
            GameState::Solving(s) => GameState::Playing(s),
            other => other,
        });
        Ok(())
    }

    /// Pick a suspect while the suspect list is open.
    pub fn select_suspect(&mut self, option_id: &str) -> GameResult<()> {
        self.solving_mut("select suspect")?.select_suspect(option_id)
    }

    /// Confirm the accusation.
    ///
    /// Correct: the reward is computed and sent to the progress store, the
    /// celebration runs for its full length, then Success is entered and any
    /// level-up notice is emitted. Incorrect: Failure, with no XP call.
    pub async fn confirm_selection(&mut self) -> GameResult<Outcome> {
        let outcome = self.solving_mut("confirm")?.evaluate()?;

        match outcome {
            Outcome::Incorrect => {
                info!("Wrong suspect accused");
                self.advance(|state| match state {
                    GameState::Solving(s) => GameState::Failure(s),
                    other => other,
                });
            }
            Outcome::Correct => {
                self.advance(|state| match state {
                    GameState::Solving(s) => GameState::Celebrating(s),
                    other => other,
                });

                let difficulty = self
                    .session()
                    .map(|s| s.case().difficulty)
                    .unwrap_or(self.last_difficulty);
                let reward = reward_for(difficulty);
                let leveled_up = self.award_xp(reward).await;

                tokio::time::sleep(Duration::from_millis(self.config.celebration_ms)).await;

                self.advance(|state| match state {
                    GameState::Celebrating(session) => GameState::Success {
                        session,
                        reward: Some(reward),
                    },
                    other => other,
                });
                self.record_case(CaseOutcome::Solved, reward).await;

                if let Some(level) = leveled_up {
                    self.events.push(GameEvent::LevelUp { level });
                }
            }
        }
        Ok(outcome)
    }

    /// Go back to the board after a wrong accusation. Revealed clues stay revealed.
    pub fn re_examine(&mut self) -> GameResult<()> {
        self.ensure_phase(SessionPhase::Failure, "re-examine")?;
        self.advance(|state| match state {
            GameState::Failure(s) => GameState::Playing(s),
            other => other,
        });
        Ok(())
    }

    /// Show the solution after a wrong accusation. No XP is granted.
    pub async fn reveal_answer(&mut self) -> GameResult<()> {
        self.ensure_phase(SessionPhase::Failure, "reveal answer")?;
        self.advance(|state| match state {
            GameState::Failure(session) => GameState::Success {
                session,
                reward: None,
            },
            other => other,
        });
        self.record_case(CaseOutcome::Revealed, 0).await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Best-effort XP award. Returns the new level if one was gained.
    ///
    /// On failure the cached profile keeps its previous values.
    async fn award_xp(&mut self, reward: u32) -> Option<u32> {
        match self.collaborators.progress.add_xp(reward).await {
            Ok(award) => {
                info!(
                    reward,
                    level = award.profile.level,
                    leveled_up = award.leveled_up,
                    "XP awarded"
                );
                let level = award.profile.level;
                self.profile = Some(award.profile);
                award.leveled_up.then_some(level)
            }
            Err(e) => {
                warn!(error = %e, reward, "Failed to persist XP, profile left unchanged");
                None
            }
        }
    }

    async fn record_case(&self, outcome: CaseOutcome, reward: u32) {
        let (Some(profile), Some(session)) = (self.profile.as_ref(), self.state.session()) else {
            return;
        };
        let case = session.case();
        let record = CaseRecord::new(
            &profile.username,
            &case.title,
            case.difficulty,
            outcome,
            reward,
        );
        if let Err(e) = self.collaborators.progress.record_case(&record).await {
            warn!(error = %e, "Failed to record case history");
        }
    }

    fn advance(&mut self, f: impl FnOnce(GameState) -> GameState) {
        let from = self.state.phase();
        let current = std::mem::replace(&mut self.state, GameState::Idle);
        self.state = f(current);
        let to = self.state.phase();
        if from != to {
            info!(from = %from, to = %to, "Phase changed");
            self.events.push(GameEvent::PhaseChanged { from, to });
        }
    }

    fn raise_banner(&mut self, message: String) {
        self.banner = Some(message.clone());
        self.events.push(GameEvent::Banner { message });
    }

    fn ensure_phase(&self, expected: SessionPhase, action: &str) -> GameResult<()> {
        let phase = self.state.phase();
        if phase != expected || self.is_celebrating() {
            return Err(invalid_transition(phase, action));
        }
        Ok(())
    }

    fn playing_mut(&mut self, action: &str) -> GameResult<&mut CaseSession> {
        let phase = self.state.phase();
        match &mut self.state {
            GameState::Playing(s) => Ok(s),
            _ => Err(invalid_transition(phase, action)),
        }
    }

    fn solving_mut(&mut self, action: &str) -> GameResult<&mut CaseSession> {
        let phase = self.state.phase();
        match &mut self.state {
            GameState::Solving(s) => Ok(s),
            _ => Err(invalid_transition(phase, action)),
        }
    }
}

fn invalid_transition(phase: SessionPhase, action: &str) -> GameError {
    GameError::InvalidTransition {
        phase: phase.to_string(),
        action: action.to_string(),
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod machine_tests;
